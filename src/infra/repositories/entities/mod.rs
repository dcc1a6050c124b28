//! SeaORM entities. Kept apart from the domain types they convert into.

pub mod user;

//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identity, immutable once assigned
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored credential (a hash); never serialized to clients
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// User creation payload as submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    /// Plain-text password; hashed before it reaches the store
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A user row ready for insertion (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl NewUserRecord {
    /// Pair a validated submission with its hashed password.
    pub fn from_submission(user: NewUser, password_hash: String) -> Self {
        Self {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash,
        }
    }
}

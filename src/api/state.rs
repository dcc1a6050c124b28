//! Application state - Dependency injection container.
//!
//! Everything a handler needs is injected here at process construction time.

use std::sync::Arc;

use crate::infra::{StoreSession, UserStore};
use crate::services::{UserManager, UserService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Store session the services were built over
    pub store: Arc<StoreSession>,
}

impl AppState {
    /// Wire the default services over a store session.
    pub fn from_session(store: Arc<StoreSession>) -> Self {
        let users = Arc::new(UserStore::new(store.clone()));
        let user_service = Arc::new(UserManager::new(users));

        Self {
            user_service,
            store,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(user_service: Arc<dyn UserService>, store: Arc<StoreSession>) -> Self {
        Self {
            user_service,
            store,
        }
    }
}

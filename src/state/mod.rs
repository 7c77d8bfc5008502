mod edit_session;
mod keys;
mod todo_list;

pub(crate) use keys::KeyAction;
pub(crate) use todo_list::{TodoList, ValidationError};

use crate::api::FirebaseStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: AppConfig,

    /// Shared by every view; each list view opens its own subscription.
    pub store: FirebaseStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = FirebaseStore::from_config(&config);
        Self { config, store }
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

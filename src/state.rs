use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{ProductRepository, Store};

/// Shared by every request. Holds no mutable state of its own.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn products(&self) -> &dyn ProductRepository {
        self.store.repository.as_ref()
    }
}

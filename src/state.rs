// src/state.rs
use crate::config::Config;
use crate::services::stream::StatusBus;
use crate::store::OrderStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub bus: StatusBus,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, config: Config) -> Self {
        Self {
            store,
            bus: StatusBus::new(),
            config: Arc::new(config),
        }
    }
}

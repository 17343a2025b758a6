use matching_engine::{EngineConfig, MarketRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MarketRegistry>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(MarketRegistry::new(config)),
        }
    }
}

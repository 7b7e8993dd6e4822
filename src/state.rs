//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::health::aggregator::HealthAggregator;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub aggregator: Arc<HealthAggregator>,
}

impl AppState {
    pub fn new(config: AppConfig, aggregator: HealthAggregator) -> Self {
        Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::engine::events::EventBus;
use crate::engine::scoreboard::ScoreboardService;
use crate::store::Stores;

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub events: EventBus,
    pub scoreboard: Arc<ScoreboardService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(stores: Stores, events: EventBus, config: AppConfig) -> Self {
        let scoreboard = Arc::new(ScoreboardService::new(
            Duration::from_secs(config.scoreboard.cache_ttl_secs),
            config.scoreboard.freeze_point_values,
        ));
        Self {
            stores,
            events,
            scoreboard,
            config: Arc::new(config),
        }
    }
}

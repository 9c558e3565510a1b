use std::sync::Arc;

use crate::application::repos::HealthRepo;
use crate::application::trading::TradingService;
use crate::config::QuerySettings;

#[derive(Clone)]
pub struct ApiState {
    pub trading: Arc<TradingService>,
    pub health: Arc<dyn HealthRepo>,
    pub query: QuerySettings,
}

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_trading_router() -> Router<ApiState> {
    Router::new()
        .route("/last_trading_dates", get(handlers::last_trading_dates))
        .route("/dynamics", get(handlers::dynamics))
        .route("/trading_results", get(handlers::trading_results))
}

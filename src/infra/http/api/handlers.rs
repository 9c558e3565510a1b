use axum::Json;
use axum::extract::{Query, State};

use super::error::ApiError;
use super::models::{
    DynamicsQuery, LastTradingDatesResponse, PaginationQuery, TradingResultResponse,
    TradingResultsQuery,
};
use super::state::ApiState;

pub async fn last_trading_dates(
    State(state): State<ApiState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<LastTradingDatesResponse>, ApiError> {
    let pagination = query.resolve(&state.query)?;
    let dates = state.trading.last_trading_dates(pagination).await?;
    Ok(Json(LastTradingDatesResponse { dates }))
}

pub async fn trading_results(
    State(state): State<ApiState>,
    Query(query): Query<TradingResultsQuery>,
) -> Result<Json<Vec<TradingResultResponse>>, ApiError> {
    let criteria = query.into_criteria(&state.query)?;
    let records = state.trading.filter_trading_results(&criteria).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn dynamics(
    State(state): State<ApiState>,
    Query(query): Query<DynamicsQuery>,
) -> Result<Json<Vec<TradingResultResponse>>, ApiError> {
    let criteria = query.into_criteria(&state.query)?;
    let records = state.trading.filter_trading_results(&criteria).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

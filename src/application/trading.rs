//! Cached query service over the trading results table.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use thiserror::Error;
use time::Date;
use tracing::{info, instrument};

use crate::application::query::TradingQuery;
use crate::application::repos::{RepoError, TradingRepo};
use crate::cache::{CacheKey, Operation, ReadThrough};
use crate::domain::error::DomainError;
use crate::domain::filter::{FilterCriteria, Pagination};
use crate::domain::trading::{NewTradingRecord, TradingRecord};

pub const METRIC_STORAGE_QUERY_MS: &str = "spimex_storage_query_ms";

#[derive(Debug, Error)]
pub enum TradingServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct TradingService {
    repo: Arc<dyn TradingRepo>,
    cache: ReadThrough,
}

impl TradingService {
    pub fn new(repo: Arc<dyn TradingRepo>, cache: ReadThrough) -> Self {
        Self { repo, cache }
    }

    /// Distinct trading dates, most recent first, at most `pagination.limit` of them.
    #[instrument(skip(self))]
    pub async fn last_trading_dates(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<Date>, TradingServiceError> {
        let query = TradingQuery::distinct_dates(pagination);
        let key = CacheKey::for_query(Operation::LastTradingDates, &query);
        let repo = Arc::clone(&self.repo);

        let dates = self
            .cache
            .get_or_compute(&key, || async move {
                let started_at = Instant::now();
                let result = repo.fetch_dates(&query).await;
                record_query_latency("fetch_dates", started_at);
                result
            })
            .await?;
        Ok(dates)
    }

    /// Records matching every present field of `criteria`, paginated.
    #[instrument(skip(self))]
    pub async fn filter_trading_results(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<TradingRecord>, TradingServiceError> {
        criteria.validate()?;

        let query = TradingQuery::records(criteria);
        let key = CacheKey::for_query(Operation::FilterTradingResults, &query);
        let repo = Arc::clone(&self.repo);

        let records = self
            .cache
            .get_or_compute(&key, || async move {
                let started_at = Instant::now();
                let result = repo.fetch_records(&query).await;
                record_query_latency("fetch_records", started_at);
                result
            })
            .await?;
        Ok(records)
    }

    /// Insert all records atomically. Never cached; existing cache entries keep
    /// serving until the next publication boundary.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn bulk_insert(
        &self,
        records: Vec<NewTradingRecord>,
    ) -> Result<u64, TradingServiceError> {
        if records.is_empty() {
            return Ok(0);
        }
        let inserted = self.repo.insert_records(&records).await?;
        info!(inserted, "Trading results inserted");
        Ok(inserted)
    }
}

fn record_query_latency(query: &'static str, started_at: Instant) {
    histogram!(METRIC_STORAGE_QUERY_MS, "query" => query)
        .record(started_at.elapsed().as_secs_f64() * 1000.0);
}

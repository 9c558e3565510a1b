//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::application::query::TradingQuery;
use crate::domain::trading::{NewTradingRecord, TradingRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RepoError::Timeout)
    }
}

/// Read and write access to the trading results table.
///
/// Implementations evaluate a [`TradingQuery`] exactly as described: every
/// predicate conjunctively, ordering as given, then offset and limit.
#[async_trait]
pub trait TradingRepo: Send + Sync {
    async fn fetch_records(&self, query: &TradingQuery) -> Result<Vec<TradingRecord>, RepoError>;

    async fn fetch_dates(&self, query: &TradingQuery) -> Result<Vec<Date>, RepoError>;

    /// Insert all records or none of them; returns the number inserted.
    async fn insert_records(&self, records: &[NewTradingRecord]) -> Result<u64, RepoError>;
}

/// Liveness probe for the storage backend.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}

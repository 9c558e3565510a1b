//! Read-through wrapper around a [`CacheBackend`].
//!
//! The lookup always precedes the computation. Cache failures of any kind
//! (backend error, timeout, undecodable value) degrade to computing the value
//! directly, and population is best-effort. Concurrent misses on one key each
//! compute and store; the last write wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::backend::{CacheBackend, CacheError};
use super::keys::CacheKey;
use super::schedule::PublicationSchedule;

pub const METRIC_CACHE_HIT: &str = "spimex_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "spimex_cache_miss_total";
pub const METRIC_CACHE_ERROR: &str = "spimex_cache_error_total";

pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct ReadThrough {
    backend: Arc<dyn CacheBackend>,
    schedule: PublicationSchedule,
    timeout: Duration,
}

impl ReadThrough {
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        schedule: PublicationSchedule,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            schedule,
            timeout,
        }
    }

    pub fn schedule(&self) -> &PublicationSchedule {
        &self.schedule
    }

    /// Return the cached value for `key`, or run `compute`, store its result
    /// until the next publication boundary, and return it.
    ///
    /// Errors from `compute` propagate unchanged and are never cached.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.populate(key, &value).await;
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let operation = key.operation().as_str();
        let bytes = match tokio::time::timeout(self.timeout, self.backend.get(key)).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                counter!(METRIC_CACHE_MISS, "operation" => operation).increment(1);
                debug!(cache = "read_through", outcome = "miss", key = %key);
                return None;
            }
            Ok(Err(err)) => {
                record_failure("get", key, &err);
                return None;
            }
            Err(_) => {
                record_failure("get", key, &CacheError::Timeout);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "operation" => operation).increment(1);
                debug!(cache = "read_through", outcome = "hit", key = %key);
                Some(value)
            }
            Err(err) => {
                record_failure("decode", key, &CacheError::codec(err));
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                record_failure("encode", key, &CacheError::codec(err));
                return;
            }
        };

        let ttl_seconds = self.schedule.ttl_seconds();
        match tokio::time::timeout(self.timeout, self.backend.set(key, bytes, ttl_seconds)).await {
            Ok(Ok(())) => {
                debug!(cache = "read_through", outcome = "stored", key = %key, ttl_seconds);
            }
            Ok(Err(err)) => record_failure("set", key, &err),
            Err(_) => record_failure("set", key, &CacheError::Timeout),
        }
    }
}

fn record_failure(op: &'static str, key: &CacheKey, err: &CacheError) {
    counter!(
        METRIC_CACHE_ERROR,
        "operation" => key.operation().as_str(),
        "op" => op
    )
    .increment(1);
    warn!(
        cache = "read_through",
        outcome = "error",
        op,
        key = %key,
        error = %err,
        "Cache unavailable; serving from storage"
    );
}

//! Cache configuration.
//!
//! Derived from the `[cache]` section of the settings file.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::backend::{CacheBackend, CacheError};
use super::memory::MemoryCacheBackend;
use super::read_through::{DEFAULT_CACHE_TIMEOUT, ReadThrough};
use super::redis_backend::RedisCacheBackend;
use super::schedule::PublicationSchedule;

pub const DEFAULT_PREFIX: &str = "spimex-cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    /// Required when `backend` is `redis`.
    pub redis_url: Option<String>,
    /// Namespace for every stored key.
    pub prefix: String,
    pub schedule: PublicationSchedule,
    /// Upper bound on a single cache round trip.
    pub timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            redis_url: None,
            prefix: DEFAULT_PREFIX.to_string(),
            schedule: PublicationSchedule::default(),
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            prefix: settings.prefix.clone(),
            schedule: settings.schedule,
            timeout: settings.timeout,
        }
    }
}

impl CacheConfig {
    /// Connect the configured backend and wrap it for read-through use.
    pub async fn build(&self) -> Result<ReadThrough, CacheError> {
        let backend: Arc<dyn CacheBackend> = match self.backend {
            CacheBackendKind::Memory => Arc::new(MemoryCacheBackend::new(self.prefix.clone())),
            CacheBackendKind::Redis => {
                let url = self
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| CacheError::backend("cache.redis_url is not set"))?;
                Arc::new(RedisCacheBackend::connect(url, self.prefix.clone()).await?)
            }
        };
        Ok(ReadThrough::new(backend, self.schedule, self.timeout))
    }
}

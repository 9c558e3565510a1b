//! Read-through result cache.
//!
//! Entries expire at the next daily publication boundary instead of after a
//! fixed duration:
//!
//! ```toml
//! [cache]
//! backend = "memory"   # or "redis"
//! prefix = "spimex-cache"
//! reset_hour = 14
//! reset_minute = 11
//! ```

mod backend;
mod config;
mod keys;
mod lock;
mod memory;
mod read_through;
mod redis_backend;
mod schedule;

pub use backend::{CacheBackend, CacheError};
pub use config::{CacheBackendKind, CacheConfig, DEFAULT_PREFIX};
pub use keys::{CacheKey, Operation};
pub use memory::MemoryCacheBackend;
pub use read_through::{
    DEFAULT_CACHE_TIMEOUT, METRIC_CACHE_ERROR, METRIC_CACHE_HIT, METRIC_CACHE_MISS, ReadThrough,
};
pub use redis_backend::RedisCacheBackend;
pub use schedule::{
    DEFAULT_RESET_HOUR, DEFAULT_RESET_MINUTE, PublicationSchedule, ScheduleError, ScheduleZone,
    seconds_until_boundary,
};

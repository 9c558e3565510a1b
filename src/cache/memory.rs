//! Process-local cache backend.
//!
//! Entries carry an absolute expiry instant; expired entries read as absent.
//! They are dropped when read, on the first write after the earliest expiry
//! has passed, or by [`MemoryCacheBackend::purge_expired`]. There is no
//! capacity bound.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use super::backend::{CacheBackend, CacheError};
use super::keys::CacheKey;
use super::lock::{rw_read, rw_write};

#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, Entry>,
    // Never later than the earliest expiry among stored entries.
    next_expiry: Option<Instant>,
}

impl Entries {
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        self.next_expiry = self.map.values().map(|entry| entry.expires_at).min();
        before - self.map.len()
    }
}

pub struct MemoryCacheBackend {
    prefix: String,
    entries: RwLock<Entries>,
}

impl MemoryCacheBackend {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, "len").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time left before `key` expires, if it is live.
    pub fn remaining_ttl(&self, key: &CacheKey) -> Option<Duration> {
        let now = Instant::now();
        let entries = rw_read(&self.entries, "remaining_ttl");
        entries
            .map
            .get(&key.storage_key(&self.prefix))
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        rw_write(&self.entries, "purge_expired").purge(now)
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        let storage_key = key.storage_key(&self.prefix);
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, "get");
            match entries.map.get(&storage_key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = rw_write(&self.entries, "get.evict");
        if entries
            .map
            .get(&storage_key)
            .is_some_and(|entry| !entry.is_live(now))
        {
            entries.map.remove(&storage_key);
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: Bytes, ttl_seconds: u64) -> Result<(), CacheError> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let now = Instant::now();
        let expires_at = now + Duration::from_secs(ttl_seconds);
        let mut entries = rw_write(&self.entries, "set");
        if entries.next_expiry.is_some_and(|earliest| earliest <= now) {
            entries.purge(now);
        }
        entries
            .map
            .insert(key.storage_key(&self.prefix), Entry { value, expires_at });
        let next_expiry = entries
            .next_expiry
            .map_or(expires_at, |earliest| earliest.min(expires_at));
        entries.next_expiry = Some(next_expiry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query::TradingQuery;
    use crate::cache::keys::Operation;
    use crate::domain::filter::Pagination;

    fn key(limit: u32) -> CacheKey {
        CacheKey::for_query(
            Operation::LastTradingDates,
            &TradingQuery::distinct_dates(Pagination::new(limit, 0)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_expiry() {
        let backend = MemoryCacheBackend::new("test");
        backend
            .set(&key(10), Bytes::from_static(b"[]"), 5)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(
            backend.get(&key(10)).await.unwrap(),
            Some(Bytes::from_static(b"[]"))
        );
        assert_eq!(backend.remaining_ttl(&key(10)), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(backend.get(&key(10)).await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn later_set_replaces_value_and_resets_ttl() {
        let backend = MemoryCacheBackend::new("test");
        backend
            .set(&key(10), Bytes::from_static(b"old"), 2)
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        backend
            .set(&key(10), Bytes::from_static(b"new"), 10)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(
            backend.get(&key(10)).await.unwrap(),
            Some(Bytes::from_static(b"new"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_entries() {
        let backend = MemoryCacheBackend::new("test");
        backend.set(&key(1), Bytes::from_static(b"a"), 1).await.unwrap();
        backend.set(&key(2), Bytes::from_static(b"b"), 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(backend.len(), 2);
        assert_eq!(backend.purge_expired(), 1);
        assert_eq!(backend.len(), 1);
        assert!(backend.get(&key(2)).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn write_after_expiry_drops_stale_entries() {
        let backend = MemoryCacheBackend::new("test");
        for offset in 0..100 {
            let stale = CacheKey::for_query(
                Operation::LastTradingDates,
                &TradingQuery::distinct_dates(Pagination::new(10, offset)),
            );
            backend.set(&stale, Bytes::from_static(b"[]"), 1).await.unwrap();
        }
        backend.set(&key(1), Bytes::from_static(b"a"), 7200).await.unwrap();
        assert_eq!(backend.len(), 101);

        tokio::time::advance(Duration::from_secs(3600)).await;
        backend.set(&key(2), Bytes::from_static(b"b"), 60).await.unwrap();

        assert_eq!(backend.len(), 2);
        assert!(backend.get(&key(1)).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn write_before_expiry_keeps_entries() {
        let backend = MemoryCacheBackend::new("test");
        backend.set(&key(1), Bytes::from_static(b"a"), 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        backend.set(&key(2), Bytes::from_static(b"b"), 10).await.unwrap();
        assert_eq!(backend.len(), 2);

        tokio::time::advance(Duration::from_secs(6)).await;
        backend.set(&key(3), Bytes::from_static(b"c"), 10).await.unwrap();
        assert_eq!(backend.len(), 2);
        assert!(backend.get(&key(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_ttl_stores_nothing() {
        let backend = MemoryCacheBackend::new("test");
        backend.set(&key(1), Bytes::from_static(b"a"), 0).await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn prefixes_isolate_backends() {
        let first = MemoryCacheBackend::new("one");
        let second = MemoryCacheBackend::new("two");
        first.set(&key(1), Bytes::from_static(b"a"), 60).await.unwrap();

        assert!(first.get(&key(1)).await.unwrap().is_some());
        assert!(second.get(&key(1)).await.unwrap().is_none());
        assert_eq!(first.prefix(), "one");
    }
}

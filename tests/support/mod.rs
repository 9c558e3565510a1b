#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;

use spimex_trading::application::query::{SortKey, TradingQuery};
use spimex_trading::application::repos::{HealthRepo, RepoError, TradingRepo};
use spimex_trading::application::trading::TradingService;
use spimex_trading::cache::{
    CacheBackend, CacheError, CacheKey, MemoryCacheBackend, PublicationSchedule, ReadThrough,
};
use spimex_trading::domain::trading::{NewTradingRecord, TradingRecord};

/// Reference repository: a linear scan over a vector, evaluated exactly as
/// the query describes.
#[derive(Default)]
pub struct InMemoryTradingRepo {
    rows: Mutex<Vec<TradingRecord>>,
    record_calls: AtomicUsize,
    date_calls: AtomicUsize,
}

impl InMemoryTradingRepo {
    pub async fn seeded(records: Vec<NewTradingRecord>) -> Arc<Self> {
        let repo = Arc::new(Self::default());
        repo.insert_records(&records)
            .await
            .expect("seed records are valid");
        repo
    }

    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    pub fn date_calls(&self) -> usize {
        self.date_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    async fn scan(&self, query: &TradingQuery) -> Vec<TradingRecord> {
        let rows = self.rows.lock().await;
        let mut matched: Vec<TradingRecord> = rows
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| compare(query.order(), a, b));
        matched
    }
}

fn compare(order: &[SortKey], a: &TradingRecord, b: &TradingRecord) -> CmpOrdering {
    order
        .iter()
        .map(|key| match key {
            SortKey::DateDesc => b.date.cmp(&a.date),
            SortKey::IdAsc => a.id.cmp(&b.id),
        })
        .find(|ordering| *ordering != CmpOrdering::Equal)
        .unwrap_or(CmpOrdering::Equal)
}

fn window<T>(items: impl Iterator<Item = T>, query: &TradingQuery) -> Vec<T> {
    items
        .skip(query.offset() as usize)
        .take(query.limit() as usize)
        .collect()
}

#[async_trait]
impl TradingRepo for InMemoryTradingRepo {
    async fn fetch_records(&self, query: &TradingQuery) -> Result<Vec<TradingRecord>, RepoError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        let matched = self.scan(query).await;
        Ok(window(matched.into_iter(), query))
    }

    async fn fetch_dates(&self, query: &TradingQuery) -> Result<Vec<Date>, RepoError> {
        self.date_calls.fetch_add(1, Ordering::SeqCst);
        let distinct: BTreeSet<Date> = self.scan(query).await.into_iter().map(|r| r.date).collect();
        Ok(window(distinct.into_iter().rev(), query))
    }

    async fn insert_records(&self, records: &[NewTradingRecord]) -> Result<u64, RepoError> {
        if let Some(bad) = records
            .iter()
            .find(|r| r.volume < 0 || r.count < 0 || r.total < Decimal::ZERO)
        {
            return Err(RepoError::Integrity {
                message: format!("negative measure for {}", bad.exchange_product_id),
            });
        }

        let mut rows = self.rows.lock().await;
        let stamped_at = OffsetDateTime::now_utc();
        let mut next_id = rows.last().map(|r| r.id).unwrap_or(0);
        for record in records {
            next_id += 1;
            rows.push(record.clone().into_record(next_id, stamped_at));
        }
        Ok(records.len() as u64)
    }
}

#[async_trait]
impl HealthRepo for InMemoryTradingRepo {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Repository whose every call fails with the configured error kind.
pub struct FailingRepo {
    pub timeout: bool,
}

impl FailingRepo {
    fn error(&self) -> RepoError {
        if self.timeout {
            RepoError::Timeout
        } else {
            RepoError::from_persistence("connection refused")
        }
    }
}

#[async_trait]
impl TradingRepo for FailingRepo {
    async fn fetch_records(&self, _query: &TradingQuery) -> Result<Vec<TradingRecord>, RepoError> {
        Err(self.error())
    }

    async fn fetch_dates(&self, _query: &TradingQuery) -> Result<Vec<Date>, RepoError> {
        Err(self.error())
    }

    async fn insert_records(&self, _records: &[NewTradingRecord]) -> Result<u64, RepoError> {
        Err(self.error())
    }
}

#[async_trait]
impl HealthRepo for FailingRepo {
    async fn ping(&self) -> Result<(), RepoError> {
        Err(self.error())
    }
}

/// Cache backend that is always unreachable.
pub struct UnreachableCache;

#[async_trait]
impl CacheBackend for UnreachableCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<bytes::Bytes>, CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn set(
        &self,
        _key: &CacheKey,
        _value: bytes::Bytes,
        _ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }
}

pub fn read_through(backend: Arc<dyn CacheBackend>) -> ReadThrough {
    ReadThrough::new(
        backend,
        PublicationSchedule::default(),
        Duration::from_millis(500),
    )
}

pub fn memory_service(repo: Arc<dyn TradingRepo>) -> (TradingService, Arc<MemoryCacheBackend>) {
    let backend = Arc::new(MemoryCacheBackend::new("test"));
    let service = TradingService::new(repo, read_through(backend.clone()));
    (service, backend)
}

pub fn record(oil_id: &str, delivery_type_id: &str, basis: &str, date: Date) -> NewTradingRecord {
    NewTradingRecord {
        exchange_product_id: format!("{oil_id}{basis}060F"),
        exchange_product_name: format!("Product {oil_id}"),
        oil_id: oil_id.to_string(),
        delivery_basis_id: basis.to_string(),
        delivery_basis_name: format!("Basis {basis}"),
        delivery_type_id: delivery_type_id.to_string(),
        volume: 60,
        total: dec!(5997120.00),
        count: 1,
        date,
    }
}

/// Four rows across three consecutive trading days.
pub fn august_fixture() -> Vec<NewTradingRecord> {
    use time::macros::date;

    vec![
        record("A100", "F", "NVY", date!(2024 - 08 - 07)),
        record("A100", "F", "ANK", date!(2024 - 08 - 08)),
        record("A592", "W", "NVY", date!(2024 - 08 - 09)),
        record("A100", "W", "NVY", date!(2024 - 08 - 09)),
    ]
}

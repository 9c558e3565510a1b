//! Redis cache backend (`GET` / `SET EX`).

use async_trait::async_trait;
use bytes::Bytes;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use super::backend::{CacheBackend, CacheError};
use super::keys::CacheKey;

#[derive(Clone)]
pub struct RedisCacheBackend {
    prefix: String,
    connection: ConnectionManager,
}

impl RedisCacheBackend {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;
        let prefix = prefix.into();
        info!(prefix = %prefix, "Connected to redis cache");
        Ok(Self { prefix, connection })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = connection
            .get(key.storage_key(&self.prefix))
            .await
            .map_err(CacheError::backend)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &CacheKey, value: Bytes, ttl_seconds: u64) -> Result<(), CacheError> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key.storage_key(&self.prefix), value.as_ref(), ttl_seconds)
            .await
            .map_err(CacheError::backend)
    }
}

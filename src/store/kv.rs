use redis::AsyncCommands;
use redis::Client;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AppResult;

/// Minimal string key-value storage backing the local watchlist
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> AppResult<()>;
}

/// Redis-backed persistent storage
#[derive(Clone)]
pub struct RedisKeyValue {
    redis_client: Client,
}

impl RedisKeyValue {
    /// Creates the client; the connection itself is opened lazily per operation
    pub fn open(redis_url: &str) -> AppResult<Self> {
        let redis_client = Client::open(redis_url)?;
        Ok(Self { redis_client })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisKeyValue {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            tracing::warn!(error = %e, key = %key, "Redis get failed");
            e
        })?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key, value).await.map_err(|e| {
            tracing::warn!(error = %e, key = %key, "Redis set failed");
            e
        })?;
        Ok(())
    }
}

/// In-process storage; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValue {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }
}

// Redis round-trip tests need a running server; set REDIS_URL to point at one.

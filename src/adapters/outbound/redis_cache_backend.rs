//! Redis Cache Backend
//!
//! Implements CacheBackend on a Redis server through a multiplexed
//! async connection shared by all requests.

use crate::domain::errors::CacheError;
use crate::domain::ports::CacheBackend;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Server address as host:port
    pub addr: String,
    pub password: Option<String>,
    pub db: i64,
}

impl RedisSettings {
    /// Connection URL in the form `redis://[:password@]host:port/db`.
    ///
    /// The password is percent-encoded.
    pub fn url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(password),
                self.addr,
                self.db
            ),
            None => format!("redis://{}/{}", self.addr, self.db),
        }
    }
}

/// Redis-backed cache.
///
/// `MultiplexedConnection` pipelines concurrent commands over one socket
/// and is cheap to clone, so every call works on its own clone.
pub struct RedisCacheBackend {
    connection: MultiplexedConnection,
}

impl RedisCacheBackend {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, CacheError> {
        let client = redis::Client::open(settings.url())
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::debug!("redis at {} answered {}", settings.addr, pong);

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

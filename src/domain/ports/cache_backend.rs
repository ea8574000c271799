//! Cache Backend Port
//!
//! Defines the interface for the key/value store used as a read-through cache.

use crate::domain::errors::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value store with per-entry expiry.
///
/// Values are opaque bytes. Any call may fail transiently; callers treat
/// failures as cache misses.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value. `Ok(None)` means the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Name used in log lines.
    fn name(&self) -> &'static str;
}

//! DashMap Cache Backend
//!
//! Implements CacheBackend in process memory using DashMap for lock-free
//! concurrent access. Used when no Redis server is configured.

use crate::domain::errors::CacheError;
use crate::domain::ports::CacheBackend;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache backend with per-entry expiry.
///
/// Expired entries are never returned. They are dropped lazily on read
/// and in bulk by the background sweep started with [`start_gc`](Self::start_gc).
pub struct DashMapCacheBackend {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl DashMapCacheBackend {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Start the background task that removes expired entries.
    pub fn start_gc(&self, interval: Duration) {
        let entries = self.entries.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let removed = Self::sweep(&entries);
                if removed > 0 {
                    tracing::debug!("cache GC removed {} expired entries", removed);
                }
            }
        });
    }

    /// Remove all expired entries now. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        Self::sweep(&self.entries)
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(entries: &DashMap<String, CacheEntry>) -> usize {
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(entries.len())
    }
}

impl Default for DashMapCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for DashMapCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }

        // Guard dropped above; a concurrent set may have refreshed the entry
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_TTL: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = DashMapCacheBackend::new();

        cache.set("geoip:8.8.8.8", b"record".to_vec(), LONG_TTL).await.unwrap();

        let value = cache.get("geoip:8.8.8.8").await.unwrap();
        assert_eq!(value, Some(b"record".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = DashMapCacheBackend::new();
        assert_eq!(cache.get("geoip:1.1.1.1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = DashMapCacheBackend::new();

        cache.set("k", b"first".to_vec(), LONG_TTL).await.unwrap();
        cache.set("k", b"second".to_vec(), LONG_TTL).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_not_returned() {
        let cache = DashMapCacheBackend::new();

        cache
            .set("k", b"value".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = DashMapCacheBackend::new();

        cache
            .set("short", b"a".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        cache.set("long", b"b".to_vec(), LONG_TTL).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_start_gc_sweeps_in_background() {
        let cache = DashMapCacheBackend::new();
        cache
            .set("short", b"a".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();

        cache.start_gc(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache = Arc::new(DashMapCacheBackend::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("geoip:10.0.0.{}", i);
                cache.set(&key, vec![i as u8], LONG_TTL).await.unwrap();
                cache.get(&key).await.unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(vec![i as u8]));
        }
        assert_eq!(cache.len(), 16);
    }
}

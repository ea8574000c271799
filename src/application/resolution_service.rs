//! Resolution Service - Single-address lookup use case
//!
//! Resolves one IP string to a [`GeoRecord`] using the cache-aside pattern:
//! cache check, dataset query on miss, then best-effort cache population.

use crate::domain::entities::GeoRecord;
use crate::domain::errors::LookupError;
use crate::domain::ports::{CacheBackend, GeoDataset};
use crate::domain::value_objects::CacheKey;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Time a resolved record stays in the cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Resolution service - main application use case.
///
/// Holds shared handles to the dataset and the cache backend and no
/// mutable state of its own, so one instance serves every request.
///
/// Cache failures never reach the caller: a read error degrades to a
/// dataset lookup and a write error is only logged.
pub struct ResolutionService {
    dataset: Arc<dyn GeoDataset>,
    cache: Arc<dyn CacheBackend>,
    cache_ttl: Duration,
}

impl ResolutionService {
    /// Create a new resolution service using [`DEFAULT_CACHE_TTL`].
    pub fn new(dataset: Arc<dyn GeoDataset>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            dataset,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Override the TTL applied to cache writes.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Resolve an IP string to geographic metadata.
    ///
    /// # Errors
    /// * [`LookupError::InvalidInput`] if `raw` is not an IPv4 or IPv6 address;
    ///   no cache or dataset access happens in that case
    /// * [`LookupError::NotFound`] if the dataset has no entry for the address
    /// * [`LookupError::Dataset`] if the dataset read fails
    pub async fn resolve(&self, raw: &str) -> Result<GeoRecord, LookupError> {
        let ip: IpAddr = raw
            .parse()
            .map_err(|_| LookupError::invalid_address(raw))?;

        let key = CacheKey::for_ip(raw);

        if let Some(record) = self.read_cached(&key).await {
            tracing::debug!("served {} from cache", raw);
            return Ok(record);
        }

        let location = self.dataset.lookup(ip).map_err(|e| {
            let err = LookupError::from(e);
            match &err {
                LookupError::NotFound => tracing::debug!("{} not found in dataset", raw),
                _ => tracing::warn!("dataset lookup for {} failed: {}", raw, err),
            }
            err
        })?;

        let record = GeoRecord::from_location(raw, &location);
        self.write_cached(&key, &record).await;

        Ok(record)
    }

    /// Read and decode a cached record. Every failure counts as a miss.
    async fn read_cached(&self, key: &CacheKey) -> Option<GeoRecord> {
        let bytes = match self.cache.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    "{} cache read for {} failed, falling back to dataset: {}",
                    self.cache.name(),
                    key,
                    e
                );
                return None;
            }
        };

        match serde_json::from_slice::<GeoRecord>(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Encode and store a record. Failures are logged and swallowed.
    async fn write_cached(&self, key: &CacheKey, record: &GeoRecord) {
        let bytes = match serde_json::to_vec(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to encode record for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(key.as_str(), bytes, self.cache_ttl).await {
            tracing::warn!("failed to cache result for {}: {}", key, e);
        }
    }
}

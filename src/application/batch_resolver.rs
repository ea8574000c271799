//! Batch Resolver - Multi-address lookup use case
//!
//! Fans a list of IP strings out to the [`ResolutionService`] and collects
//! the outcomes into a [`BatchResult`]. A failing item never affects the
//! others.

use crate::application::ResolutionService;
use crate::domain::entities::{BatchResult, GeoRecord};
use crate::domain::errors::LookupError;
use futures::future::join_all;
use std::sync::Arc;

/// Maximum number of addresses accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 100;

pub struct BatchResolver {
    service: Arc<ResolutionService>,
}

impl BatchResolver {
    pub fn new(service: Arc<ResolutionService>) -> Self {
        Self { service }
    }

    /// Resolve every address in `ips`.
    ///
    /// Items are resolved concurrently. Per-item failures become error
    /// records in that item's slot. The result is keyed by the literal
    /// input string; when an address appears more than once, the entry
    /// for its last occurrence wins.
    ///
    /// # Errors
    /// [`LookupError::InvalidInput`] if `ips` is empty or longer than
    /// [`MAX_BATCH_SIZE`]. No lookup is attempted in that case.
    pub async fn resolve_batch(&self, ips: &[String]) -> Result<BatchResult, LookupError> {
        if ips.is_empty() {
            return Err(LookupError::InvalidInput(
                "No IP addresses provided".to_string(),
            ));
        }
        if ips.len() > MAX_BATCH_SIZE {
            return Err(LookupError::InvalidInput(format!(
                "Batch size too large (max {} IPs)",
                MAX_BATCH_SIZE
            )));
        }

        let lookups = ips.iter().map(|ip| async move {
            let record = match self.service.resolve(ip).await {
                Ok(record) => record,
                Err(e) => GeoRecord::failed(ip, &e),
            };
            (ip, record)
        });

        // join_all keeps input order, so later duplicates overwrite earlier ones
        let mut results = BatchResult::with_capacity(ips.len());
        for (ip, record) in join_all(lookups).await {
            results.insert(ip.clone(), record);
        }

        let failed = results.values().filter(|r| r.is_error()).count();
        tracing::debug!(
            "batch resolved {} addresses ({} distinct, {} failed)",
            ips.len(),
            results.len(),
            failed
        );

        Ok(results)
    }
}

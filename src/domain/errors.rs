//! Domain Errors
//!
//! Every failure that leaves the core is classified into one of these types.

/// Failure of a single or batched lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Malformed address, empty batch or oversized batch.
    #[error("{0}")]
    InvalidInput(String),
    /// Well-formed address with no entry in the dataset.
    #[error("IP address not found in database")]
    NotFound,
    /// Dataset read failure unrelated to absence.
    #[error("database lookup failed: {0}")]
    Dataset(String),
}

impl LookupError {
    pub fn invalid_address(raw: &str) -> Self {
        Self::InvalidInput(format!("invalid IP address: {}", raw))
    }
}

/// Failure reported by a [`GeoDataset`](crate::domain::ports::GeoDataset).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("address not found")]
    NotFound,
    #[error("failed to open dataset: {0}")]
    Open(String),
    #[error("failed to read dataset: {0}")]
    Read(String),
}

impl From<DatasetError> for LookupError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound => LookupError::NotFound,
            other => LookupError::Dataset(other.to_string()),
        }
    }
}

/// Failure reported by a [`CacheBackend`](crate::domain::ports::CacheBackend).
///
/// Never surfaced to callers of the resolution service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache command failed: {0}")]
    Command(String),
}

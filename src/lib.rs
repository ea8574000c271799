//! GeoIP API Library
//!
//! This module exposes the GeoIP API components for use in integration tests
//! and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{BatchResolver, ResolutionService, DEFAULT_CACHE_TTL, MAX_BATCH_SIZE};
pub use config::{load_config, Config};
pub use domain::entities::{BatchResult, GeoRecord, LocationData};
pub use domain::errors::{CacheError, DatasetError, LookupError};
pub use domain::ports::{CacheBackend, GeoDataset};

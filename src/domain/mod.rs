//! Domain Layer
//!
//! Entities, value objects, errors and the ports the core depends on.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;

pub use entities::{BatchResult, GeoRecord, LocationData};
pub use errors::{CacheError, DatasetError, LookupError};
pub use value_objects::{preferred_name, CacheKey};

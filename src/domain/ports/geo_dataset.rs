//! GeoIP Dataset Port
//!
//! Defines the interface for reading location data for an IP address.

use crate::domain::entities::LocationData;
use crate::domain::errors::DatasetError;
use std::net::IpAddr;

/// Read-only geolocation dataset.
///
/// This is an outbound port that abstracts the database file.
/// Implementations may use MaxMind GeoLite2, IP2Location, or other formats,
/// and must be safe to call concurrently.
pub trait GeoDataset: Send + Sync {
    /// Look up the location attributes for an address.
    ///
    /// Returns [`DatasetError::NotFound`] when the dataset has no entry for
    /// the address, and another variant when the read itself fails.
    fn lookup(&self, ip: IpAddr) -> Result<LocationData, DatasetError>;
}

//! MaxMind GeoIP Dataset
//!
//! Implements GeoDataset using a MaxMind GeoIP2/GeoLite2 City database.

use crate::domain::entities::LocationData;
use crate::domain::errors::DatasetError;
use crate::domain::ports::GeoDataset;
use maxminddb::{MaxMindDBError, Reader};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// MaxMind City database reader.
///
/// The reader is immutable after opening, so lookups from many
/// request tasks share it without locking.
pub struct MaxMindGeoDataset {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoDataset {
    /// Open a database file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path)
            .map_err(|e| DatasetError::Open(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Build a reader over database bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DatasetError> {
        let reader = Reader::from_source(bytes).map_err(|e| DatasetError::Open(e.to_string()))?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Database type recorded in the file metadata (e.g. "GeoLite2-City").
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

/// Subset of the GeoIP2 City record this service reads.
#[derive(Debug, Default, Deserialize)]
struct CityRecord {
    #[serde(default)]
    country: Option<NamedPlace>,
    #[serde(default)]
    city: Option<NamedPlace>,
    #[serde(default)]
    location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedPlace {
    #[serde(default)]
    iso_code: Option<String>,
    #[serde(default)]
    names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default)]
    accuracy_radius: Option<u16>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    time_zone: Option<String>,
}

impl From<CityRecord> for LocationData {
    fn from(record: CityRecord) -> Self {
        let country = record.country.unwrap_or_default();
        let city = record.city.unwrap_or_default();
        let location = record.location.unwrap_or_default();

        LocationData {
            country_names: country.names,
            country_iso_code: country.iso_code,
            city_names: city.names,
            time_zone: location.time_zone,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy_radius: location.accuracy_radius,
        }
    }
}

impl GeoDataset for MaxMindGeoDataset {
    fn lookup(&self, ip: IpAddr) -> Result<LocationData, DatasetError> {
        match self.reader.lookup::<CityRecord>(ip) {
            Ok(record) => Ok(record.into()),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Err(DatasetError::NotFound),
            Err(e) => Err(DatasetError::Read(e.to_string())),
        }
    }
}

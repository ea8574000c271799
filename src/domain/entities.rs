//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the geolocation domain.
//! They have no external dependencies beyond serde.

use crate::domain::errors::LookupError;
use crate::domain::value_objects::preferred_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Location attributes returned by a dataset for one address.
///
/// Localized fields keep every language the dataset supplies; the
/// resolution service picks one when it builds a [`GeoRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationData {
    /// Country names keyed by language code
    pub country_names: BTreeMap<String, String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_iso_code: Option<String>,
    /// City names keyed by language code
    pub city_names: BTreeMap<String, String>,
    /// IANA time zone name (e.g. "America/Chicago")
    pub time_zone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Uncertainty around the coordinates, in kilometers
    pub accuracy_radius: Option<u16>,
}

/// Result of resolving one IP string.
///
/// Either the geographic fields or `error` carry meaning, never both.
/// Construct with [`GeoRecord::from_location`] or [`GeoRecord::failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// The queried address exactly as provided
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Kilometers of uncertainty; absent when the dataset supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_radius: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeoRecord {
    /// Build a successful record from dataset output.
    ///
    /// Blank strings and a zero accuracy radius become absent fields.
    /// Coordinates are kept only as a pair, and (0, 0) is treated as unknown.
    pub fn from_location(ip: &str, location: &LocationData) -> Self {
        let (latitude, longitude) = match (location.latitude, location.longitude) {
            (Some(lat), Some(lon)) if lat != 0.0 || lon != 0.0 => (Some(lat), Some(lon)),
            _ => (None, None),
        };

        Self {
            ip: ip.to_string(),
            country: preferred_name(&location.country_names),
            country_iso: non_empty(location.country_iso_code.as_deref()),
            city: preferred_name(&location.city_names),
            timezone: non_empty(location.time_zone.as_deref()),
            latitude,
            longitude,
            accuracy_radius: location.accuracy_radius.filter(|r| *r != 0),
            error: None,
        }
    }

    /// Build a failed record carrying only the address and the error message.
    pub fn failed(ip: &str, err: &LookupError) -> Self {
        Self {
            ip: ip.to_string(),
            country: None,
            country_iso: None,
            city: None,
            timezone: None,
            latitude: None,
            longitude: None,
            accuracy_radius: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Outcome of a batch lookup, keyed by the literal requested string.
///
/// Duplicate inputs share one entry.
pub type BatchResult = HashMap<String, GeoRecord>;

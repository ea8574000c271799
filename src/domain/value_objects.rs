//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use std::collections::BTreeMap;

/// Language code used when picking a display name from a localized map.
pub const PREFERRED_LANGUAGE: &str = "en";

/// Prefix prepended to every cache key written by the resolution service.
pub const CACHE_KEY_PREFIX: &str = "geoip:";

/// Key under which a resolved record is cached.
///
/// Derived from the raw input string without normalization, so
/// `"::1"` and `"0:0:0:0:0:0:0:1"` are cached independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the cache key for a raw IP string.
    ///
    /// # Examples
    /// ```
    /// use geoip_api::domain::value_objects::CacheKey;
    ///
    /// assert_eq!(CacheKey::for_ip("8.8.8.8").as_str(), "geoip:8.8.8.8");
    /// ```
    pub fn for_ip(raw: &str) -> Self {
        Self(format!("{}{}", CACHE_KEY_PREFIX, raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pick the display name for [`PREFERRED_LANGUAGE`] out of a localized map.
///
/// Returns `None` when the preferred language is missing or blank. Other
/// languages are never used as a substitute.
pub fn preferred_name(names: &BTreeMap<String, String>) -> Option<String> {
    names
        .get(PREFERRED_LANGUAGE)
        .filter(|name| !name.is_empty())
        .cloned()
}

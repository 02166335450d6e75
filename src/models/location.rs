//! Geocoding match model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// First match returned by the geocoding service.
///
/// Only the coordinates and name are typed. Every other field of the
/// upstream object (country, id, elevation, timezone, ...) is kept in `extra`
/// and serialized back out unchanged, including explicit `null`s.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Place name as reported upstream
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeocodeResult {
    #[cfg(test)]
    pub(crate) fn new(name: &str, latitude: f64, longitude: f64, country: Option<&str>) -> Self {
        let mut extra = Map::new();
        if let Some(country) = country {
            extra.insert("country".to_string(), Value::from(country));
        }
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            extra,
        }
    }

    /// Country name, absent (or null) for some places
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.extra.get("country").and_then(Value::as_str)
    }

    /// Country name, or an empty string when the match has none
    #[must_use]
    pub fn country_or_empty(&self) -> &str {
        self.country().unwrap_or_default()
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

//! Forecast payload and combined city response

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GeocodeResult;

/// Forecast JSON exactly as the forecast service returned it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct WeatherPayload(pub Value);

impl WeatherPayload {
    /// Look up a nested field, e.g. `["current", "temperature_2m"]`
    #[cfg(test)]
    pub(crate) fn field(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.0, |value, key| value.get(key))
    }
}

/// Body of `/api/weather/city`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CombinedResponse {
    pub city: String,
    pub country: String,
    pub weather: WeatherPayload,
}

impl CombinedResponse {
    #[must_use]
    pub fn new(location: GeocodeResult, weather: WeatherPayload) -> Self {
        let country = location.country_or_empty().to_string();
        Self {
            city: location.name,
            country,
            weather,
        }
    }
}

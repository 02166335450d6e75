//! HTTP client for the Open-Meteo geocoding and forecast APIs
//!
//! One outbound GET per call, no retries. Network errors, non-2xx statuses and
//! unreadable bodies all surface as [`RelayError::UpstreamFailure`].

use std::time::Instant;

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::models::{GeocodeResult, WeatherPayload};

/// Variables requested for the `current` block
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m,visibility";
/// Variables requested for the `hourly` series
pub const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
/// Variables requested for the `daily` series
pub const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";

/// Geocoding response from `OpenMeteo`. `results` is omitted when nothing matched.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodeResult>>,
}

/// Client for both Open-Meteo services
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_base_url: String,
    forecast_base_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            geocoding_base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
            forecast_base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a city name to its first geocoding match
    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> Result<GeocodeResult, RelayError> {
        let start_time = Instant::now();
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(city)
        );

        let response: GeocodingResponse = self
            .get_json(&url)
            .await
            .map_err(|e| RelayError::upstream(format!("Error fetching geocode data: {e}")))?;

        let Some(location) = response.results.unwrap_or_default().into_iter().next() else {
            warn!("No results found for city '{}'", city);
            return Err(RelayError::not_found("City not found"));
        };

        info!(
            "Geocoded '{}' to {} ({}) in {:.3}s",
            city,
            location.name,
            location.format_coordinates(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(location)
    }

    /// Fetch the forecast for a coordinate pair, returned unchanged
    #[instrument(skip(self))]
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> Result<WeatherPayload, RelayError> {
        let start_time = Instant::now();
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current={}&hourly={}&daily={}&timezone=auto",
            self.forecast_base_url, latitude, longitude, CURRENT_FIELDS, HOURLY_FIELDS, DAILY_FIELDS
        );

        let payload: Value = self
            .get_json(&url)
            .await
            .map_err(|e| RelayError::upstream(format!("Error fetching weather data: {e}")))?;

        info!(
            "Retrieved forecast for {:.4}, {:.4} in {:.3}s",
            latitude,
            longitude,
            start_time.elapsed().as_secs_f64()
        );

        Ok(WeatherPayload(payload))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> reqwest::Result<T> {
        debug!("OpenMeteo API request URL: {}", url);

        let response = self.client.get(url).send().await?;
        debug!("HTTP response received: {}", response.status());

        response.error_for_status()?.json::<T>().await
    }
}

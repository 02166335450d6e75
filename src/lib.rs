//! `weather-relay` - minimal HTTP relay in front of Open-Meteo
//!
//! Forwards city lookups and forecast requests to the Open-Meteo geocoding
//! and forecast APIs and reshapes the answers for a browser frontend.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use crate::config::RelayConfig;
pub use error::RelayError;
pub use models::{CombinedResponse, GeocodeResult, WeatherPayload};
pub use weather::OpenMeteoClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

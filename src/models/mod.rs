//! Data models for the relay
//!
//! All values here live for the duration of a single inbound request:
//! - Location: the first geocoding match for a city name
//! - Weather: the opaque forecast payload and the combined city response

pub mod location;
pub mod weather;

pub use location::GeocodeResult;
pub use weather::{CombinedResponse, WeatherPayload};

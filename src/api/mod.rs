use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::RelayError,
    models::{CombinedResponse, GeocodeResult, WeatherPayload},
    weather::{self, OpenMeteoClient},
};

/// Shared, read-only request state
pub struct AppState {
    pub open_meteo: OpenMeteoClient,
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize)]
pub struct WelcomeMessage {
    pub message: &'static str,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/geocode", get(geocode))
        .route("/weather", get(forecast))
        .route("/weather/city", get(weather_for_city))
}

pub async fn root() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: "Weather API Backend",
    })
}

async fn geocode(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<GeocodeResult>, RelayError> {
    let city = city_param(query)?;
    let location = state.open_meteo.geocode(&city).await?;
    Ok(Json(location))
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordinatesQuery>, QueryRejection>,
) -> Result<Json<WeatherPayload>, RelayError> {
    let Query(coords) = query.map_err(|e| RelayError::invalid_request(e.body_text()))?;
    let payload = state
        .open_meteo
        .forecast(coords.latitude, coords.longitude)
        .await?;
    Ok(Json(payload))
}

async fn weather_for_city(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<CombinedResponse>, RelayError> {
    let city = city_param(query)?;
    let combined = weather::weather_for_city(&state.open_meteo, &city).await?;
    Ok(Json(combined))
}

fn city_param(query: Result<Query<CityQuery>, QueryRejection>) -> Result<String, RelayError> {
    let Query(params) = query.map_err(|e| RelayError::invalid_request(e.body_text()))?;
    if params.city.trim().is_empty() {
        return Err(RelayError::invalid_request(
            "Query parameter 'city' must not be empty",
        ));
    }
    Ok(params.city)
}

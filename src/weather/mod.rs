use tracing::{debug, instrument};

use crate::error::RelayError;
use crate::models::CombinedResponse;

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Geocode `city`, then fetch the forecast at its first match.
///
/// The forecast call only happens once geocoding has succeeded.
#[instrument(skip(client))]
pub async fn weather_for_city(
    client: &OpenMeteoClient,
    city: &str,
) -> Result<CombinedResponse, RelayError> {
    let location = client.geocode(city).await.map_err(categorize)?;
    debug!(
        "Resolved '{}' to {} at ({})",
        city,
        location.name,
        location.format_coordinates()
    );

    let weather = client
        .forecast(location.latitude, location.longitude)
        .await
        .map_err(categorize)?;

    Ok(CombinedResponse::new(location, weather))
}

/// Pass categorized upstream errors through, wrap everything else
fn categorize(err: RelayError) -> RelayError {
    match err {
        RelayError::NotFound { .. } | RelayError::UpstreamFailure { .. } => err,
        RelayError::Unexpected { message } | RelayError::InvalidRequest { message } => {
            RelayError::unexpected(message)
        }
    }
}

//! Error taxonomy shared by the client, the locator and the controller.
//!
//! Every variant is recoverable: the controller turns it into a banner
//! message via [`WeatherError::user_message`] and stays usable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location unavailable: {0}")]
    GeolocationDenied(#[from] LocationError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Network, parse or status failure on either weather endpoint.
    /// The payload is the diagnostic chain; it is never shown to the user.
    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),

    #[error("No location matches '{0}'")]
    SearchNotFound(String),

    #[error("Location search failed: {0}")]
    SearchFailed(String),

    /// The service cannot be constructed from the current configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    /// Message for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::GeolocationDenied(_) => {
                "Unable to retrieve your location. Please enable location services."
            }
            WeatherError::InvalidCoordinates(_) => "Invalid coordinates. Please try again.",
            WeatherError::FetchFailed(_) => {
                "An error occurred while fetching weather data. Please try again later."
            }
            WeatherError::SearchNotFound(_) => {
                "Location not found. Please try a different search term."
            }
            WeatherError::SearchFailed(_) => {
                "An error occurred while searching for the location. Please try again later."
            }
            WeatherError::Config(_) => {
                "Weather service is not configured. Run `weather configure` first."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_converts_to_geolocation_denied() {
        let err: WeatherError = LocationError::PermissionDenied.into();
        assert!(matches!(err, WeatherError::GeolocationDenied(_)));
        assert!(err.user_message().contains("enable location services"));
    }

    #[test]
    fn config_error_points_at_configure() {
        let err = WeatherError::Config("No OpenWeather API key configured.".into());
        assert!(err.to_string().starts_with("Configuration error: No OpenWeather API key"));
        assert!(err.user_message().contains("weather configure"));
    }

    #[test]
    fn fetch_failure_hides_diagnostics_from_banner() {
        let err = WeatherError::FetchFailed("cod 401: Invalid API key".into());
        assert!(!err.user_message().contains("401"));
        assert!(err.to_string().contains("401"));
    }
}

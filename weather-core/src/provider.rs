use crate::{Config, Coordinate, WeatherReport, error::WeatherError};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Remote source of weather data and place lookups.
///
/// Implementations collapse every transport, parse and status failure into
/// the generic [`WeatherError`] variants; callers never see partial results.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions and forecast for `coord`, fetched concurrently.
    /// Fails with [`WeatherError::FetchFailed`] if either request fails.
    async fn fetch_all(&self, coord: Coordinate) -> Result<WeatherReport, WeatherError>;

    /// Resolve a place name to the coordinate of the best match.
    async fn search(&self, query: &str) -> Result<Coordinate, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// Fails with [`WeatherError::Config`] when no API key is available.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}

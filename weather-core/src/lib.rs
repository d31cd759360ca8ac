//! Core library for the `weather` map application.
//!
//! This crate defines:
//! - The selected coordinate and the controller that keeps map, search and
//!   results panel in sync with it
//! - The OpenWeather client (current conditions, forecast, geocoding)
//! - Weather icon classification and the map viewport / tile model
//! - Configuration handling
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod classify;
pub mod config;
pub mod controller;
pub mod coord;
pub mod error;
pub mod locate;
pub mod map;
pub mod model;
pub mod provider;

pub use classify::WeatherIcon;
pub use config::Config;
pub use controller::{AppState, CoordinateController, Outcome};
pub use coord::{Coordinate, DEFAULT_LOCATION};
pub use error::{LocationError, WeatherError};
pub use locate::{ConfiguredLocator, FixedLocator, Locator};
pub use map::{MapViewport, TileId, TileLayer};
pub use model::{CurrentConditions, Forecast, ForecastEntry, RequestState, WeatherReport};
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::WeatherError;

/// A validated point on the earth's surface.
///
/// Both components are finite, latitude lies in `[-90, 90]` and longitude in
/// `[-180, 180]`. The fields are private so the invariant cannot be bypassed;
/// deserialization goes through [`Coordinate::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = WeatherError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

/// Used when no position is known yet.
pub const DEFAULT_LOCATION: Coordinate = Coordinate { latitude: 28.3974, longitude: 84.1258 };

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(WeatherError::InvalidCoordinates(format!(
                "non-finite value in ({latitude}, {longitude})"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::InvalidCoordinates(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }

        Ok(Self { latitude, longitude })
    }

    /// Build a coordinate from possibly-missing components.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Result<Self, WeatherError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            (None, _) => Err(WeatherError::InvalidCoordinates("latitude is missing".into())),
            (_, None) => Err(WeatherError::InvalidCoordinates("longitude is missing".into())),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`, whitespace around either part is ignored.
impl FromStr for Coordinate {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| {
            WeatherError::InvalidCoordinates(format!("expected 'lat,lon', got '{s}'"))
        })?;

        let parse = |part: &str| part.trim().parse::<f64>().ok();
        Self::from_parts(parse(lat), parse(lon))
    }
}

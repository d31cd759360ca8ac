use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{classify::WeatherIcon, coord::Coordinate};

/// Forecast samples are three hours apart, so eight of them make a day.
pub const SAMPLES_PER_DAY: usize = 8;
/// Number of days shown in the forecast strip.
pub const STRIP_DAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature_c: f64,
    pub description: String,
    /// Metres per second.
    pub wind_speed: f64,
    pub humidity_percent: u8,
}

impl CurrentConditions {
    pub fn icon(&self) -> WeatherIcon {
        WeatherIcon::classify(&self.description)
    }

    pub fn rounded_temperature(&self) -> i64 {
        round_temperature(self.temperature_c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp_seconds: i64,
    pub temperature_c: f64,
    pub description: String,
}

impl ForecastEntry {
    pub fn icon(&self) -> WeatherIcon {
        WeatherIcon::classify(&self.description)
    }

    pub fn rounded_temperature(&self) -> i64 {
        round_temperature(self.temperature_c)
    }

    /// Short weekday name ("Mon") of the entry's local calendar day.
    pub fn weekday_label(&self, utc_offset_seconds: i32) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp(self.timestamp_seconds, 0) else {
            return "?".to_string();
        };

        match FixedOffset::east_opt(utc_offset_seconds) {
            Some(offset) => utc.with_timezone(&offset).format("%a").to_string(),
            None => utc.format("%a").to_string(),
        }
    }
}

/// Time-ordered forecast samples for one coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
    /// Offset of the forecast location from UTC, used for weekday labels.
    pub utc_offset_seconds: i32,
}

impl Forecast {
    /// One entry per day: indices 0, 8, 16, 24, 32.
    pub fn daily_strip(&self) -> Vec<&ForecastEntry> {
        self.entries
            .iter()
            .step_by(SAMPLES_PER_DAY)
            .take(STRIP_DAYS)
            .collect()
    }
}

/// Current conditions and forecast fetched together for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub coordinate: Coordinate,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

/// Lifecycle of the most recent request.
///
/// `Idle` only exists before the first request; afterwards the state cycles
/// between `Loading` and one of the two outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}

fn round_temperature(celsius: f64) -> i64 {
    celsius.round() as i64
}

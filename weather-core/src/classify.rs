use serde::{Deserialize, Serialize};

/// Display category derived from a free-text weather description.
///
/// Three buckets only: anything that is neither clear nor cloudy (snow, mist,
/// thunderstorm, ...) falls into `Rain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherIcon {
    Clear,
    Cloudy,
    Rain,
}

impl WeatherIcon {
    /// First match wins: "clear" is tested before "cloud".
    pub fn classify(description: &str) -> Self {
        let lower = description.to_lowercase();

        if lower.contains("clear") {
            WeatherIcon::Clear
        } else if lower.contains("cloud") {
            WeatherIcon::Cloudy
        } else {
            WeatherIcon::Rain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherIcon::Clear => "clear",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::Rain => "rain",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Clear => "☀",
            WeatherIcon::Cloudy => "☁",
            WeatherIcon::Rain => "☂",
        }
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::{Config, OPENWEATHER_BASE_URL},
    coord::Coordinate,
    error::WeatherError,
    model::{CurrentConditions, Forecast, ForecastEntry, WeatherReport},
};

use super::WeatherProvider;

const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key.to_owned()).with_base_url(config.base_url.as_str()))
    }

    /// GET `path` with the API key and units appended. Non-2xx statuses are errors.
    async fn get(&self, path: &str, params: &[(&str, &str)], endpoint: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, endpoint, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions> {
        let lat = coord.latitude().to_string();
        let lon = coord.longitude().to_string();

        let body = self
            .get("/data/2.5/weather", &[("lat", lat.as_str()), ("lon", lon.as_str())], "current weather")
            .await?;
        check_cod(&body, StatusCode::OK, "current weather")?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(CurrentConditions {
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            description: first_description(&parsed.weather),
            wind_speed: parsed.wind.speed,
            humidity_percent: parsed.main.humidity,
        })
    }

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<Forecast> {
        let lat = coord.latitude().to_string();
        let lon = coord.longitude().to_string();

        let body = self
            .get("/data/2.5/forecast", &[("lat", lat.as_str()), ("lon", lon.as_str())], "5-day forecast")
            .await?;
        check_cod(&body, StatusCode::OK, "5-day forecast")?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        let entries = parsed
            .list
            .into_iter()
            .map(|entry| ForecastEntry {
                timestamp_seconds: entry.dt,
                temperature_c: entry.main.temp,
                description: first_description(&entry.weather),
            })
            .collect();

        Ok(Forecast {
            entries,
            utc_offset_seconds: parsed.city.map(|c| c.timezone).unwrap_or_default(),
        })
    }

    /// `Ok(None)` when the geocoder knows no place by that name.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>> {
        let body = self
            .get("/geo/1.0/direct", &[("q", query), ("limit", "1")], "geocoding")
            .await?;

        let places: Vec<OwPlace> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let coord = Coordinate::new(place.lat, place.lon)
            .with_context(|| format!("Geocoder returned an unusable position for '{query}'"))?;

        tracing::info!(query, name = place.name.as_deref().unwrap_or("?"), %coord, "location found");
        Ok(Some(coord))
    }
}

/// The current endpoint reports `cod` as a number, the forecast endpoint as a
/// string; either spelling of 200 is accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn matches(&self, expected: StatusCode) -> bool {
        match self {
            OwCode::Number(n) => *n == i64::from(expected.as_u16()),
            OwCode::Text(s) => s.trim() == expected.as_str(),
        }
    }
}

impl std::fmt::Display for OwCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwCode::Number(n) => write!(f, "{n}"),
            OwCode::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<OwCode>,
    // numeric 0 on forecast success, a string on errors
    message: Option<serde_json::Value>,
}

fn check_cod(body: &str, expected: StatusCode, endpoint: &str) -> Result<()> {
    let envelope: OwEnvelope = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse OpenWeather {endpoint} JSON"))?;

    match envelope.cod {
        Some(code) if code.matches(expected) => Ok(()),
        Some(code) => Err(anyhow!(
            "OpenWeather {} reported cod {}: {}",
            endpoint,
            code,
            envelope.message.map(|m| m.to_string()).unwrap_or_default(),
        )),
        None => Err(anyhow!("OpenWeather {endpoint} response carried no cod field")),
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: Option<String>,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_all(&self, coord: Coordinate) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) =
            tokio::join!(self.fetch_current(coord), self.fetch_forecast(coord));

        let report = current.and_then(|current| {
            forecast.map(|forecast| WeatherReport { coordinate: coord, current, forecast })
        });

        report.map_err(|err| {
            tracing::warn!(%coord, error = ?err, "weather fetch failed");
            WeatherError::FetchFailed(format!("{err:#}"))
        })
    }

    async fn search(&self, query: &str) -> Result<Coordinate, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::SearchNotFound(String::new()));
        }

        match self.geocode(query).await {
            Ok(Some(coord)) => Ok(coord),
            Ok(None) => Err(WeatherError::SearchNotFound(query.to_string())),
            Err(err) => {
                tracing::warn!(query, error = ?err, "location search failed");
                Err(WeatherError::SearchFailed(format!("{err:#}")))
            }
        }
    }
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

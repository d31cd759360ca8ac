use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    coord::{Coordinate, DEFAULT_LOCATION},
    error::WeatherError,
    map::{DEFAULT_ZOOM, MapViewport, OSM_TILE_URL, TileLayer},
};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// search_zoom = 13
///
/// [home]
/// latitude = 51.5074
/// longitude = -0.1278
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Root of the OpenWeather API; tests point this at a local server.
    pub base_url: String,

    /// Slippy-map tile template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub tile_url: String,

    pub initial_zoom: u8,

    /// Zoom the map jumps to after a successful search.
    pub search_zoom: u8,

    /// Shown until a position is known, and when locating fails.
    pub default_location: Coordinate,

    /// The user's own position, reported by the configured locator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            tile_url: OSM_TILE_URL.to_string(),
            initial_zoom: DEFAULT_ZOOM,
            search_zoom: DEFAULT_ZOOM,
            default_location: DEFAULT_LOCATION,
            home: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.override_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-map", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// A non-empty value replaces whatever the file held.
    pub fn override_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                WeatherError::Config(format!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                ))
            })
    }

    pub fn tile_layer(&self) -> TileLayer {
        TileLayer::new(self.tile_url.clone())
    }

    pub fn initial_viewport(&self) -> MapViewport {
        MapViewport::new(self.default_location, self.initial_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(matches!(err, WeatherError::Config(_)));
        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("weather configure"));
    }

    #[test]
    fn env_override_replaces_file_key() {
        let mut cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        cfg.override_api_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key().expect("key"), "ENV_KEY");
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        cfg.override_api_key(Some("  ".into()));
        cfg.override_api_key(None);
        assert_eq!(cfg.api_key().expect("key"), "FILE_KEY");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_location, DEFAULT_LOCATION);
        assert_eq!(cfg.search_zoom, 13);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            home: Some(Coordinate::new(51.5074, -0.1278).expect("valid")),
            ..Config::default()
        };
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\nsearch_zoom = 10\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.api_key().expect("key"), "abc");
        assert_eq!(cfg.search_zoom, 10);
        assert_eq!(cfg.base_url, OPENWEATHER_BASE_URL);
    }

    #[test]
    fn out_of_range_home_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[home]\nlatitude = 123.0\nlongitude = 0.0\n").expect("write");

        assert!(Config::load_from(&path).is_err());
    }
}

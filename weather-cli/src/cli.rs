use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomUserError, Password, PasswordDisplayMode, Text, validator::Validation};
use weather_core::{
    Config, ConfiguredLocator, Coordinate, CoordinateController, FixedLocator, Locator,
    TileLayer, provider_from_config,
};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast on a map")]
pub struct Cli {
    /// Log more detail to stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Show weather for the current position, or for an explicit coordinate.
    Show {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Treat this "lat,lon" as the device position.
        #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["lat", "lon"])]
        here: Option<Coordinate>,
    },

    /// Look up a place by name and show its weather.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Click the map at "lat,lon".
    Click {
        #[arg(allow_hyphen_values = true)]
        at: Coordinate,
    },

    /// Keep a session open: search, click and zoom from a prompt.
    Interactive {
        #[arg(long, allow_hyphen_values = true)]
        here: Option<Coordinate>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, here } => {
                let app = App::start()?;
                if lat.is_some() || lon.is_some() {
                    app.controller.request_at(lat, lon).await;
                } else {
                    app.controller.mount(app.locator(here).as_ref()).await;
                }
                app.print_panel()
            }
            Command::Search { query } => {
                let app = App::start()?;
                app.controller.search(&query.join(" ")).await;
                app.print_panel()
            }
            Command::Click { at } => {
                let app = App::start()?;
                app.controller.map_click(at).await;
                app.print_panel()
            }
            Command::Interactive { here } => {
                let app = App::start()?;
                session::run(&app.controller, app.locator(here).as_ref(), &app.tiles).await
            }
        }
    }
}

/// Everything a weather command needs, built from the loaded configuration.
struct App {
    config: Config,
    controller: CoordinateController,
    tiles: TileLayer,
}

impl App {
    fn start() -> anyhow::Result<Self> {
        let config = Config::load()?;
        tracing::debug!(base_url = %config.base_url, home = ?config.home, "configuration loaded");
        let controller = CoordinateController::from_config(provider_from_config(&config)?, &config);
        let tiles = config.tile_layer();
        Ok(Self { config, controller, tiles })
    }

    fn locator(&self, here: Option<Coordinate>) -> Arc<dyn Locator> {
        match here {
            Some(position) => Arc::new(FixedLocator(position)),
            None => Arc::new(ConfiguredLocator::new(self.config.home)),
        }
    }

    fn print_panel(&self) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        render::panel(&self.controller.snapshot(), &self.tiles, &mut stdout)
            .context("Failed to write output")
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.api_key = Some(api_key.trim().to_string());

    let current_home = config.home.map(|h| format!("{},{}", h.latitude(), h.longitude()));
    let home = Text::new("Home location as lat,lon (empty for none):")
        .with_initial_value(current_home.as_deref().unwrap_or(""))
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            if input.trim().is_empty() || input.parse::<Coordinate>().is_ok() {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    "expected lat,lon such as 51.5074,-0.1278".into(),
                ))
            }
        })
        .prompt()?;

    config.home = match home.trim() {
        "" => None,
        text => Some(text.parse()?),
    };

    config.save_to(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

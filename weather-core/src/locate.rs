//! Sources for the device's starting position.

use async_trait::async_trait;

use crate::{coord::Coordinate, error::LocationError};

#[async_trait]
pub trait Locator: Send + Sync + std::fmt::Debug {
    /// Single-shot position lookup.
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Uses the `home` coordinate from the configuration file.
#[derive(Debug, Clone)]
pub struct ConfiguredLocator {
    home: Option<Coordinate>,
}

impl ConfiguredLocator {
    pub fn new(home: Option<Coordinate>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Locator for ConfiguredLocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        match self.home {
            Some(home) => {
                tracing::debug!(%home, "using configured home location");
                Ok(home)
            }
            None => Err(LocationError::Unavailable),
        }
    }
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinate);

#[async_trait]
impl Locator for FixedLocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

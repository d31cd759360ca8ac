//! The single owner of "where are we looking" and of what the results panel
//! shows.
//!
//! All state lives in one [`AppState`] cell behind a `watch` channel. Views
//! hold a read-only [`watch::Receiver`]; every write goes through one of the
//! controller's operations. Each fetch and search is tagged with a sequence number and
//! only the latest one may update the panel, so a slow response for an old
//! coordinate can never overwrite newer data.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::Config,
    coord::Coordinate,
    error::WeatherError,
    locate::Locator,
    map::MapViewport,
    model::{RequestState, WeatherReport},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub coordinate: Coordinate,
    pub viewport: MapViewport,
    pub request: RequestState,
    /// Last successfully fetched report. Kept on failure, see [`AppState::is_stale`].
    pub report: Option<WeatherReport>,
    /// Banner for the last failed operation; cleared when a new one starts.
    pub error: Option<String>,
    /// Notice that outlives individual requests (e.g. locating failed).
    pub advisory: Option<String>,
    /// Sequence number of the most recently issued fetch or search.
    pub latest_request: u64,
}

impl AppState {
    pub fn new(viewport: MapViewport) -> Self {
        Self {
            coordinate: viewport.center,
            viewport,
            request: RequestState::Idle,
            report: None,
            error: None,
            advisory: None,
            latest_request: 0,
        }
    }

    /// True when the displayed report does not describe the current
    /// coordinate, or the last attempt to refresh it failed.
    pub fn is_stale(&self) -> bool {
        match &self.report {
            Some(report) => {
                report.coordinate != self.coordinate
                    || matches!(self.request, RequestState::Error(_))
            }
            None => false,
        }
    }
}

/// How an operation ended, as seen by the caller that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer request was issued before this one completed; its result was dropped.
    Superseded,
    Failed,
}

#[derive(Debug)]
pub struct CoordinateController {
    provider: Arc<dyn WeatherProvider>,
    state: watch::Sender<AppState>,
    search_zoom: u8,
}

impl CoordinateController {
    pub fn new(provider: Arc<dyn WeatherProvider>, viewport: MapViewport, search_zoom: u8) -> Self {
        let (state, _) = watch::channel(AppState::new(viewport));
        Self { provider, state, search_zoom }
    }

    pub fn from_config(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        Self::new(provider, config.initial_viewport(), config.search_zoom)
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Start-up: locate the device and fetch its weather, or fall back to the
    /// current (default) coordinate with an advisory.
    pub async fn mount(&self, locator: &dyn Locator) -> Outcome {
        match locator.current_position().await {
            Ok(position) => {
                tracing::info!(%position, "device located");
                self.set_coordinate(position).await
            }
            Err(err) => {
                let err = WeatherError::from(err);
                tracing::warn!(error = %err, "locating failed, using default location");
                self.state.send_modify(|s| s.advisory = Some(err.user_message().to_string()));

                let fallback = self.state.borrow().coordinate;
                self.fetch(fallback).await
            }
        }
    }

    /// Select a coordinate and refresh the weather for it.
    pub async fn set_coordinate(&self, coord: Coordinate) -> Outcome {
        self.state.send_modify(|s| s.advisory = None);
        self.fetch(coord).await
    }

    /// Like [`set_coordinate`](Self::set_coordinate) for raw input; missing or
    /// out-of-range components fail without touching the network.
    pub async fn request_at(&self, latitude: Option<f64>, longitude: Option<f64>) -> Outcome {
        match Coordinate::from_parts(latitude, longitude) {
            Ok(coord) => self.set_coordinate(coord).await,
            Err(err) => {
                tracing::debug!(error = %err, "rejected coordinate input");
                self.fail(&err);
                Outcome::Failed
            }
        }
    }

    /// A click on the map: the view flies there at the current zoom.
    pub async fn map_click(&self, coord: Coordinate) -> Outcome {
        self.state.send_modify(|s| s.viewport.fly_to(coord));
        self.set_coordinate(coord).await
    }

    /// Geocode `query`; on success jump the map there at the search zoom and
    /// fetch its weather.
    ///
    /// A lookup overtaken by a later click, search or refresh leaves the state
    /// untouched and reports [`Outcome::Superseded`].
    pub async fn search(&self, query: &str) -> Outcome {
        let mut seq = 0;
        self.state.send_modify(|s| {
            s.latest_request += 1;
            seq = s.latest_request;
            s.request = RequestState::Loading;
            s.error = None;
        });
        tracing::debug!(seq, query, "location search issued");

        let result = self.provider.search(query).await;
        let zoom = self.search_zoom;
        let mut outcome = Outcome::Superseded;

        self.state.send_if_modified(|s| {
            if seq != s.latest_request {
                return false;
            }

            match &result {
                Ok(coord) => {
                    s.viewport.set_view(*coord, zoom);
                    outcome = Outcome::Applied;
                }
                Err(err) => {
                    let message = err.user_message().to_string();
                    s.request = RequestState::Error(message.clone());
                    s.error = Some(message);
                    outcome = Outcome::Failed;
                }
            }
            true
        });

        match (outcome, result) {
            (Outcome::Applied, Ok(coord)) => self.set_coordinate(coord).await,
            (Outcome::Superseded, _) => {
                tracing::debug!(seq, "discarding superseded search result");
                Outcome::Superseded
            }
            (outcome, _) => outcome,
        }
    }

    /// Fetch again for the coordinate already selected.
    pub async fn refresh(&self) -> Outcome {
        let coord = self.state.borrow().coordinate;
        self.fetch(coord).await
    }

    /// Zoom the map without moving it.
    pub fn set_zoom(&self, zoom: u8) {
        self.state.send_modify(|s| s.viewport.set_zoom(zoom));
    }

    async fn fetch(&self, coord: Coordinate) -> Outcome {
        let seq = self.begin_fetch(coord);
        let result = self.provider.fetch_all(coord).await;
        self.finish_fetch(seq, result)
    }

    fn begin_fetch(&self, coord: Coordinate) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|s| {
            s.latest_request += 1;
            seq = s.latest_request;
            s.coordinate = coord;
            s.viewport.recenter(coord);
            s.request = RequestState::Loading;
            s.error = None;
        });

        tracing::debug!(seq, %coord, "weather fetch issued");
        seq
    }

    fn finish_fetch(&self, seq: u64, result: Result<WeatherReport, WeatherError>) -> Outcome {
        let mut outcome = Outcome::Superseded;

        self.state.send_if_modified(|s| {
            if seq != s.latest_request {
                return false;
            }

            match result {
                Ok(report) => {
                    s.report = Some(report);
                    s.request = RequestState::Success;
                    outcome = Outcome::Applied;
                }
                Err(err) => {
                    let message = err.user_message().to_string();
                    s.request = RequestState::Error(message.clone());
                    s.error = Some(message);
                    outcome = Outcome::Failed;
                }
            }
            true
        });

        if outcome == Outcome::Superseded {
            tracing::debug!(seq, "discarding superseded weather response");
        }
        outcome
    }

    fn fail(&self, err: &WeatherError) {
        let message = err.user_message().to_string();
        self.state.send_modify(|s| {
            s.request = RequestState::Error(message.clone());
            s.error = Some(message);
        });
    }
}

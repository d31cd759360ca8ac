//! Map view model: the viewport that follows the selected coordinate and
//! the slippy-map tile addressing used to draw it.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::coord::Coordinate;

pub const DEFAULT_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 19;
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Web-Mercator cannot represent the poles.
const MERCATOR_LAT_LIMIT: f64 = 85.0511;
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// What the map is currently showing. The marker sits at the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl MapViewport {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self { center, zoom: zoom.min(MAX_ZOOM) }
    }

    /// Follow a coordinate change without touching the zoom level.
    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }

    /// Animate to a clicked point at the current zoom.
    pub fn fly_to(&mut self, center: Coordinate) {
        tracing::debug!(%center, zoom = self.zoom, "map fly-to");
        self.center = center;
    }

    /// Jump to a point at an explicit zoom (search results).
    pub fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(MAX_ZOOM);
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.min(MAX_ZOOM);
    }

    pub fn marker(&self) -> Coordinate {
        self.center
    }

    pub fn center_tile(&self) -> TileId {
        TileId::containing(self.center, self.zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileId {
    /// Tile that contains `coord` at `zoom`.
    pub fn containing(coord: Coordinate, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let n = 2_f64.powi(i32::from(zoom));
        let tiles = 1_u32 << zoom;

        let lat_rad = coord
            .latitude()
            .clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT)
            .to_radians();
        let fx = (coord.longitude() + 180.0) / 360.0 * n;
        let fy = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

        // longitude 180 lands exactly on the right edge and wraps to column 0
        let x = (fx.floor() as u32) % tiles;
        let y = (fy.floor().max(0.0) as u32).min(tiles - 1);

        Self { x, y, z: zoom }
    }
}

/// A tile endpoint templated by `{s}`, `{z}`, `{x}` and `{y}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    template: String,
}

impl TileLayer {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn url(&self, tile: TileId) -> String {
        let subdomain = SUBDOMAINS[((tile.x + tile.y) % SUBDOMAINS.len() as u32) as usize];

        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::new(OSM_TILE_URL)
    }
}

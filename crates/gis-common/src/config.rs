//! Limits shared by every data source.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Limits and tiling parameters passed into both data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GisConfig {
    /// Maximum supported raster width in pixels (largest single GPU texture).
    pub max_raster_width: u64,

    /// Maximum supported raster height in pixels.
    pub max_raster_height: u64,

    /// Pixel width of one web-map tile.
    pub tile_width: u32,

    /// Pixel height of one web-map tile.
    pub tile_height: u32,

    /// Lowest zoom level a tile request may use.
    pub min_zoom: u8,

    /// Highest zoom level a tile request may use.
    pub max_zoom: u8,

    /// Spherical-Mercator latitude limit in degrees.
    pub max_latitude: f64,

    /// Longitude limit in degrees.
    pub max_longitude: f64,
}

impl Default for GisConfig {
    fn default() -> Self {
        Self {
            max_raster_width: 16384,
            max_raster_height: 16384,
            tile_width: 256,
            tile_height: 256,
            min_zoom: 0,
            max_zoom: 15,
            max_latitude: 85.0511,
            max_longitude: 180.0,
        }
    }
}

impl GisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = parse_env("GIS_MAX_RASTER_WIDTH") {
            config.max_raster_width = size;
        }

        if let Some(size) = parse_env("GIS_MAX_RASTER_HEIGHT") {
            config.max_raster_height = size;
        }

        if let Some(size) = parse_env("GIS_TILE_WIDTH") {
            config.tile_width = size;
        }

        if let Some(size) = parse_env("GIS_TILE_HEIGHT") {
            config.tile_height = size;
        }

        if let Some(zoom) = parse_env("GIS_MIN_ZOOM") {
            config.min_zoom = zoom;
        }

        if let Some(zoom) = parse_env("GIS_MAX_ZOOM") {
            config.max_zoom = zoom;
        }

        if let Some(lat) = parse_env("GIS_MAX_LATITUDE") {
            config.max_latitude = lat;
        }

        debug!(?config, "Loaded GIS configuration");
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_raster_width == 0 || self.max_raster_height == 0 {
            return Err("max raster size must be > 0".to_string());
        }

        if self.tile_width == 0 || self.tile_height == 0 {
            return Err("tile dimensions must be > 0".to_string());
        }

        if self.min_zoom > self.max_zoom {
            return Err("min_zoom must be <= max_zoom".to_string());
        }

        // 2^z must fit the tile index type
        if self.max_zoom > 30 {
            return Err("max_zoom must be <= 30".to_string());
        }

        if !(self.max_latitude > 0.0 && self.max_latitude < 90.0) {
            return Err("max_latitude must be within (0, 90)".to_string());
        }

        if !(self.max_longitude > 0.0 && self.max_longitude <= 180.0) {
            return Err("max_longitude must be within (0, 180]".to_string());
        }

        Ok(())
    }

    /// Whether a raster of the given size fits the configured maximum.
    pub fn fits(&self, width: u64, height: u64) -> bool {
        width <= self.max_raster_width && height <= self.max_raster_height
    }
}

/// Read and parse an environment variable, ignoring unparsable values.
fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var = name, value = %val, "Ignoring unparsable environment variable");
            None
        }
    }
}

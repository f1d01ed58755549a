//! Tile server endpoints for the colour and elevation layers.

use gis_common::TileCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two layers fetched for every tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileLayer {
    /// Satellite imagery.
    Color,
    /// Terrain-RGB encoded elevation.
    Height,
}

impl TileLayer {
    pub const ALL: [TileLayer; 2] = [TileLayer::Color, TileLayer::Height];

    pub fn index(&self) -> usize {
        match self {
            TileLayer::Color => 0,
            TileLayer::Height => 1,
        }
    }
}

impl fmt::Display for TileLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileLayer::Color => write!(f, "color"),
            TileLayer::Height => write!(f, "height"),
        }
    }
}

/// One tileset on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    /// Tileset id, e.g. `mapbox.satellite`.
    pub id: String,
    /// Suffix appended after `{y}`, e.g. `.jpg90`.
    pub format: String,
}

impl Tileset {
    pub fn new(id: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
        }
    }
}

/// Where tiles are fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicEndpoints {
    pub base_url: String,
    pub color: Tileset,
    pub height: Tileset,
}

impl Default for MosaicEndpoints {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/v4/".to_string(),
            color: Tileset::new("mapbox.satellite", ".jpg90"),
            height: Tileset::new("mapbox.terrain-rgb", ".pngraw"),
        }
    }
}

impl MosaicEndpoints {
    /// Load endpoints from environment variables.
    pub fn from_env() -> Self {
        let mut endpoints = Self::default();

        if let Ok(val) = std::env::var("MAPBOX_BASE_URL") {
            endpoints.base_url = val;
        }

        if let Ok(val) = std::env::var("MAPBOX_COLOR_TILESET") {
            endpoints.color.id = val;
        }

        if let Ok(val) = std::env::var("MAPBOX_HEIGHT_TILESET") {
            endpoints.height.id = val;
        }

        endpoints
    }

    /// Point every layer at another server, keeping tilesets.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn tileset(&self, layer: TileLayer) -> &Tileset {
        match layer {
            TileLayer::Color => &self.color,
            TileLayer::Height => &self.height,
        }
    }

    /// `{base}/{tileset}/{z}/{x}/{y}{format}?access_token={token}`
    pub fn tile_url(&self, layer: TileLayer, tile: TileCoord, access_token: &str) -> String {
        let tileset = self.tileset(layer);
        format!(
            "{}/{}/{}{}?access_token={}",
            self.base_url.trim_end_matches('/'),
            tileset.id,
            tile.path(),
            tileset.format,
            access_token
        )
    }
}

/// Replace the access token in a tile URL for logging.
pub fn redact_token(url: &str) -> String {
    match url.find("access_token=") {
        Some(pos) => {
            let start = pos + "access_token=".len();
            let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapbox_urls() {
        let endpoints = MosaicEndpoints::default();
        let tile = TileCoord::new(5, 16, 11);
        assert_eq!(
            endpoints.tile_url(TileLayer::Color, tile, "pk.abc"),
            "https://api.mapbox.com/v4/mapbox.satellite/5/16/11.jpg90?access_token=pk.abc"
        );
        assert_eq!(
            endpoints.tile_url(TileLayer::Height, tile, "pk.abc"),
            "https://api.mapbox.com/v4/mapbox.terrain-rgb/5/16/11.pngraw?access_token=pk.abc"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let endpoints = MosaicEndpoints::default().with_base_url("http://localhost:8080");
        assert_eq!(
            endpoints.tile_url(TileLayer::Color, TileCoord::new(0, 0, 0), "t"),
            "http://localhost:8080/mapbox.satellite/0/0/0.jpg90?access_token=t"
        );
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(
            redact_token("https://x/a.png?access_token=secret"),
            "https://x/a.png?access_token=***"
        );
        assert_eq!(
            redact_token("https://x/a.png?access_token=secret&v=2"),
            "https://x/a.png?access_token=***&v=2"
        );
        assert_eq!(redact_token("https://x/a.png"), "https://x/a.png");
    }
}

//! Tile grid planning: which tiles to fetch and how large the mosaic is.

use gis_common::{GisConfig, GisError, GisResult, TileCoord, TileRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoints::{MosaicEndpoints, TileLayer};
use crate::request::MosaicRequest;

/// One fetch to issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRequest {
    pub layer: TileLayer,
    pub tile: TileCoord,
    pub url: String,
}

/// The validated, padded tile grid of a mosaic request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicPlan {
    pub range: TileRange,
    /// Tile columns in the grid.
    pub tiles_x: u32,
    /// Tile rows in the grid.
    pub tiles_y: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Mosaic width in pixels.
    pub width: u32,
    /// Mosaic height in pixels.
    pub height: u32,
    pub requests: Vec<TileRequest>,
}

impl MosaicPlan {
    /// Validate the request and lay out the square tile grid.
    ///
    /// Fails without side effects when the request is invalid or the mosaic
    /// would exceed the configured raster size.
    pub fn build(
        request: &MosaicRequest,
        config: &GisConfig,
        endpoints: &MosaicEndpoints,
    ) -> GisResult<Self> {
        request.validate(config)?;

        let zoom = request.zoom as u32;
        let covering = TileRange::covering(&request.bounds(), zoom);
        let range = covering.pad_to_square().clamp_to_world();
        if !range.within_world() {
            return Err(GisError::invalid_parameter(
                "bounds",
                format!("tile grid {:?} does not fit zoom level {}", range, zoom),
            ));
        }

        let tiles_x = range.tiles_x()?;
        let tiles_y = range.tiles_y()?;
        let width = config.tile_width as u64 * tiles_x as u64;
        let height = config.tile_height as u64 * tiles_y as u64;
        if !config.fits(width, height) {
            return Err(GisError::RasterTooLarge {
                what: "Tile mosaic".to_string(),
                width,
                height,
                max_width: config.max_raster_width,
                max_height: config.max_raster_height,
            });
        }

        let tile_count = tiles_x as usize * tiles_y as usize;
        let mut requests = Vec::with_capacity(tile_count * TileLayer::ALL.len());
        for tile in range.iter() {
            for layer in TileLayer::ALL {
                requests.push(TileRequest {
                    layer,
                    tile,
                    url: endpoints.tile_url(layer, tile, &request.access_token),
                });
            }
        }

        debug!(
            zoom,
            covering = ?covering,
            padded = ?range,
            width,
            height,
            "Planned tile mosaic"
        );

        Ok(Self {
            range,
            tiles_x,
            tiles_y,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            width: width as u32,
            height: height as u32,
            requests,
        })
    }

    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    /// Number of completions that finish the mosaic.
    pub fn total_fetches(&self) -> usize {
        self.requests.len()
    }
}

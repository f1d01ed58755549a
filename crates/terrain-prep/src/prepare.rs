//! One-call terrain preparation.

use gis_common::{Coord, GisConfig, GisData, GisError, GisResult};
use serde::Serialize;
use tracing::{info, instrument};

use crate::color::color_to_bgra;
use crate::frame::{projected_corners, TerrainFrame};
use crate::heights::{rescale_heights, RescaledHeights};
use crate::scale::landscape_scale;

/// Reject data that does not fit a single texture.
pub fn check_limits(gis: &GisData, config: &GisConfig) -> GisResult<()> {
    for (what, width, height) in [
        ("Heightmap", gis.height_width, gis.height_height),
        ("RGB", gis.color_width, gis.color_height),
    ] {
        let (width, height) = (width as u64, height as u64);
        if !config.fits(width, height) {
            return Err(GisError::RasterTooLarge {
                what: what.to_string(),
                width,
                height,
                max_width: config.max_raster_width,
                max_height: config.max_raster_height,
            });
        }
    }
    Ok(())
}

/// Everything a landscape importer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainInput {
    pub heights: RescaledHeights,
    pub height_width: u32,
    pub height_height: u32,
    /// Colour texture, BGRA.
    pub color_bgra: Vec<u8>,
    pub color_width: u32,
    pub color_height: u32,
    pub frame: TerrainFrame,
    pub scale: [f64; 3],
}

/// Serializable summary of a [`TerrainInput`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainMetadata {
    pub height_width: u32,
    pub height_height: u32,
    pub color_width: u32,
    pub color_height: u32,
    pub upper_left: Coord,
    pub lower_right: Coord,
    pub geo_transform: [f64; 6],
    pub projection_wkt: String,
    pub min_height: f64,
    pub max_height: f64,
    pub scale: [f64; 3],
}

impl TerrainInput {
    pub fn metadata(&self) -> TerrainMetadata {
        TerrainMetadata {
            height_width: self.height_width,
            height_height: self.height_height,
            color_width: self.color_width,
            color_height: self.color_height,
            upper_left: self.frame.corners.upper_left,
            lower_right: self.frame.corners.lower_right,
            geo_transform: self.frame.geo_transform.0,
            projection_wkt: self.frame.projection_wkt.clone(),
            min_height: self.heights.min,
            max_height: self.heights.max,
            scale: self.scale,
        }
    }
}

/// Check, convert and georeference retrieved data for import.
#[instrument(skip(gis, config), fields(width = gis.height_width, height = gis.height_height))]
pub fn prepare_terrain(gis: &GisData, config: &GisConfig, scale3d: [f64; 3]) -> GisResult<TerrainInput> {
    gis.validate()?;
    check_limits(gis, config)?;

    let color_bgra = color_to_bgra(gis)?;
    let heights = rescale_heights(gis)?;
    let corners = projected_corners(gis)?;
    let frame = TerrainFrame::new(
        corners,
        gis.height_width,
        gis.height_height,
        gis.projection_wkt.clone(),
    )?;
    let scale = landscape_scale(
        &corners,
        gis.height_width,
        gis.height_height,
        heights.min,
        heights.max,
        scale3d,
    );

    info!(
        min_height = heights.min,
        max_height = heights.max,
        scale_x = scale[0],
        scale_y = scale[1],
        scale_z = scale[2],
        "Terrain prepared"
    );

    Ok(TerrainInput {
        heights,
        height_width: gis.height_width,
        height_height: gis.height_height,
        color_bgra,
        color_width: gis.color_width,
        color_height: gis.color_height,
        frame,
        scale,
    })
}

//! Colour texture channel order.

use gis_common::{GisData, GisError, GisResult, PixelFormat};
use raster_io::{read_dataset, ColorRole, MemDataset, RasterData};
use tracing::debug;

/// Source band feeding each BGRA channel of an RGBA buffer (1-based).
pub const RGBA_TO_BGRA: [usize; 4] = [3, 2, 1, 4];

/// The colour buffer of `gis` in BGRA order.
pub fn color_to_bgra(gis: &GisData) -> GisResult<Vec<u8>> {
    let mapping = match gis.pixel_format {
        PixelFormat::Bgra8 => return Ok(gis.color_buffer.clone()),
        PixelFormat::Rgba8 => RGBA_TO_BGRA,
    };

    let width = gis.color_width as usize;
    let height = gis.color_height as usize;
    let roles = [ColorRole::Red, ColorRole::Green, ColorRole::Blue, ColorRole::Alpha];

    let source = MemDataset::from_interleaved(width, height, 4, &gis.color_buffer, &roles)
        .map_err(|e| GisError::Conversion(format!("Failed to wrap the colour data: {}", e)))?;
    let mut remapped = RasterData::filled(width, height, 4, 255u8);
    read_dataset(&source, &mut remapped, &mapping)
        .map_err(|e| GisError::Conversion(format!("Failed to remap channels for the colour data: {}", e)))?;

    debug!(from = %gis.pixel_format, ?mapping, "Remapped colour channels");
    Ok(remapped.into_inner())
}

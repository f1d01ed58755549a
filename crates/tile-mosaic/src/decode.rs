//! Tile payload decoding.

use image::{ImageFormat, RgbaImage};

use gis_common::{GisError, GisResult};

use crate::endpoints::TileLayer;

/// Formats tried, in order, for every payload.
pub const DECODE_ORDER: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp];

/// Decoded pixels of one tile, ready to be copied into the mosaic.
#[derive(Debug, Clone, PartialEq)]
pub enum TilePixels {
    /// BGRA bytes, 4 per pixel.
    Color(Vec<u8>),
    /// Elevations in metres.
    Height(Vec<f32>),
}

impl TilePixels {
    pub fn layer(&self) -> TileLayer {
        match self {
            TilePixels::Color(_) => TileLayer::Color,
            TilePixels::Height(_) => TileLayer::Height,
        }
    }

    /// Number of pixels held.
    pub fn pixel_count(&self) -> usize {
        match self {
            TilePixels::Color(bgra) => bgra.len() / 4,
            TilePixels::Height(heights) => heights.len(),
        }
    }
}

/// Decode Terrain-RGB channels to metres.
pub fn decode_terrain_rgb(r: u8, g: u8, b: u8) -> f32 {
    let encoded = r as u32 * 65536 + g as u32 * 256 + b as u32;
    (-10000.0 + encoded as f64 * 0.1) as f32
}

/// Decode an image payload, trying each of [`DECODE_ORDER`].
pub fn decode_image(bytes: &[u8]) -> GisResult<RgbaImage> {
    if bytes.is_empty() {
        return Err(GisError::Decode("empty payload".to_string()));
    }

    DECODE_ORDER
        .iter()
        .find_map(|&format| image::load_from_memory_with_format(bytes, format).ok())
        .map(|image| image.to_rgba8())
        .ok_or_else(|| GisError::Decode("payload is not a PNG, JPEG or BMP image".to_string()))
}

/// Decode a tile payload for `layer` and check its size.
pub fn decode_tile(
    layer: TileLayer,
    bytes: &[u8],
    tile_width: u32,
    tile_height: u32,
) -> GisResult<TilePixels> {
    let image = decode_image(bytes)?;
    if image.dimensions() != (tile_width, tile_height) {
        return Err(GisError::Decode(format!(
            "{} tile is {}x{}, expected {}x{}",
            layer,
            image.width(),
            image.height(),
            tile_width,
            tile_height
        )));
    }

    let rgba = image.into_raw();
    Ok(match layer {
        TileLayer::Color => {
            let mut bgra = rgba;
            for px in bgra.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
            TilePixels::Color(bgra)
        }
        TileLayer::Height => TilePixels::Height(
            rgba.chunks_exact(4)
                .map(|px| decode_terrain_rgb(px[0], px[1], px[2]))
                .collect(),
        ),
    })
}

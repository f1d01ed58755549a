//! Test data generators for synthetic tiles and rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma, Rgba, RgbaImage};
use std::io::Cursor;

/// Encode an elevation in metres as Terrain-RGB.
///
/// Inverse of `height = -10000 + (R * 65536 + G * 256 + B) * 0.1`.
pub fn encode_terrain_rgb(height_m: f64) -> [u8; 3] {
    let value = ((height_m + 10000.0) * 10.0).round().clamp(0.0, 16_777_215.0) as u32;
    [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ]
}

/// Creates a Terrain-RGB tile whose elevation is given per pixel.
pub fn terrain_rgb_tile<F>(width: u32, height: u32, elevation: F) -> RgbaImage
where
    F: Fn(u32, u32) -> f64,
{
    ImageBuffer::from_fn(width, height, |x, y| {
        let [r, g, b] = encode_terrain_rgb(elevation(x, y));
        Rgba([r, g, b, 255])
    })
}

/// Creates a colour tile with a constant RGBA value.
pub fn solid_color_tile(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    ImageBuffer::from_pixel(width, height, Rgba(rgba))
}

/// Creates a colour tile where every pixel encodes its position.
///
/// Pixel `(x, y)` is `(x, y, tag, 255)`, so a stitched mosaic can be checked
/// for placement by reading the channels back.
pub fn position_color_tile(width: u32, height: u32, tag: u8) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, tag, 255]))
}

/// Encodes an image as PNG bytes.
pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(image.clone()), ImageOutputFormat::Png)
}

/// Encodes an image as JPEG bytes (alpha dropped).
pub fn jpeg_bytes(image: &RgbaImage, quality: u8) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    encode(DynamicImage::ImageRgb8(rgb), ImageOutputFormat::Jpeg(quality))
}

/// Encodes an image as BMP bytes.
pub fn bmp_bytes(image: &RgbaImage) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(image.clone()), ImageOutputFormat::Bmp)
}

fn encode(image: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("in-memory image encoding");
    buf
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates an elevation ramp from `low` (top-left) to `high` (bottom-right).
pub fn create_elevation_grid(width: usize, height: usize, low: f32, high: f32) -> Vec<f32> {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(low + (high - low) * (col + row) as f32 / span);
        }
    }
    data
}

/// Creates a grid filled with a single value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates three 8-bit colour bands (R, G, B) with distinct patterns.
///
/// R grows with the column, G with the row, B is constant 200.
pub fn create_test_rgb_bands(width: usize, height: usize) -> [Vec<u8>; 3] {
    let mut r = Vec::with_capacity(width * height);
    let mut g = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            r.push((col % 256) as u8);
            g.push((row % 256) as u8);
        }
    }
    let b = vec![200u8; width * height];
    [r, g, b]
}

/// Creates a 16-bit grayscale heightmap image from elevation samples.
pub fn heightmap_image_u16(width: u32, height: u32, samples: &[u16]) -> DynamicImage {
    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(width, height, samples.to_vec())
            .expect("sample count matches dimensions");
    DynamicImage::ImageLuma16(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_terrain_rgb() {
        assert_eq!(encode_terrain_rgb(-10000.0), [0, 0, 0]);
        assert_eq!(encode_terrain_rgb(-9999.0), [0, 0, 10]);
        // 0 m -> 100000 = 0x0186A0
        assert_eq!(encode_terrain_rgb(0.0), [0x01, 0x86, 0xA0]);
    }

    #[test]
    fn test_terrain_tile_dimensions() {
        let tile = terrain_rgb_tile(4, 2, |x, _| x as f64);
        assert_eq!(tile.dimensions(), (4, 2));
        assert_eq!(tile.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_encoded_tiles_have_signatures() {
        let tile = solid_color_tile(8, 8, [10, 20, 30, 255]);
        assert_eq!(&png_bytes(&tile)[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(&jpeg_bytes(&tile, 90)[..2], &[0xFF, 0xD8]);
        assert_eq!(&bmp_bytes(&tile)[..2], b"BM");
    }

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_create_elevation_grid() {
        let grid = create_elevation_grid(3, 3, 100.0, 500.0);
        assert_eq!(grid[0], 100.0);
        assert_eq!(grid[8], 500.0);
    }

    #[test]
    fn test_create_test_rgb_bands() {
        let [r, g, b] = create_test_rgb_bands(4, 3);
        assert_eq!(r.len(), 12);
        assert_eq!(r[5], 1);
        assert_eq!(g[5], 1);
        assert!(b.iter().all(|&v| v == 200));
    }
}

//! The GIS data record produced by every data source.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GisError, GisResult};

/// Which of the two input rasters an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetRole {
    Heightmap,
    Color,
}

impl fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetRole::Heightmap => write!(f, "heightmap"),
            DatasetRole::Color => write!(f, "RGB"),
        }
    }
}

/// Channel order of [`GisData::color_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Red, green, blue, alpha.
    Rgba8,
    /// Blue, green, red, alpha.
    #[default]
    Bgra8,
}

impl PixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Rgba8 => "R8G8B8A8",
            PixelFormat::Bgra8 => "B8G8R8A8",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Frame of the corner coordinates in [`GisData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CornerType {
    /// Corners are WGS84 values stored as `(lat, lon)`.
    #[default]
    LatLon,
    /// Corners are in the projected coordinate system named by the WKT.
    Projected,
}

/// A 2D coordinate.
///
/// For [`CornerType::LatLon`] corners `x` holds the latitude and `y` the
/// longitude. For projected corners `x` is easting and `y` northing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a `(lat, lon)` corner.
    pub fn lat_lon(lat: f64, lon: f64) -> Self {
        Self { x: lat, y: lon }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Heightmap and colour rasters plus their geo-referencing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GisData {
    /// Raw height values in metres, row-major.
    pub height_buffer: Vec<f32>,
    pub height_width: u32,
    pub height_height: u32,

    /// Colour values, 4 bytes per pixel, row-major.
    pub color_buffer: Vec<u8>,
    pub color_width: u32,
    pub color_height: u32,

    pub pixel_format: PixelFormat,

    /// WKT of the coordinate system the raster data is projected in.
    pub projection_wkt: String,

    pub corner_type: CornerType,
    pub upper_left: Coord,
    pub lower_right: Coord,
}

impl GisData {
    /// Number of height samples the dimensions call for.
    pub fn expected_height_len(&self) -> usize {
        self.height_width as usize * self.height_height as usize
    }

    /// Number of colour bytes the dimensions call for.
    pub fn expected_color_len(&self) -> usize {
        self.color_width as usize * self.color_height as usize * 4
    }

    /// Check the buffer-length and corner invariants.
    pub fn validate(&self) -> GisResult<()> {
        if self.height_buffer.len() != self.expected_height_len() {
            return Err(GisError::Internal(format!(
                "height buffer holds {} samples, expected {}x{}",
                self.height_buffer.len(),
                self.height_width,
                self.height_height
            )));
        }

        if self.color_buffer.len() != self.expected_color_len() {
            return Err(GisError::Internal(format!(
                "colour buffer holds {} bytes, expected {}x{}x4",
                self.color_buffer.len(),
                self.color_width,
                self.color_height
            )));
        }

        if !self.upper_left.is_finite() || !self.lower_right.is_finite() {
            return Err(GisError::Internal("corner coordinates are not finite".into()));
        }

        let well_formed = match self.corner_type {
            // x = lat, y = lon
            CornerType::LatLon => {
                self.upper_left.x > self.lower_right.x && self.upper_left.y < self.lower_right.y
            }
            CornerType::Projected => {
                self.upper_left.x < self.lower_right.x && self.upper_left.y > self.lower_right.y
            }
        };

        if !well_formed {
            return Err(GisError::Internal(format!(
                "corners {} / {} do not describe a north-up rectangle",
                self.upper_left, self.lower_right
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GisData {
        GisData {
            height_buffer: vec![0.0; 4],
            height_width: 2,
            height_height: 2,
            color_buffer: vec![255; 16],
            color_width: 2,
            color_height: 2,
            pixel_format: PixelFormat::Bgra8,
            projection_wkt: "EPSG:3857".into(),
            corner_type: CornerType::LatLon,
            upper_left: Coord::lat_lon(10.0, -10.0),
            lower_right: Coord::lat_lon(-10.0, 10.0),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_buffer_lengths() {
        let mut data = sample();
        data.height_buffer.pop();
        assert!(data.validate().is_err());

        let mut data = sample();
        data.color_buffer.push(0);
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_validate_corner_orientation() {
        let mut data = sample();
        std::mem::swap(&mut data.upper_left, &mut data.lower_right);
        assert!(data.validate().is_err());

        let mut data = sample();
        data.corner_type = CornerType::Projected;
        data.upper_left = Coord::new(-100.0, 100.0);
        data.lower_right = Coord::new(100.0, -100.0);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(DatasetRole::Heightmap.to_string(), "heightmap");
        assert_eq!(DatasetRole::Color.to_string(), "RGB");
    }
}

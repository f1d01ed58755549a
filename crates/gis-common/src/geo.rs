//! Affine geotransforms and raster corner coordinates.

use serde::{Deserialize, Serialize};

use crate::data::Coord;

/// GDAL-style affine geotransform.
///
/// `x = gt[0] + px * gt[1] + py * gt[2]`,
/// `y = gt[3] + px * gt[4] + py * gt[5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// North-up transform spanning `upper_left`..`lower_right` over
    /// `width`x`height` pixels.
    pub fn from_corners(upper_left: Coord, lower_right: Coord, width: usize, height: usize) -> Self {
        let pixel_w = (lower_right.x - upper_left.x) / width.max(1) as f64;
        let pixel_h = (lower_right.y - upper_left.y) / height.max(1) as f64;
        Self([upper_left.x, pixel_w, 0.0, upper_left.y, 0.0, pixel_h])
    }

    /// Map a pixel/line position to georeferenced coordinates.
    pub fn apply(&self, px: f64, py: f64) -> Coord {
        let gt = &self.0;
        Coord::new(
            gt[0] + px * gt[1] + py * gt[2],
            gt[3] + px * gt[4] + py * gt[5],
        )
    }

    /// Inverse transform, `None` when the matrix is singular.
    pub fn invert(&self) -> Option<GeoTransform> {
        let gt = &self.0;
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        if det.abs() < f64::EPSILON * 1e-6 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        let a = gt[5] * inv_det;
        let b = -gt[2] * inv_det;
        let d = -gt[4] * inv_det;
        let e = gt[1] * inv_det;

        Some(GeoTransform([
            -(gt[0] * a + gt[3] * b),
            a,
            b,
            -(gt[0] * d + gt[3] * e),
            d,
            e,
        ]))
    }

    /// Whether the transform has no rotation terms.
    pub fn is_north_up(&self) -> bool {
        self.0[2] == 0.0 && self.0[4] == 0.0
    }
}

/// The two opposite corners bounding a raster, in its own CRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterCorners {
    pub upper_left: Coord,
    pub lower_right: Coord,
}

/// Pixel size and georeferencing of a raster.
pub trait RasterGeometry {
    /// Raster width in pixels.
    fn width(&self) -> usize;

    /// Raster height in pixels.
    fn height(&self) -> usize;

    /// Affine geotransform, if the raster is georeferenced.
    fn geo_transform(&self) -> Option<GeoTransform>;
}

//! Landscape actor scale.

use gis_common::RasterCorners;

/// Vertical span in centimetres of a landscape at unit z scale
/// (heights -256..256 cm over the full 16-bit sample range).
pub const HEIGHT_RANGE_CM: f64 = 512.0;

/// Per-axis scale, in centimetres per pixel (x, y) and per z unit.
///
/// `scale3d` multiplies the result, `[1.0; 3]` gives true scale.
pub fn landscape_scale(
    corners: &RasterCorners,
    width: u32,
    height: u32,
    min_height: f64,
    max_height: f64,
    scale3d: [f64; 3],
) -> [f64; 3] {
    let metres_per_pixel_x = (corners.lower_right.x - corners.upper_left.x).abs() / width.max(1) as f64;
    let metres_per_pixel_y = (corners.lower_right.y - corners.upper_left.y).abs() / height.max(1) as f64;
    let z = (max_height - min_height) / HEIGHT_RANGE_CM;

    [
        scale3d[0] * 100.0 * metres_per_pixel_x,
        scale3d[1] * 100.0 * metres_per_pixel_y,
        scale3d[2] * 100.0 * z,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gis_common::Coord;

    #[test]
    fn test_scale() {
        let corners = RasterCorners {
            upper_left: Coord::new(0.0, 3000.0),
            lower_right: Coord::new(3000.0, 0.0),
        };
        let scale = landscape_scale(&corners, 100, 300, 100.0, 612.0, [1.0, 1.0, 1.0]);
        assert_eq!(scale, [3000.0, 1000.0, 100.0]);

        let doubled = landscape_scale(&corners, 100, 300, 100.0, 612.0, [2.0, 1.0, 0.5]);
        assert_eq!(doubled, [6000.0, 1000.0, 50.0]);
    }
}

//! Corner coordinates of a georeferenced raster.

use gis_common::{Coord, RasterCorners, RasterGeometry};

/// Upper-left and lower-right corners of a raster in its own CRS.
///
/// Returns `None` when the raster carries no geotransform.
pub fn projected_corners_of<R: RasterGeometry + ?Sized>(raster: &R) -> Option<RasterCorners> {
    let gt = raster.geo_transform()?;
    let w = raster.width() as f64;
    let h = raster.height() as f64;

    let upper_left = Coord::new(gt.0[0], gt.0[3]);
    let lower_right = Coord::new(
        gt.0[0] + w * gt.0[1] + h * gt.0[2],
        gt.0[3] + w * gt.0[4] + h * gt.0[5],
    );

    if !upper_left.is_finite() || !lower_right.is_finite() {
        return None;
    }

    Some(RasterCorners {
        upper_left,
        lower_right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gis_common::GeoTransform;

    struct Fixed {
        gt: Option<GeoTransform>,
    }

    impl RasterGeometry for Fixed {
        fn width(&self) -> usize {
            100
        }

        fn height(&self) -> usize {
            50
        }

        fn geo_transform(&self) -> Option<GeoTransform> {
            self.gt
        }
    }

    #[test]
    fn test_north_up_corners() {
        let raster = Fixed {
            gt: Some(GeoTransform([500000.0, 30.0, 0.0, 4100000.0, 0.0, -30.0])),
        };
        let corners = projected_corners_of(&raster).unwrap();
        assert_eq!(corners.upper_left, Coord::new(500000.0, 4100000.0));
        assert_eq!(corners.lower_right, Coord::new(503000.0, 4098500.0));
    }

    #[test]
    fn test_rotation_terms_are_applied() {
        let raster = Fixed {
            gt: Some(GeoTransform([0.0, 1.0, 0.5, 0.0, 0.25, -1.0])),
        };
        let corners = projected_corners_of(&raster).unwrap();
        assert_eq!(corners.lower_right, Coord::new(125.0, -25.0));
    }

    #[test]
    fn test_missing_geotransform() {
        assert!(projected_corners_of(&Fixed { gt: None }).is_none());
    }
}

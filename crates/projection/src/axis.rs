//! Axis order of WGS84 points handed to and returned from transforms.
//!
//! EPSG:4326 is formally latitude first. Builds with the
//! `traditional-axis-order` feature use the GIS-traditional longitude-first
//! order instead. Every WGS84 point in the workspace is built and read through
//! the two helpers below so both sides of a transform agree.

use gis_common::Coord;

/// Whether WGS84 points are stored `(lon, lat)`.
pub const TRADITIONAL_AXIS_ORDER: bool = cfg!(feature = "traditional-axis-order");

/// Build a WGS84 point in the configured axis order.
pub fn wgs84_point(lat: f64, lon: f64) -> Coord {
    if TRADITIONAL_AXIS_ORDER {
        Coord::new(lon, lat)
    } else {
        Coord::new(lat, lon)
    }
}

/// Read `(lat, lon)` back out of a WGS84 point.
pub fn wgs84_lat_lon(point: Coord) -> (f64, f64) {
    if TRADITIONAL_AXIS_ORDER {
        (point.y, point.x)
    } else {
        (point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let p = wgs84_point(45.5, 7.25);
        assert_eq!(wgs84_lat_lon(p), (45.5, 7.25));
    }

    #[cfg(not(feature = "traditional-axis-order"))]
    #[test]
    fn test_authority_order() {
        let p = wgs84_point(45.5, 7.25);
        assert_eq!((p.x, p.y), (45.5, 7.25));
    }

    #[cfg(feature = "traditional-axis-order")]
    #[test]
    fn test_traditional_order() {
        let p = wgs84_point(45.5, 7.25);
        assert_eq!((p.x, p.y), (7.25, 45.5));
    }
}

//! Coordinate reference system transformations.
//!
//! Implements the handful of projections terrain ingest needs from scratch
//! without external dependencies.

pub mod axis;
pub mod corners;
pub mod mercator;
pub mod transform;
pub mod wkt;

pub use axis::{wgs84_lat_lon, wgs84_point, TRADITIONAL_AXIS_ORDER};
pub use corners::projected_corners_of;
pub use mercator::SphericalMercator;
pub use transform::CoordinateTransform;
pub use wkt::{crs_from_wkt, wkt_for_epsg};

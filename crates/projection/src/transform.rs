//! Point transforms between the supported coordinate systems.

use gis_common::{Coord, CrsCode, GisError, GisResult};
use tracing::debug;

use crate::axis::{wgs84_lat_lon, wgs84_point};
use crate::mercator::SphericalMercator;
use crate::wkt::crs_from_wkt;

/// A resolved transform from one CRS to another.
///
/// WGS84 points follow the workspace axis-order convention
/// (see [`crate::axis`]); projected points are `(easting, northing)`.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    source: CrsCode,
    target: CrsCode,
    mercator: SphericalMercator,
}

impl CoordinateTransform {
    /// Resolve a transform between two WKT definitions.
    pub fn new(from_wkt: &str, to_wkt: &str) -> GisResult<Self> {
        let source = crs_from_wkt(from_wkt)?;
        let target = crs_from_wkt(to_wkt)?;
        debug!(source = %source, target = %target, "Resolved coordinate transform");
        Ok(Self::between(source, target))
    }

    /// Transform between two known CRS codes.
    pub fn between(source: CrsCode, target: CrsCode) -> Self {
        Self {
            source,
            target,
            mercator: SphericalMercator::default(),
        }
    }

    pub fn source(&self) -> CrsCode {
        self.source
    }

    pub fn target(&self) -> CrsCode {
        self.target
    }

    /// Transform a single point.
    pub fn transform(&self, point: Coord) -> GisResult<Coord> {
        if !point.is_finite() {
            return Err(GisError::Conversion(format!(
                "cannot transform non-finite point {}",
                point
            )));
        }

        let out = match (self.source, self.target) {
            (a, b) if a == b => point,
            (CrsCode::Epsg4326, CrsCode::Epsg3857) => {
                let (lat, lon) = wgs84_lat_lon(point);
                if lat.abs() > 90.0 {
                    return Err(GisError::Conversion(format!(
                        "latitude {} is outside [-90, 90]",
                        lat
                    )));
                }
                let (x, y) = self.mercator.forward(lat, lon);
                Coord::new(x, y)
            }
            (CrsCode::Epsg3857, CrsCode::Epsg4326) => {
                let (lat, lon) = self.mercator.inverse(point.x, point.y);
                wgs84_point(lat, lon)
            }
            (source, target) => {
                return Err(GisError::Conversion(format!(
                    "no transform from {} to {}",
                    source, target
                )))
            }
        };

        if !out.is_finite() {
            return Err(GisError::Conversion(format!(
                "transform of {} from {} to {} is not finite",
                point, self.source, self.target
            )));
        }

        Ok(out)
    }
}

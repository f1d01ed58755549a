//! Projected corners and the pixel / WGS84 frame of a terrain raster.

use gis_common::{Coord, CornerType, GeoTransform, GisData, GisError, GisResult, RasterCorners};
use projection::{wgs84_lat_lon, wgs84_point, wkt_for_epsg, CoordinateTransform};
use serde::Serialize;

/// Corners of `gis` in its projected coordinate system.
///
/// Lat/lon corners are transformed from WGS84; projected corners are
/// returned unchanged.
pub fn projected_corners(gis: &GisData) -> GisResult<RasterCorners> {
    let corners = RasterCorners {
        upper_left: gis.upper_left,
        lower_right: gis.lower_right,
    };

    match gis.corner_type {
        CornerType::Projected => Ok(corners),
        CornerType::LatLon => {
            let transform = CoordinateTransform::new(&wkt_for_epsg(4326)?, &gis.projection_wkt)?;
            // LatLon corners store latitude in x
            let project = |c: Coord| transform.transform(wgs84_point(c.x, c.y));
            Ok(RasterCorners {
                upper_left: project(corners.upper_left)?,
                lower_right: project(corners.lower_right)?,
            })
        }
    }
}

/// Maps between raster pixels, projected coordinates and WGS84.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainFrame {
    pub corners: RasterCorners,
    pub width: u32,
    pub height: u32,
    pub geo_transform: GeoTransform,
    pub inverse: GeoTransform,
    pub projection_wkt: String,
}

impl TerrainFrame {
    pub fn new(
        corners: RasterCorners,
        width: u32,
        height: u32,
        projection_wkt: impl Into<String>,
    ) -> GisResult<Self> {
        let geo_transform = GeoTransform::from_corners(
            corners.upper_left,
            corners.lower_right,
            width as usize,
            height as usize,
        );
        let inverse = geo_transform.invert().ok_or_else(|| {
            GisError::Conversion(format!(
                "corners {} / {} give a singular geotransform",
                corners.upper_left, corners.lower_right
            ))
        })?;

        Ok(Self {
            corners,
            width,
            height,
            geo_transform,
            inverse,
            projection_wkt: projection_wkt.into(),
        })
    }

    pub fn projected_for_pixel(&self, px: f64, py: f64) -> Coord {
        self.geo_transform.apply(px, py)
    }

    pub fn pixel_for_projected(&self, point: Coord) -> Coord {
        self.inverse.apply(point.x, point.y)
    }

    /// Pixel position of a WGS84 location.
    pub fn pixel_for_wgs84(&self, lat: f64, lon: f64) -> GisResult<Coord> {
        let transform = CoordinateTransform::new(&wkt_for_epsg(4326)?, &self.projection_wkt)?;
        let projected = transform.transform(wgs84_point(lat, lon))?;
        Ok(self.pixel_for_projected(projected))
    }

    /// WGS84 `(lat, lon)` of a pixel position.
    pub fn wgs84_for_pixel(&self, px: f64, py: f64) -> GisResult<(f64, f64)> {
        let transform = CoordinateTransform::new(&self.projection_wkt, &wkt_for_epsg(4326)?)?;
        let point = transform.transform(self.projected_for_pixel(px, py))?;
        Ok(wgs84_lat_lon(point))
    }

    /// Pixel position scaled to `0..1` across the raster.
    pub fn normalized(&self, pixel: Coord) -> (f64, f64) {
        (
            pixel.x / self.width.max(1) as f64,
            pixel.y / self.height.max(1) as f64,
        )
    }
}

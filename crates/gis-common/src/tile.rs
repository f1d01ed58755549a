//! Slippy-map (spherical Mercator XYZ) tile math.
//!
//! Tile indices follow the web-map convention: `x` grows eastwards from the
//! antimeridian, `y` grows southwards from the northern Mercator limit.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::bbox::LatLonBox;
use crate::data::Coord;
use crate::error::{GisError, GisResult};

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// The `{z}/{x}/{y}` path fragment used by XYZ tile servers.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Number of tiles along one axis at a zoom level.
pub fn tiles_per_axis(zoom: u32) -> i64 {
    1i64 << zoom
}

/// Fractional tile column for a longitude.
pub fn lon_to_tile_x_f(lon: f64, zoom: u32) -> f64 {
    (lon + 180.0) / 360.0 * tiles_per_axis(zoom) as f64
}

/// Fractional tile row for a latitude.
pub fn lat_to_tile_y_f(lat: f64, zoom: u32) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tiles_per_axis(zoom) as f64
}

/// Tile column containing a longitude.
pub fn lon_to_tile_x(lon: f64, zoom: u32) -> i64 {
    lon_to_tile_x_f(lon, zoom).floor() as i64
}

/// Tile row containing a latitude.
pub fn lat_to_tile_y(lat: f64, zoom: u32) -> i64 {
    lat_to_tile_y_f(lat, zoom).floor() as i64
}

/// Longitude of the western edge of a tile column.
pub fn tile_x_to_lon(x: i64, zoom: u32) -> f64 {
    x as f64 / tiles_per_axis(zoom) as f64 * 360.0 - 180.0
}

/// Latitude of the northern edge of a tile row.
pub fn tile_y_to_lat(y: i64, zoom: u32) -> f64 {
    let n = PI - 2.0 * PI * y as f64 / tiles_per_axis(zoom) as f64;
    n.sinh().atan().to_degrees()
}

/// An inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRange {
    pub zoom: u32,
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl TileRange {
    /// Tiles covering a lat/lon box (north edge gives `min_y`).
    ///
    /// Indices are clamped to the pyramid, so `lon = 180` lands in the last
    /// column rather than one past it.
    pub fn covering(bounds: &LatLonBox, zoom: u32) -> Self {
        let last = tiles_per_axis(zoom) - 1;
        Self {
            zoom,
            min_x: lon_to_tile_x(bounds.left_lon, zoom).clamp(0, last),
            min_y: lat_to_tile_y(bounds.upper_lat, zoom).clamp(0, last),
            max_x: lon_to_tile_x(bounds.right_lon, zoom).clamp(0, last),
            max_y: lat_to_tile_y(bounds.lower_lat, zoom).clamp(0, last),
        }
    }

    /// Index span along x (`max_x - min_x`).
    pub fn span_x(&self) -> i64 {
        self.max_x - self.min_x
    }

    /// Index span along y (`max_y - min_y`).
    pub fn span_y(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// Number of tile columns.
    pub fn tiles_x(&self) -> GisResult<u32> {
        tiles_along(self.span_x())
    }

    /// Number of tile rows.
    pub fn tiles_y(&self) -> GisResult<u32> {
        tiles_along(self.span_y())
    }

    pub fn tile_count(&self) -> GisResult<usize> {
        Ok(self.tiles_x()? as usize * self.tiles_y()? as usize)
    }

    pub fn is_square(&self) -> bool {
        self.span_x() == self.span_y()
    }

    /// Grow the smaller dimension until the range is square.
    ///
    /// The larger span (x on ties) stays fixed. The smaller one grows one
    /// tile at a time: its min is decremented while its span is odd, its
    /// max is incremented while the span is even.
    pub fn pad_to_square(mut self) -> Self {
        let x_larger = self.span_x() >= self.span_y();
        let larger = self.span_x().max(self.span_y());

        let (min, max) = if x_larger {
            (&mut self.min_y, &mut self.max_y)
        } else {
            (&mut self.min_x, &mut self.max_x)
        };

        while larger > *max - *min {
            if (*max - *min) % 2 != 0 {
                *min -= 1;
            } else {
                *max += 1;
            }
        }

        self
    }

    /// Translate the range back inside the tile pyramid without changing
    /// its spans. A span wider than the pyramid is capped to the whole axis.
    pub fn clamp_to_world(mut self) -> Self {
        let last = tiles_per_axis(self.zoom) - 1;

        fn shift_into(min: &mut i64, max: &mut i64, last: i64) {
            if *max - *min > last {
                *min = 0;
                *max = last;
                return;
            }
            if *min < 0 {
                let shift = -*min;
                *min += shift;
                *max += shift;
            }
            if *max > last {
                let shift = *max - last;
                *min -= shift;
                *max -= shift;
            }
        }

        shift_into(&mut self.min_x, &mut self.max_x, last);
        shift_into(&mut self.min_y, &mut self.max_y, last);
        self
    }

    /// Whether every index lies within `[0, 2^z - 1]`.
    pub fn within_world(&self) -> bool {
        let last = tiles_per_axis(self.zoom) - 1;
        self.min_x >= 0 && self.min_y >= 0 && self.max_x <= last && self.max_y <= last
    }

    /// Iterate every tile, column-major (x outer, y inner).
    ///
    /// Indices that do not fit a tile coordinate are skipped; check
    /// [`TileRange::within_world`] first.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_x..=self.max_x).flat_map(move |x| {
            (self.min_y..=self.max_y).filter_map(move |y| {
                let x = u32::try_from(x).ok()?;
                let y = u32::try_from(y).ok()?;
                Some(TileCoord::new(self.zoom, x, y))
            })
        })
    }

    /// `(lat, lon)` of the north-west corner of the range.
    pub fn upper_left(&self) -> Coord {
        Coord::lat_lon(
            tile_y_to_lat(self.min_y, self.zoom),
            tile_x_to_lon(self.min_x, self.zoom),
        )
    }

    /// `(lat, lon)` of the south-east corner of the range.
    pub fn lower_right(&self) -> Coord {
        Coord::lat_lon(
            tile_y_to_lat(self.max_y + 1, self.zoom),
            tile_x_to_lon(self.max_x + 1, self.zoom),
        )
    }
}

fn tiles_along(span: i64) -> GisResult<u32> {
    span.checked_add(1)
        .and_then(|count| u32::try_from(count).ok())
        .filter(|count| *count > 0)
        .ok_or_else(|| GisError::Internal(format!("tile span {} is out of range", span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_path() {
        assert_eq!(TileCoord::new(3, 4, 2).path(), "3/4/2");
    }

    #[test]
    fn test_inverse_round_trip() {
        for zoom in 0..=15u32 {
            let n = tiles_per_axis(zoom);
            let step = (n / 16).max(1);
            let mut i = 0;
            while i < n {
                assert_eq!(lon_to_tile_x(tile_x_to_lon(i, zoom), zoom), i, "x={i} z={zoom}");
                let exact = lat_to_tile_y_f(tile_y_to_lat(i, zoom), zoom);
                assert!((exact - i as f64).abs() < 1e-6, "y={i} z={zoom}");
                // Nudge inside the tile to stay clear of the floor boundary
                let lat = tile_y_to_lat(i, zoom) - 1e-9;
                assert_eq!(lat_to_tile_y(lat, zoom), i, "y={i} z={zoom}");
                i += step;
            }
        }
    }

    #[test]
    fn test_fractional_values() {
        assert_eq!(lon_to_tile_x_f(-180.0, 3), 0.0);
        assert_eq!(lon_to_tile_x_f(0.0, 3), 4.0);
        assert!((lat_to_tile_y_f(0.0, 3) - 4.0).abs() < 1e-12);
        assert!((tile_y_to_lat(0, 0) - 85.0511287798).abs() < 1e-6);
    }

    #[test]
    fn test_pad_expands_smaller_dimension() {
        let range = TileRange {
            zoom: 5,
            min_x: 10,
            min_y: 10,
            max_x: 14,
            max_y: 11,
        };
        let padded = range.pad_to_square();
        assert!(padded.is_square());
        // x fixed, y grows: span 1 (odd) -> min-1, span 2 (even) -> max+1, span 3 -> min-1
        assert_eq!((padded.min_x, padded.max_x), (10, 14));
        assert_eq!((padded.min_y, padded.max_y), (8, 12));
    }

    #[test]
    fn test_pad_keeps_square_range() {
        let range = TileRange {
            zoom: 4,
            min_x: 1,
            min_y: 2,
            max_x: 3,
            max_y: 4,
        };
        assert_eq!(range.pad_to_square(), range);
    }

    #[test]
    fn test_clamp_to_world() {
        let range = TileRange {
            zoom: 1,
            min_x: 1,
            min_y: 0,
            max_x: 2,
            max_y: 1,
        };
        let clamped = range.clamp_to_world();
        assert_eq!((clamped.min_x, clamped.max_x), (0, 1));
        assert!(clamped.within_world());
        assert!(clamped.is_square());
    }

    #[test]
    fn test_clamp_caps_range_wider_than_world() {
        let range = TileRange {
            zoom: 1,
            min_x: -1,
            min_y: -1,
            max_x: 2,
            max_y: 2,
        };
        let clamped = range.clamp_to_world();
        assert_eq!((clamped.min_x, clamped.max_x), (0, 1));
        assert_eq!((clamped.min_y, clamped.max_y), (0, 1));
        assert!(clamped.within_world());
    }

    #[test]
    fn test_covering_clamps_to_last_column() {
        let world = LatLonBox::new(85.0511, -180.0, -85.0511, 180.0);
        for zoom in 0..=15u32 {
            let last = tiles_per_axis(zoom) - 1;
            let range = TileRange::covering(&world, zoom);
            assert_eq!((range.min_x, range.max_x), (0, last), "zoom {zoom}");
            assert_eq!((range.min_y, range.max_y), (0, last), "zoom {zoom}");
        }
    }

    #[test]
    fn test_iter_skips_negative_indices() {
        let range = TileRange {
            zoom: 1,
            min_x: -1,
            min_y: 0,
            max_x: 0,
            max_y: 0,
        };
        let tiles: Vec<_> = range.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(tiles, vec![(0, 0)]);
    }

    #[test]
    fn test_inverted_span_is_an_error() {
        let range = TileRange {
            zoom: 2,
            min_x: 3,
            min_y: 0,
            max_x: 1,
            max_y: 0,
        };
        assert!(range.tiles_x().is_err());
        assert!(range.tile_count().is_err());
        assert_eq!(range.tiles_y().unwrap(), 1);
    }

    #[test]
    fn test_iter_is_column_major() {
        let range = TileRange {
            zoom: 2,
            min_x: 0,
            min_y: 1,
            max_x: 1,
            max_y: 2,
        };
        let tiles: Vec<_> = range.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(tiles, vec![(0, 1), (0, 2), (1, 1), (1, 2)]);
        assert_eq!(range.tile_count().unwrap(), 4);
    }

    #[test]
    fn test_range_corners() {
        let range = TileRange {
            zoom: 1,
            min_x: 0,
            min_y: 0,
            max_x: 1,
            max_y: 1,
        };
        let ul = range.upper_left();
        let lr = range.lower_right();
        assert!((ul.x - 85.0511287798).abs() < 1e-6);
        assert_eq!(ul.y, -180.0);
        assert!((lr.x + 85.0511287798).abs() < 1e-6);
        assert_eq!(lr.y, 180.0);
    }
}

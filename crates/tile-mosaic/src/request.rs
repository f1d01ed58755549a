//! Tile mosaic request parameters and their validation.

use gis_common::{GisConfig, GisError, GisResult, LatLonBox};
use serde::{Deserialize, Serialize};

/// A request for the terrain inside a lat/lon box at one zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicRequest {
    pub upper_lat: f64,
    pub left_lon: f64,
    pub lower_lat: f64,
    pub right_lon: f64,
    pub zoom: i32,
    pub access_token: String,
    /// Leave failed tiles as zero data instead of failing the request.
    pub ignore_missing_tiles: bool,
}

impl MosaicRequest {
    pub fn new(bounds: LatLonBox, zoom: i32, access_token: impl Into<String>) -> Self {
        Self {
            upper_lat: bounds.upper_lat,
            left_lon: bounds.left_lon,
            lower_lat: bounds.lower_lat,
            right_lon: bounds.right_lon,
            zoom,
            access_token: access_token.into(),
            ignore_missing_tiles: false,
        }
    }

    pub fn ignore_missing_tiles(mut self, ignore: bool) -> Self {
        self.ignore_missing_tiles = ignore;
        self
    }

    pub fn bounds(&self) -> LatLonBox {
        LatLonBox::new(self.upper_lat, self.left_lon, self.lower_lat, self.right_lon)
    }

    /// Check the request against the configured limits.
    ///
    /// Runs before any network activity.
    pub fn validate(&self, config: &GisConfig) -> GisResult<()> {
        for (name, value) in [
            ("upper_lat", self.upper_lat),
            ("left_lon", self.left_lon),
            ("lower_lat", self.lower_lat),
            ("right_lon", self.right_lon),
        ] {
            if !value.is_finite() {
                return Err(GisError::invalid_parameter(name, "must be a finite number"));
            }
        }

        if self.zoom < config.min_zoom as i32 || self.zoom > config.max_zoom as i32 {
            return Err(GisError::invalid_parameter(
                "zoom",
                format!(
                    "{} is outside the supported range {}..={}",
                    self.zoom, config.min_zoom, config.max_zoom
                ),
            ));
        }

        if self.upper_lat < self.lower_lat {
            return Err(GisError::invalid_parameter(
                "upper_lat",
                format!(
                    "upper latitude {} is below lower latitude {}",
                    self.upper_lat, self.lower_lat
                ),
            ));
        }

        if self.right_lon < self.left_lon {
            return Err(GisError::invalid_parameter(
                "right_lon",
                format!(
                    "right longitude {} is west of left longitude {}",
                    self.right_lon, self.left_lon
                ),
            ));
        }

        for (name, lat) in [("upper_lat", self.upper_lat), ("lower_lat", self.lower_lat)] {
            if lat.abs() > config.max_latitude {
                return Err(GisError::invalid_parameter(
                    name,
                    format!("{} is outside ±{}", lat, config.max_latitude),
                ));
            }
        }

        for (name, lon) in [("left_lon", self.left_lon), ("right_lon", self.right_lon)] {
            if lon.abs() > config.max_longitude {
                return Err(GisError::invalid_parameter(
                    name,
                    format!("{} is outside ±{}", lon, config.max_longitude),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(upper: f64, left: f64, lower: f64, right: f64, zoom: i32) -> MosaicRequest {
        MosaicRequest::new(LatLonBox::new(upper, left, lower, right), zoom, "token")
    }

    fn param_of(err: GisError) -> String {
        match err {
            GisError::InvalidParameter { param, .. } => param,
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        let config = GisConfig::default();
        assert!(request(1.0, -1.0, -1.0, 1.0, 1).validate(&config).is_ok());
        assert!(request(85.0511, -180.0, -85.0511, 180.0, 0).validate(&config).is_ok());
    }

    #[test]
    fn test_zoom_range() {
        let config = GisConfig::default();
        let err = request(1.0, -1.0, -1.0, 1.0, 16).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "zoom");
        let err = request(1.0, -1.0, -1.0, 1.0, -1).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "zoom");
    }

    #[test]
    fn test_inverted_box() {
        let config = GisConfig::default();
        let err = request(-1.0, -1.0, 1.0, 1.0, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "upper_lat");
        let err = request(1.0, 1.0, -1.0, -1.0, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "right_lon");
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let config = GisConfig::default();
        let err = request(86.0, -1.0, -1.0, 1.0, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "upper_lat");
        let err = request(1.0, -1.0, -86.0, 1.0, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "lower_lat");
        let err = request(1.0, -181.0, -1.0, 1.0, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "left_lon");
        let err = request(1.0, -1.0, -1.0, 180.5, 3).validate(&config).unwrap_err();
        assert_eq!(param_of(err), "right_lon");
    }

    #[test]
    fn test_non_finite() {
        let config = GisConfig::default();
        let err = request(f64::NAN, -1.0, -1.0, 1.0, 3).validate(&config).unwrap_err();
        assert!(err.is_input_error());
    }
}

//! Geographic request boxes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A WGS84 box given by its four edges in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBox {
    pub upper_lat: f64,
    pub left_lon: f64,
    pub lower_lat: f64,
    pub right_lon: f64,
}

impl LatLonBox {
    /// Create a new box from its edges.
    pub fn new(upper_lat: f64, left_lon: f64, lower_lat: f64, right_lon: f64) -> Self {
        Self {
            upper_lat,
            left_lon,
            lower_lat,
            right_lon,
        }
    }

    /// Parse "upper_lat,left_lon,lower_lat,right_lon".
    pub fn from_edge_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            upper_lat: parse(parts[0])?,
            left_lon: parse(parts[1])?,
            lower_lat: parse(parts[2])?,
            right_lon: parse(parts[3])?,
        })
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.right_lon - self.left_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.upper_lat - self.lower_lat
    }

    /// Check if a point is contained within this box.
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        lat <= self.upper_lat && lat >= self.lower_lat && lon >= self.left_lon && lon <= self.right_lon
    }
}

impl FromStr for LatLonBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_edge_string(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid box format: {0}. Expected 'upper_lat,left_lon,lower_lat,right_lon'")]
    InvalidFormat(String),

    #[error("Invalid number in box: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edge_string() {
        let bbox = LatLonBox::from_edge_string("46.0, 7.5, 45.5, 8.25").unwrap();
        assert_eq!(bbox.upper_lat, 46.0);
        assert_eq!(bbox.left_lon, 7.5);
        assert_eq!(bbox.lower_lat, 45.5);
        assert_eq!(bbox.right_lon, 8.25);
    }

    #[test]
    fn test_dimensions() {
        let bbox = LatLonBox::new(1.0, -1.0, -1.0, 1.0);
        assert_eq!(bbox.width(), 2.0);
        assert_eq!(bbox.height(), 2.0);
        assert!(bbox.contains_point(0.0, 0.0));
        assert!(!bbox.contains_point(2.0, 0.0));
    }
}

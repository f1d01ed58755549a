//! Spherical (Web) Mercator projection, EPSG:3857.

use std::f64::consts::PI;

/// Spherical Mercator on the WGS84 semi-major axis.
#[derive(Debug, Clone, Copy)]
pub struct SphericalMercator {
    /// Sphere radius (meters)
    pub radius: f64,
}

impl Default for SphericalMercator {
    fn default() -> Self {
        Self {
            radius: Self::EARTH_RADIUS,
        }
    }
}

impl SphericalMercator {
    /// WGS84 semi-major axis used by EPSG:3857.
    pub const EARTH_RADIUS: f64 = 6378137.0;

    /// Latitude at which the projected square world ends.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    /// Convert latitude/longitude in degrees to easting/northing in meters.
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let x = lon_deg.to_radians() * self.radius;
        let y = ((PI / 4.0) + (lat_deg.to_radians() / 2.0)).tan().ln() * self.radius;
        (x, y)
    }

    /// Convert easting/northing in meters back to latitude/longitude.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        (lat, lon)
    }

    /// Half the side of the projected world square (meters).
    pub fn half_extent(&self) -> f64 {
        PI * self.radius
    }
}

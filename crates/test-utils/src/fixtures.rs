//! Common test fixtures for terrain ingest tests.
//!
//! This module provides pre-defined request boxes, georeferencing and
//! on-disk raster writers for common scenarios.

use gis_common::GeoTransform;
use image::DynamicImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common request boxes, `(upper_lat, left_lon, lower_lat, right_lon)`.
pub mod bbox {
    use gis_common::LatLonBox;

    /// Two degrees around the origin; covers all four tiles at zoom 1.
    pub const EQUATOR: LatLonBox = LatLonBox {
        upper_lat: 1.0,
        left_lon: -1.0,
        lower_lat: -1.0,
        right_lon: 1.0,
    };

    /// Matterhorn area; a single tile at low zoom.
    pub const MATTERHORN: LatLonBox = LatLonBox {
        upper_lat: 46.0,
        left_lon: 7.6,
        lower_lat: 45.95,
        right_lon: 7.7,
    };

    /// Wide, short strip across the Alps.
    pub const ALPS_STRIP: LatLonBox = LatLonBox {
        upper_lat: 46.0,
        left_lon: 7.0,
        lower_lat: 45.9,
        right_lon: 9.5,
    };

    /// Upper latitude below the lower latitude.
    pub const INVERTED: LatLonBox = LatLonBox {
        upper_lat: 10.0,
        left_lon: 0.0,
        lower_lat: 20.0,
        right_lon: 5.0,
    };
}

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// A projected CRS that is not otherwise supported.
    pub const UTM_32N_WKT: &str = r#"PROJCS["WGS 84 / UTM zone 32N",GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],AUTHORITY["EPSG","32632"]]"#;
}

/// Common geotransforms.
pub mod geo {
    use gis_common::GeoTransform;

    /// 30 m pixels in a UTM-like frame.
    pub const UTM_30M: GeoTransform = GeoTransform([500000.0, 30.0, 0.0, 5100000.0, 0.0, -30.0]);

    /// 10 m pixels near the Web Mercator origin.
    pub const MERCATOR_10M: GeoTransform = GeoTransform([-5000.0, 10.0, 0.0, 5000.0, 0.0, -10.0]);
}

/// Paths of a raster written together with its sidecars.
#[derive(Debug, Clone)]
pub struct WorldFileRaster {
    pub image: PathBuf,
    pub world_file: PathBuf,
    pub projection: Option<PathBuf>,
}

/// World-file lines (A, D, B, E, C, F) for a geotransform.
///
/// C and F reference the centre of the upper-left pixel.
pub fn world_file_lines(gt: &GeoTransform) -> [f64; 6] {
    let g = &gt.0;
    [
        g[1],
        g[4],
        g[2],
        g[5],
        g[0] + g[1] / 2.0 + g[2] / 2.0,
        g[3] + g[4] / 2.0 + g[5] / 2.0,
    ]
}

/// Writes `{stem}.png`, `{stem}.wld` and, when given, `{stem}.prj` into `dir`.
pub fn write_world_file_raster(
    dir: &Path,
    stem: &str,
    image: &DynamicImage,
    gt: &GeoTransform,
    wkt: Option<&str>,
) -> io::Result<WorldFileRaster> {
    let image_path = dir.join(format!("{}.png", stem));
    image
        .save_with_format(&image_path, image::ImageFormat::Png)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let world_path = dir.join(format!("{}.wld", stem));
    let lines: Vec<String> = world_file_lines(gt).iter().map(|v| v.to_string()).collect();
    fs::write(&world_path, lines.join("\n") + "\n")?;

    let projection = match wkt {
        Some(wkt) => {
            let prj = dir.join(format!("{}.prj", stem));
            fs::write(&prj, wkt)?;
            Some(prj)
        }
        None => None,
    };

    Ok(WorldFileRaster {
        image: image_path,
        world_file: world_path,
        projection,
    })
}

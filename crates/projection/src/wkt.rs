//! Well-Known Text lookup and CRS identification.

use gis_common::{CrsCode, GisError, GisResult};

/// WKT1 of EPSG:4326 as emitted by common raster libraries.
pub const WGS84_WKT: &str = concat!(
    r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,"#,
    r#"AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],"#,
    r#"PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],"#,
    r#"AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#
);

/// WKT1 of EPSG:3857.
pub const WEB_MERCATOR_WKT: &str = concat!(
    r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984","#,
    r#"SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],"#,
    r#"AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],"#,
    r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],"#,
    r#"PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],"#,
    r#"PARAMETER["false_easting",0],PARAMETER["false_northing",0],"#,
    r#"UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],"#,
    r#"EXTENSION["PROJ4","+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 "#,
    r#"+k=1 +units=m +nadgrids=@null +wktext +no_defs"],AUTHORITY["EPSG","3857"]]"#
);

/// Canonical WKT for an EPSG code.
pub fn wkt_for_epsg(code: u32) -> GisResult<String> {
    let crs = CrsCode::from_epsg(code)
        .map_err(|e| GisError::Conversion(format!("no WKT for EPSG:{}: {}", code, e)))?;
    Ok(wkt_for_crs(crs).to_string())
}

/// Canonical WKT for a known CRS.
pub fn wkt_for_crs(crs: CrsCode) -> &'static str {
    match crs {
        CrsCode::Epsg4326 => WGS84_WKT,
        CrsCode::Epsg3857 => WEB_MERCATOR_WKT,
    }
}

/// Identify the CRS a WKT string (or `EPSG:n` identifier) describes.
///
/// The root authority of a WKT1/WKT2 definition is its last `AUTHORITY` or
/// `ID` node, so nested datum and unit codes are skipped.
pub fn crs_from_wkt(wkt: &str) -> GisResult<CrsCode> {
    let trimmed = wkt.trim();
    if trimmed.is_empty() {
        return Err(GisError::Conversion("empty coordinate system definition".into()));
    }

    if let Ok(crs) = CrsCode::from_identifier(trimmed) {
        return Ok(crs);
    }

    let code = root_epsg_code(trimmed).ok_or_else(|| {
        GisError::Conversion(format!(
            "coordinate system has no EPSG authority: {}",
            abbreviate(trimmed)
        ))
    })?;

    CrsCode::from_epsg(code).map_err(|e| GisError::Conversion(e.to_string()))
}

fn root_epsg_code(wkt: &str) -> Option<u32> {
    let start = ["AUTHORITY[\"EPSG\",", "ID[\"EPSG\","]
        .iter()
        .filter_map(|tag| wkt.rfind(tag).map(|pos| pos + tag.len()))
        .max()?;

    let digits: String = wkt[start..]
        .trim_start_matches(|c: char| c == '"' || c.is_whitespace())
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

fn abbreviate(wkt: &str) -> String {
    const MAX: usize = 60;
    match wkt.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &wkt[..idx]),
        None => wkt.to_string(),
    }
}

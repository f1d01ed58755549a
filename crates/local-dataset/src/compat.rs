//! Compatibility checks between the heightmap and colour datasets.

use gis_common::{DatasetRole, GisConfig, GisError, GisResult, RasterCorners};
use raster_io::{ColorRole, RasterDataset};
use tracing::warn;

/// Bands the colour dataset must provide (R, G, B).
pub const REQUIRED_COLOR_BANDS: usize = 3;

/// WKT strings must match exactly.
///
/// Equivalent systems written differently are rejected.
pub fn check_same_crs(heightmap_wkt: &str, color_wkt: &str) -> GisResult<()> {
    if heightmap_wkt != color_wkt {
        return Err(GisError::CrsMismatch);
    }
    Ok(())
}

pub fn check_same_extent(heightmap: &RasterCorners, color: &RasterCorners) -> GisResult<()> {
    if heightmap.upper_left != color.upper_left || heightmap.lower_right != color.lower_right {
        return Err(GisError::ExtentMismatch {
            heightmap: format!("{} - {}", heightmap.upper_left, heightmap.lower_right),
            color: format!("{} - {}", color.upper_left, color.lower_right),
        });
    }
    Ok(())
}

pub fn check_color_bands(color: &dyn RasterDataset) -> GisResult<()> {
    let found = color.band_count();
    if found < REQUIRED_COLOR_BANDS {
        return Err(GisError::InsufficientBands {
            found,
            required: REQUIRED_COLOR_BANDS,
        });
    }
    Ok(())
}

/// Reject rasters larger than the configured maximum.
pub fn check_raster_size(
    config: &GisConfig,
    dataset: &dyn RasterDataset,
    role: DatasetRole,
) -> GisResult<()> {
    let width = dataset.width() as u64;
    let height = dataset.height() as u64;
    if !config.fits(width, height) {
        let what = match role {
            DatasetRole::Heightmap => "Heightmap",
            DatasetRole::Color => "RGB",
        };
        return Err(GisError::RasterTooLarge {
            what: what.to_string(),
            width,
            height,
            max_width: config.max_raster_width,
            max_height: config.max_raster_height,
        });
    }
    Ok(())
}

/// Log conditions that are suspicious but do not stop the import.
///
/// Returns the number of warnings emitted.
pub fn log_dataset_warnings(heightmap: &dyn RasterDataset, color: &dyn RasterDataset) -> usize {
    let mut warnings = 0;

    if let Ok(Some(no_data)) = heightmap.band(1).map(|info| info.no_data) {
        warn!(
            dataset = heightmap.description(),
            no_data, "Heightmap declares a no-data value; those cells are imported as-is"
        );
        warnings += 1;
    }

    let expected = [ColorRole::Red, ColorRole::Green, ColorRole::Blue];
    for (index, want) in (1..=REQUIRED_COLOR_BANDS).zip(expected) {
        match color.band(index) {
            Ok(info) if info.color_role != want => {
                warn!(
                    dataset = color.description(),
                    band = index,
                    found = ?info.color_role,
                    expected = ?want,
                    "Unexpected colour interpretation"
                );
                warnings += 1;
            }
            _ => {}
        }
    }

    warnings
}

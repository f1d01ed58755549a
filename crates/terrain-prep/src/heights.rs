//! Height sample rescaling.

use gis_common::{DatasetRole, GisData, GisError, GisResult};
use raster_io::{
    read_dataset, translate_dataset, ColorRole, MemDataset, RasterData, RasterDataset,
    TranslateOptions,
};
use tracing::debug;

/// Heights stretched over the full 16-bit range.
#[derive(Debug, Clone, PartialEq)]
pub struct RescaledHeights {
    pub samples: Vec<u16>,
    /// Lowest height in metres, mapped to 0.
    pub min: f64,
    /// Highest height in metres, mapped to 65535.
    pub max: f64,
}

impl RescaledHeights {
    /// Metres per 16-bit step.
    pub fn resolution(&self) -> f64 {
        (self.max - self.min) / u16::MAX as f64
    }
}

/// Map the height buffer linearly from `[min, max]` onto `[0, 65535]`.
///
/// A flat buffer maps every sample to 0.
pub fn rescale_heights(gis: &GisData) -> GisResult<RescaledHeights> {
    let width = gis.height_width as usize;
    let height = gis.height_height as usize;

    let source = MemDataset::new(width, height)
        .with_band(gis.height_buffer.clone(), ColorRole::Gray)
        .map_err(|e| GisError::Conversion(format!("Failed to wrap the height data: {}", e)))?;

    let band = source
        .read_band(1)
        .map_err(|e| GisError::Conversion(e.to_string()))?;
    let (min, max) = band
        .min_max(None)
        .ok_or_else(|| GisError::Conversion("height buffer has no finite samples".into()))?;

    let args = [
        "-ot".to_string(),
        "UInt16".to_string(),
        "-scale".to_string(),
        min.to_string(),
        max.to_string(),
        "0".to_string(),
        u16::MAX.to_string(),
    ];
    let options = TranslateOptions::parse(&args)
        .map_err(|e| GisError::Conversion(format!("Invalid height rescale: {}", e)))?;
    let scaled = translate_dataset(&source, &options)
        .map_err(|e| GisError::Conversion(format!("Failed to rescale the heightmap: {}", e)))?;

    let mut samples = RasterData::filled(width, height, 1, 0u16);
    read_dataset(&scaled, &mut samples, &[1]).map_err(|e| GisError::RasterRead {
        role: DatasetRole::Heightmap,
        message: e.to_string(),
    })?;

    debug!(min, max, samples = width * height, "Rescaled heights to UInt16");
    Ok(RescaledHeights {
        samples: samples.into_inner(),
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gis(heights: Vec<f32>, width: u32, height: u32) -> GisData {
        GisData {
            height_buffer: heights,
            height_width: width,
            height_height: height,
            ..GisData::default()
        }
    }

    #[test]
    fn test_full_range() {
        let out = rescale_heights(&gis(vec![-10.0, 0.0, 10.0, 30.0], 2, 2)).unwrap();
        assert_eq!((out.min, out.max), (-10.0, 30.0));
        assert_eq!(out.samples[0], 0);
        assert_eq!(out.samples[3], 65535);
        // 0 m sits a quarter of the way up
        assert_eq!(out.samples[1], 16384);
    }

    #[test]
    fn test_flat_heights() {
        let out = rescale_heights(&gis(vec![120.0; 6], 3, 2)).unwrap();
        assert!(out.samples.iter().all(|&s| s == 0));
        assert_eq!(out.resolution(), 0.0);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(rescale_heights(&gis(vec![1.0; 3], 2, 2)).is_err());
    }
}

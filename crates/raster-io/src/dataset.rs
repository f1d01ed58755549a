//! Dataset and provider traits.

use std::path::Path;

use gis_common::RasterGeometry;

use crate::band::{BandData, Sample};
use crate::error::{RasterError, Result};
use crate::translate::{translate_dataset, TranslateOptions};
use crate::types::BandInfo;

/// An open raster dataset.
///
/// Band indices are 1-based.
pub trait RasterDataset: RasterGeometry + Send + Sync {
    /// Short human-readable identifier (path or generated name).
    fn description(&self) -> &str;

    /// WKT of the dataset's coordinate system, empty when unknown.
    fn crs_wkt(&self) -> String;

    /// Number of bands.
    fn band_count(&self) -> usize;

    /// Metadata of band `index`.
    fn band(&self, index: usize) -> Result<BandInfo>;

    /// All samples of band `index` in their native type.
    fn read_band(&self, index: usize) -> Result<BandData>;
}

/// Opens datasets and derives new ones from them.
pub trait RasterProvider: Send + Sync {
    /// Backend name used in log records.
    fn name(&self) -> &str;

    /// Open a dataset.
    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>>;

    /// Derive a new in-memory dataset with the given options applied.
    fn translate(
        &self,
        dataset: &dyn RasterDataset,
        options: &TranslateOptions,
    ) -> Result<Box<dyn RasterDataset>> {
        Ok(Box::new(translate_dataset(dataset, options)?))
    }
}

/// Check `index` against the band count of a dataset.
pub(crate) fn check_band_index(index: usize, count: usize) -> Result<()> {
    if index == 0 || index > count {
        return Err(RasterError::BandOutOfRange { index, count });
    }
    Ok(())
}

/// A pixel-interleaved read buffer.
///
/// Sample `c` of pixel `(x, y)` lives at `(y * width + x) * channels + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterData<T> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<T>,
}

impl<T: Sample> RasterData<T> {
    /// Allocate a buffer with every sample set to `fill`.
    pub fn filled(width: usize, height: usize, channels: usize, fill: T) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![fill; width * height * channels],
        }
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

/// Read `bands` of a dataset into consecutive channels of `out`.
///
/// `bands[i]` fills channel `i`; channels beyond `bands.len()` keep their
/// current contents.
pub fn read_dataset<T: Sample>(
    dataset: &dyn RasterDataset,
    out: &mut RasterData<T>,
    bands: &[usize],
) -> Result<()> {
    if out.width != dataset.width() || out.height != dataset.height() {
        return Err(RasterError::BufferMismatch(format!(
            "buffer is {}x{}, dataset is {}x{}",
            out.width,
            out.height,
            dataset.width(),
            dataset.height()
        )));
    }

    if bands.len() > out.channels {
        return Err(RasterError::BufferMismatch(format!(
            "{} band(s) requested for a {}-channel buffer",
            bands.len(),
            out.channels
        )));
    }

    let pixels = out.width * out.height;
    if out.data.len() != pixels * out.channels {
        return Err(RasterError::BufferMismatch(format!(
            "buffer holds {} samples, expected {}",
            out.data.len(),
            pixels * out.channels
        )));
    }

    for (channel, &band) in bands.iter().enumerate() {
        check_band_index(band, dataset.band_count())?;
        let samples = dataset.read_band(band)?.to_vec::<T>();
        if samples.len() != pixels {
            return Err(RasterError::read_failed(format!(
                "band {} returned {} samples, expected {}",
                band,
                samples.len(),
                pixels
            )));
        }

        for (pixel, sample) in samples.into_iter().enumerate() {
            out.data[pixel * out.channels + channel] = sample;
        }
    }

    Ok(())
}

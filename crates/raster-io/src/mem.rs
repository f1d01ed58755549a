//! In-memory datasets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use gis_common::{GeoTransform, RasterGeometry};
use tracing::debug;
use uuid::Uuid;

use crate::band::{BandData, Sample};
use crate::dataset::{check_band_index, RasterDataset, RasterProvider};
use crate::error::{RasterError, Result};
use crate::types::{BandInfo, ColorRole};

#[derive(Debug, Clone, PartialEq)]
struct MemBand {
    info: BandInfo,
    data: BandData,
}

/// A raster held entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemDataset {
    name: String,
    width: usize,
    height: usize,
    geo_transform: Option<GeoTransform>,
    crs_wkt: String,
    bands: Vec<MemBand>,
}

impl MemDataset {
    /// Create an empty dataset with a generated name.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            name: format!("mem-{}", Uuid::new_v4()),
            width,
            height,
            geo_transform: None,
            crs_wkt: String::new(),
            bands: Vec::new(),
        }
    }

    /// Split a pixel-interleaved buffer into one band per channel.
    pub fn from_interleaved<T: Sample>(
        width: usize,
        height: usize,
        channels: usize,
        data: &[T],
        roles: &[ColorRole],
    ) -> Result<Self>
    where
        Vec<T>: Into<BandData>,
    {
        let pixels = width * height;
        if channels == 0 || data.len() != pixels * channels {
            return Err(RasterError::BufferMismatch(format!(
                "{} samples do not form {}x{} pixels of {} channel(s)",
                data.len(),
                width,
                height,
                channels
            )));
        }

        let mut dataset = Self::new(width, height);
        for channel in 0..channels {
            let band: Vec<T> = data.iter().skip(channel).step_by(channels).copied().collect();
            let role = roles.get(channel).copied().unwrap_or_default();
            dataset.push_band(band.into(), role, None)?;
        }
        Ok(dataset)
    }

    pub fn with_geo_transform(mut self, gt: GeoTransform) -> Self {
        self.geo_transform = Some(gt);
        self
    }

    pub fn with_crs_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.crs_wkt = wkt.into();
        self
    }

    /// Append a band.
    ///
    /// Fails when the sample count does not match the dataset size.
    pub fn with_band(mut self, data: impl Into<BandData>, color_role: ColorRole) -> Result<Self> {
        self.push_band(data.into(), color_role, None)?;
        Ok(self)
    }

    /// Append a band carrying a no-data value.
    pub fn with_band_no_data(
        mut self,
        data: impl Into<BandData>,
        color_role: ColorRole,
        no_data: f64,
    ) -> Result<Self> {
        self.push_band(data.into(), color_role, Some(no_data))?;
        Ok(self)
    }

    pub(crate) fn push_band(
        &mut self,
        data: BandData,
        color_role: ColorRole,
        no_data: Option<f64>,
    ) -> Result<()> {
        let expected = self.width * self.height;
        if data.len() != expected {
            return Err(RasterError::BufferMismatch(format!(
                "band {} of {} holds {} samples, expected {}x{}",
                self.bands.len() + 1,
                self.name,
                data.len(),
                self.width,
                self.height
            )));
        }

        let info = BandInfo {
            sample_type: data.sample_type(),
            no_data,
            color_role,
        };
        self.bands.push(MemBand { info, data });
        Ok(())
    }
}

impl RasterGeometry for MemDataset {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }
}

impl RasterDataset for MemDataset {
    fn description(&self) -> &str {
        &self.name
    }

    fn crs_wkt(&self) -> String {
        self.crs_wkt.clone()
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band(&self, index: usize) -> Result<BandInfo> {
        check_band_index(index, self.bands.len())?;
        Ok(self.bands[index - 1].info)
    }

    fn read_band(&self, index: usize) -> Result<BandData> {
        check_band_index(index, self.bands.len())?;
        Ok(self.bands[index - 1].data.clone())
    }
}

/// Serves registered in-memory datasets by path.
#[derive(Debug, Default)]
pub struct MemProvider {
    datasets: RwLock<HashMap<PathBuf, MemDataset>>,
}

impl MemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dataset` openable under `path`.
    pub fn register(&self, path: impl Into<PathBuf>, dataset: MemDataset) {
        let path = path.into();
        debug!(path = %path.display(), dataset = %dataset.name, "Registered in-memory dataset");
        if let Ok(mut datasets) = self.datasets.write() {
            datasets.insert(path, dataset);
        }
    }

    /// Builder-style [`MemProvider::register`].
    pub fn with_dataset(self, path: impl Into<PathBuf>, dataset: MemDataset) -> Self {
        self.register(path, dataset);
        self
    }
}

impl RasterProvider for MemProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>> {
        let datasets = self
            .datasets
            .read()
            .map_err(|_| RasterError::open_failed("dataset registry poisoned"))?;
        datasets
            .get(path)
            .cloned()
            .map(|ds| Box::new(ds) as Box<dyn RasterDataset>)
            .ok_or_else(|| RasterError::open_failed(format!("no dataset at {}", path.display())))
    }
}

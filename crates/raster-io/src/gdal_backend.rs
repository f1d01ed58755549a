//! GDAL-backed datasets.

use std::path::Path;
use std::sync::Mutex;

use gdal::raster::{ColorInterpretation, GdalDataType};
use gdal::Dataset;
use gis_common::{GeoTransform, RasterGeometry};
use tracing::debug;

use crate::band::BandData;
use crate::dataset::{check_band_index, RasterDataset, RasterProvider};
use crate::error::{RasterError, Result};
use crate::types::{BandInfo, ColorRole, SampleType};

/// Opens any format the linked GDAL build supports.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalProvider;

impl GdalProvider {
    pub fn new() -> Self {
        Self
    }
}

impl RasterProvider for GdalProvider {
    fn name(&self) -> &str {
        "gdal"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>> {
        Ok(Box::new(GdalDataset::open(path)?))
    }
}

/// An open GDAL dataset.
///
/// GDAL handles are not shareable between threads, so access is serialised.
pub struct GdalDataset {
    description: String,
    width: usize,
    height: usize,
    geo_transform: Option<GeoTransform>,
    crs_wkt: String,
    band_count: usize,
    inner: Mutex<Dataset>,
}

impl GdalDataset {
    pub fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)
            .map_err(|e| RasterError::open_failed(format!("{}: {}", path.display(), e)))?;

        let (width, height) = dataset.raster_size();
        let geo_transform = dataset.geo_transform().ok().map(GeoTransform);
        let crs_wkt = dataset.projection();
        let band_count = dataset.raster_count().max(0) as usize;

        debug!(path = %path.display(), width, height, band_count, "Opened GDAL dataset");

        Ok(Self {
            description: path.display().to_string(),
            width,
            height,
            geo_transform,
            crs_wkt,
            band_count,
            inner: Mutex::new(dataset),
        })
    }

    fn with_dataset<T>(&self, f: impl FnOnce(&Dataset) -> Result<T>) -> Result<T> {
        let dataset = self
            .inner
            .lock()
            .map_err(|_| RasterError::read_failed("GDAL dataset lock poisoned"))?;
        f(&dataset)
    }
}

impl RasterGeometry for GdalDataset {
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

impl RasterDataset for GdalDataset {
    fn description(&self) -> &str {
        &self.description
    }

    fn crs_wkt(&self) -> String {
        self.crs_wkt.clone()
    }

    fn band_count(&self) -> usize {
        self.band_count
    }

    fn band(&self, index: usize) -> Result<BandInfo> {
        check_band_index(index, self.band_count)?;
        self.with_dataset(|ds| {
            let band = ds
                .rasterband(index as isize)
                .map_err(|e| RasterError::read_failed(e.to_string()))?;
            Ok(BandInfo {
                sample_type: sample_type_of(band.band_type())?,
                no_data: band.no_data_value(),
                color_role: color_role_of(band.color_interpretation()),
            })
        })
    }

    fn read_band(&self, index: usize) -> Result<BandData> {
        check_band_index(index, self.band_count)?;
        self.with_dataset(|ds| {
            let band = ds
                .rasterband(index as isize)
                .map_err(|e| RasterError::read_failed(e.to_string()))?;
            let read_err = |e: gdal::errors::GdalError| RasterError::read_failed(e.to_string());

            Ok(match sample_type_of(band.band_type())? {
                SampleType::UInt8 => band.read_band_as::<u8>().map_err(read_err)?.data.into(),
                SampleType::UInt16 => band.read_band_as::<u16>().map_err(read_err)?.data.into(),
                SampleType::Int16 => band.read_band_as::<i16>().map_err(read_err)?.data.into(),
                SampleType::UInt32 => band.read_band_as::<u32>().map_err(read_err)?.data.into(),
                SampleType::Int32 => band.read_band_as::<i32>().map_err(read_err)?.data.into(),
                SampleType::Float32 => band.read_band_as::<f32>().map_err(read_err)?.data.into(),
                SampleType::Float64 => band.read_band_as::<f64>().map_err(read_err)?.data.into(),
            })
        })
    }
}

fn sample_type_of(ty: GdalDataType) -> Result<SampleType> {
    match ty {
        GdalDataType::UInt8 => Ok(SampleType::UInt8),
        GdalDataType::UInt16 => Ok(SampleType::UInt16),
        GdalDataType::Int16 => Ok(SampleType::Int16),
        GdalDataType::UInt32 => Ok(SampleType::UInt32),
        GdalDataType::Int32 => Ok(SampleType::Int32),
        GdalDataType::Float32 => Ok(SampleType::Float32),
        GdalDataType::Float64 => Ok(SampleType::Float64),
        other => Err(RasterError::Unsupported(format!("band type {:?}", other))),
    }
}

fn color_role_of(ci: ColorInterpretation) -> ColorRole {
    match ci {
        ColorInterpretation::GrayIndex => ColorRole::Gray,
        ColorInterpretation::PaletteIndex => ColorRole::Palette,
        ColorInterpretation::RedBand => ColorRole::Red,
        ColorInterpretation::GreenBand => ColorRole::Green,
        ColorInterpretation::BlueBand => ColorRole::Blue,
        ColorInterpretation::AlphaBand => ColorRole::Alpha,
        _ => ColorRole::Undefined,
    }
}

//! Local dataset source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use gis_common::{
    CornerType, DataSource, DatasetRole, GisConfig, GisData, GisError, GisResult, PixelFormat,
    RasterCorners,
};
use projection::projected_corners_of;
use raster_io::{
    read_dataset, RasterData, RasterDataset, RasterError, RasterProvider, SampleType,
    TranslateOptions,
};
use tracing::{debug, info, instrument};

use crate::compat::{
    check_color_bands, check_raster_size, check_same_crs, check_same_extent,
    log_dataset_warnings,
};

/// The provider used when none is given explicitly.
pub fn default_provider() -> Arc<dyn RasterProvider> {
    #[cfg(feature = "gdal")]
    {
        Arc::new(raster_io::GdalProvider::new())
    }
    #[cfg(not(feature = "gdal"))]
    {
        Arc::new(raster_io::WorldFileProvider::new())
    }
}

/// Reads a heightmap and a colour raster covering the same area.
#[derive(Clone)]
pub struct LocalDatasetSource {
    heightmap_path: PathBuf,
    color_path: PathBuf,
    config: GisConfig,
    provider: Arc<dyn RasterProvider>,
}

impl LocalDatasetSource {
    pub fn new(
        heightmap_path: impl Into<PathBuf>,
        color_path: impl Into<PathBuf>,
        config: GisConfig,
        provider: Arc<dyn RasterProvider>,
    ) -> Self {
        Self {
            heightmap_path: heightmap_path.into(),
            color_path: color_path.into(),
            config,
            provider,
        }
    }

    pub fn heightmap_path(&self) -> &Path {
        &self.heightmap_path
    }

    pub fn color_path(&self) -> &Path {
        &self.color_path
    }

    /// Open, check and read both datasets on the current thread.
    ///
    /// Every step fails with its own error; the first violated one wins.
    #[instrument(
        skip(self),
        fields(
            provider = self.provider.name(),
            heightmap = %self.heightmap_path.display(),
            color = %self.color_path.display()
        )
    )]
    pub fn retrieve_blocking(&self) -> GisResult<GisData> {
        let heightmap = self.open(DatasetRole::Heightmap, &self.heightmap_path)?;
        let color = self.open(DatasetRole::Color, &self.color_path)?;

        let heightmap_wkt = projection_wkt(heightmap.as_ref(), DatasetRole::Heightmap)?;
        let color_wkt = projection_wkt(color.as_ref(), DatasetRole::Color)?;

        let heightmap_corners = corners(heightmap.as_ref(), DatasetRole::Heightmap)?;
        let color_corners = corners(color.as_ref(), DatasetRole::Color)?;

        check_same_crs(&heightmap_wkt, &color_wkt)?;
        check_same_extent(&heightmap_corners, &color_corners)?;
        check_color_bands(color.as_ref())?;
        check_raster_size(&self.config, heightmap.as_ref(), DatasetRole::Heightmap)?;
        check_raster_size(&self.config, color.as_ref(), DatasetRole::Color)?;

        log_dataset_warnings(heightmap.as_ref(), color.as_ref());

        let heightmap = self.as_float32(heightmap)?;
        let (height_buffer, height_width, height_height) = read_heights(heightmap.as_ref())?;
        let (color_buffer, color_width, color_height) = read_colors(color.as_ref())?;

        info!(
            height_width,
            height_height, color_width, color_height, "Local datasets loaded"
        );

        Ok(GisData {
            height_buffer,
            height_width,
            height_height,
            color_buffer,
            color_width,
            color_height,
            pixel_format: PixelFormat::Rgba8,
            projection_wkt: heightmap_wkt,
            corner_type: CornerType::Projected,
            upper_left: heightmap_corners.upper_left,
            lower_right: heightmap_corners.lower_right,
        })
    }

    fn open(&self, role: DatasetRole, path: &Path) -> GisResult<Box<dyn RasterDataset>> {
        self.provider.open(path).map_err(|e| {
            debug!(%role, path = %path.display(), error = %e, "Dataset open failed");
            GisError::SourceOpen { role }
        })
    }

    /// Convert the heightmap to 32-bit floats unless it already is.
    fn as_float32(&self, heightmap: Box<dyn RasterDataset>) -> GisResult<Box<dyn RasterDataset>> {
        let info = heightmap
            .band(1)
            .map_err(|e| read_error(DatasetRole::Heightmap, e))?;
        if info.sample_type == SampleType::Float32 {
            return Ok(heightmap);
        }

        debug!(from = %info.sample_type, "Translating heightmap to Float32");
        self.provider
            .translate(
                heightmap.as_ref(),
                &TranslateOptions::output_type(SampleType::Float32),
            )
            .map_err(|e| {
                GisError::Conversion(format!(
                    "Failed to convert the heightmap from {} to Float32: {}",
                    info.sample_type, e
                ))
            })
    }
}

#[async_trait]
impl DataSource for LocalDatasetSource {
    async fn retrieve(&self) -> GisResult<GisData> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.retrieve_blocking())
            .await
            .map_err(|e| GisError::Internal(format!("dataset task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "local-dataset"
    }
}

fn projection_wkt(dataset: &dyn RasterDataset, role: DatasetRole) -> GisResult<String> {
    let wkt = dataset.crs_wkt();
    if wkt.is_empty() {
        return Err(GisError::missing_metadata(role, "projected coordinate system"));
    }
    Ok(wkt)
}

fn corners(dataset: &dyn RasterDataset, role: DatasetRole) -> GisResult<RasterCorners> {
    projected_corners_of(dataset).ok_or_else(|| GisError::missing_metadata(role, "corner coordinates"))
}

fn read_error(role: DatasetRole, err: RasterError) -> GisError {
    GisError::RasterRead {
        role,
        message: err.to_string(),
    }
}

fn dimensions(dataset: &dyn RasterDataset) -> GisResult<(u32, u32)> {
    let width = u32::try_from(dataset.width());
    let height = u32::try_from(dataset.height());
    match (width, height) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(GisError::Internal(format!(
            "raster size {}x{} does not fit 32 bits",
            dataset.width(),
            dataset.height()
        ))),
    }
}

fn read_heights(heightmap: &dyn RasterDataset) -> GisResult<(Vec<f32>, u32, u32)> {
    let (width, height) = dimensions(heightmap)?;
    let mut heights = RasterData::filled(heightmap.width(), heightmap.height(), 1, 0.0f32);
    read_dataset(heightmap, &mut heights, &[1])
        .map_err(|e| read_error(DatasetRole::Heightmap, e))?;
    Ok((heights.into_inner(), width, height))
}

/// Bands 1..=3 into R, G, B; alpha stays opaque.
fn read_colors(color: &dyn RasterDataset) -> GisResult<(Vec<u8>, u32, u32)> {
    let (width, height) = dimensions(color)?;
    let mut rgba = RasterData::filled(color.width(), color.height(), 4, 255u8);
    read_dataset(color, &mut rgba, &[1, 2, 3]).map_err(|e| read_error(DatasetRole::Color, e))?;
    Ok((rgba.into_inner(), width, height))
}

//! Plain images georeferenced by a world file and a `.prj` sidecar.
//!
//! The world file holds six values, one per line: pixel width (A), row
//! rotation (D), column rotation (B), pixel height (E) and the centre of the
//! upper-left pixel (C, F).

use std::fs;
use std::path::{Path, PathBuf};

use gis_common::{GeoTransform, RasterGeometry};
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::band::BandData;
use crate::dataset::{check_band_index, RasterDataset, RasterProvider};
use crate::error::{RasterError, Result};
use crate::types::{BandInfo, ColorRole};

/// Opens PNG/JPEG/BMP/TIFF images with world-file georeferencing.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldFileProvider;

impl WorldFileProvider {
    pub fn new() -> Self {
        Self
    }
}

impl RasterProvider for WorldFileProvider {
    fn name(&self) -> &str {
        "world-file"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn RasterDataset>> {
        Ok(Box::new(WorldFileDataset::open(path)?))
    }
}

/// A decoded image plus its georeferencing.
#[derive(Debug, Clone)]
pub struct WorldFileDataset {
    description: String,
    width: usize,
    height: usize,
    geo_transform: Option<GeoTransform>,
    crs_wkt: String,
    bands: Vec<(BandInfo, BandData)>,
}

impl WorldFileDataset {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| {
            RasterError::open_failed(format!("{}: {}", path.display(), e))
        })?;
        let width = image.width() as usize;
        let height = image.height() as usize;
        let bands = split_bands(image)?;

        let geo_transform = match find_world_file(path) {
            Some(world) => Some(parse_world_file(&fs::read_to_string(&world)?)?),
            None => None,
        };

        let prj = path.with_extension("prj");
        let crs_wkt = if prj.exists() {
            fs::read_to_string(&prj)?.trim().to_string()
        } else {
            String::new()
        };

        debug!(
            path = %path.display(),
            width,
            height,
            bands = bands.len(),
            georeferenced = geo_transform.is_some(),
            "Opened world-file raster"
        );

        Ok(Self {
            description: path.display().to_string(),
            width,
            height,
            geo_transform,
            crs_wkt,
            bands,
        })
    }
}

impl RasterGeometry for WorldFileDataset {
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

impl RasterDataset for WorldFileDataset {
    fn description(&self) -> &str {
        &self.description
    }

    fn crs_wkt(&self) -> String {
        self.crs_wkt.clone()
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band(&self, index: usize) -> Result<BandInfo> {
        check_band_index(index, self.bands.len())?;
        Ok(self.bands[index - 1].0)
    }

    fn read_band(&self, index: usize) -> Result<BandData> {
        check_band_index(index, self.bands.len())?;
        Ok(self.bands[index - 1].1.clone())
    }
}

/// Sidecar candidates: `.wld`, the short form (`.pgw`, `.jgw`, `.tfw`) and
/// the long form (`.pngw`).
fn find_world_file(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mut candidates = vec![path.with_extension("wld")];

    let mut chars = ext.chars();
    if let (Some(first), Some(last)) = (chars.next(), ext.chars().last()) {
        candidates.push(path.with_extension(format!("{}{}w", first, last)));
    }
    candidates.push(path.with_extension(format!("{}w", ext)));

    candidates.into_iter().find(|p| p.exists())
}

/// Parse world-file text into a pixel-corner geotransform.
pub fn parse_world_file(text: &str) -> Result<GeoTransform> {
    let values: Vec<f64> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .map_err(|_| RasterError::invalid_metadata(format!("bad world file value '{}'", line)))
        })
        .collect::<Result<_>>()?;

    let [a, d, b, e, c, f]: [f64; 6] = values.as_slice().try_into().map_err(|_| {
        RasterError::invalid_metadata(format!("world file has {} values, expected 6", values.len()))
    })?;

    Ok(GeoTransform([
        c - a / 2.0 - b / 2.0,
        a,
        b,
        f - d / 2.0 - e / 2.0,
        d,
        e,
    ]))
}

fn roles_for(channels: usize) -> &'static [ColorRole] {
    match channels {
        1 => &[ColorRole::Gray],
        2 => &[ColorRole::Gray, ColorRole::Alpha],
        3 => &[ColorRole::Red, ColorRole::Green, ColorRole::Blue],
        _ => &[ColorRole::Red, ColorRole::Green, ColorRole::Blue, ColorRole::Alpha],
    }
}

fn deinterleave<T: Copy>(samples: &[T], channels: usize) -> Vec<Vec<T>> {
    (0..channels)
        .map(|c| samples.iter().skip(c).step_by(channels).copied().collect())
        .collect()
}

fn split_bands(image: DynamicImage) -> Result<Vec<(BandInfo, BandData)>> {
    let channels = image.color().channel_count() as usize;

    let planes: Vec<BandData> = match image {
        DynamicImage::ImageLuma8(buf) => wrap(deinterleave(buf.as_raw(), 1)),
        DynamicImage::ImageLumaA8(buf) => wrap(deinterleave(buf.as_raw(), 2)),
        DynamicImage::ImageRgb8(buf) => wrap(deinterleave(buf.as_raw(), 3)),
        DynamicImage::ImageRgba8(buf) => wrap(deinterleave(buf.as_raw(), 4)),
        DynamicImage::ImageLuma16(buf) => wrap(deinterleave(buf.as_raw(), 1)),
        DynamicImage::ImageLumaA16(buf) => wrap(deinterleave(buf.as_raw(), 2)),
        DynamicImage::ImageRgb16(buf) => wrap(deinterleave(buf.as_raw(), 3)),
        DynamicImage::ImageRgba16(buf) => wrap(deinterleave(buf.as_raw(), 4)),
        DynamicImage::ImageRgb32F(buf) => wrap(deinterleave(buf.as_raw(), 3)),
        DynamicImage::ImageRgba32F(buf) => wrap(deinterleave(buf.as_raw(), 4)),
        other => {
            return Err(RasterError::Unsupported(format!(
                "image colour type {:?}",
                other.color()
            )))
        }
    };

    Ok(planes
        .into_iter()
        .zip(roles_for(channels).iter())
        .map(|(data, &role)| (BandInfo::new(data.sample_type(), role), data))
        .collect())
}

fn wrap<T>(planes: Vec<Vec<T>>) -> Vec<BandData>
where
    Vec<T>: Into<BandData>,
{
    planes.into_iter().map(Into::into).collect()
}

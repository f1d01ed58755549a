//! Band selection, rescaling and type conversion.
//!
//! Accepts the familiar `gdal_translate` argument subset:
//! `-ot <type>`, `-scale [src_min src_max [dst_min dst_max]]` and
//! repeated `-b <band>`.

use tracing::debug;

use crate::band::BandData;
use crate::dataset::{check_band_index, RasterDataset};
use crate::error::{RasterError, Result};
use crate::mem::MemDataset;
use crate::types::SampleType;

/// Linear rescale `src_min..src_max` onto `dst_min..dst_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParams {
    /// Source range; `None` means computed from the band.
    pub src: Option<(f64, f64)>,
    pub dst: (f64, f64),
}

impl ScaleParams {
    fn apply(&self, value: f64, src: (f64, f64)) -> f64 {
        let (src_min, src_max) = src;
        let (dst_min, dst_max) = self.dst;
        if src_max == src_min {
            return dst_min;
        }
        (value - src_min) * (dst_max - dst_min) / (src_max - src_min) + dst_min
    }
}

/// Options for [`translate_dataset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateOptions {
    pub output_type: Option<SampleType>,
    pub scale: Option<ScaleParams>,
    /// Source bands in output order; all bands when empty.
    pub bands: Vec<usize>,
}

impl TranslateOptions {
    /// Parse an argument list such as `["-ot", "Float32"]`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter().map(|s| AsRef::<str>::as_ref(s)).peekable();

        while let Some(arg) = iter.next() {
            match arg {
                "-ot" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| RasterError::invalid_options("-ot requires a type"))?;
                    options.output_type = Some(value.parse()?);
                }
                "-b" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| RasterError::invalid_options("-b requires a band"))?;
                    let band = value.parse::<usize>().map_err(|_| {
                        RasterError::invalid_options(format!("invalid band '{}'", value))
                    })?;
                    options.bands.push(band);
                }
                "-scale" => {
                    let mut values = Vec::new();
                    while values.len() < 4 {
                        match iter.peek().and_then(|v| v.parse::<f64>().ok()) {
                            Some(v) => {
                                values.push(v);
                                iter.next();
                            }
                            None => break,
                        }
                    }

                    options.scale = Some(match values.as_slice() {
                        [] => ScaleParams {
                            src: None,
                            dst: (0.0, 255.0),
                        },
                        [src_min, src_max] => ScaleParams {
                            src: Some((*src_min, *src_max)),
                            dst: (0.0, 255.0),
                        },
                        [src_min, src_max, dst_min, dst_max] => ScaleParams {
                            src: Some((*src_min, *src_max)),
                            dst: (*dst_min, *dst_max),
                        },
                        _ => {
                            return Err(RasterError::invalid_options(
                                "-scale takes 0, 2 or 4 values",
                            ))
                        }
                    });
                }
                other => {
                    return Err(RasterError::invalid_options(format!(
                        "unsupported option '{}'",
                        other
                    )))
                }
            }
        }

        Ok(options)
    }

    /// Convert to `ty` without rescaling.
    pub fn output_type(ty: SampleType) -> Self {
        Self {
            output_type: Some(ty),
            ..Self::default()
        }
    }
}

/// Produce an in-memory copy of `dataset` with `options` applied.
///
/// Georeferencing and CRS are carried over unchanged. Values outside the
/// output type's range saturate.
pub fn translate_dataset(
    dataset: &dyn RasterDataset,
    options: &TranslateOptions,
) -> Result<MemDataset> {
    let bands: Vec<usize> = if options.bands.is_empty() {
        (1..=dataset.band_count()).collect()
    } else {
        options.bands.clone()
    };

    if bands.is_empty() {
        return Err(RasterError::TranslateFailed(format!(
            "{} has no bands",
            dataset.description()
        )));
    }

    let mut out = MemDataset::new(dataset.width(), dataset.height()).with_crs_wkt(dataset.crs_wkt());
    if let Some(gt) = dataset.geo_transform() {
        out = out.with_geo_transform(gt);
    }

    for &band in &bands {
        check_band_index(band, dataset.band_count())?;
        let info = dataset.band(band)?;
        let data = dataset.read_band(band)?;
        let target = options.output_type.unwrap_or(info.sample_type);

        let converted = match options.scale {
            Some(scale) => {
                let src = match scale.src {
                    Some(src) => src,
                    None => data.min_max(info.no_data).unwrap_or((0.0, 0.0)),
                };
                data.map_to(target, |v| scale.apply(v, src))
            }
            None if target == info.sample_type => data,
            None => data.map_to(target, |v| v),
        };

        out.push_band(converted, info.color_role, info.no_data)
            .map_err(|e| RasterError::TranslateFailed(e.to_string()))?;
    }

    debug!(
        source = dataset.description(),
        bands = bands.len(),
        output_type = ?options.output_type,
        scaled = options.scale.is_some(),
        "Translated dataset"
    );

    Ok(out)
}

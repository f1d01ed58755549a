//! Typed band sample storage and conversion.

use rayon::prelude::*;

use crate::types::SampleType;

/// Bands at least this large are converted on the rayon pool.
const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// A primitive sample type that band data can be read as.
///
/// Conversion from `f64` rounds and saturates for integer types.
pub trait Sample: Copy + Send + Sync + 'static {
    const TYPE: SampleType;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! impl_int_sample {
    ($t:ty, $variant:ident) => {
        impl Sample for $t {
            const TYPE: SampleType = SampleType::$variant;

            fn from_f64(value: f64) -> Self {
                // `as` saturates and maps NaN to 0
                value.round() as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

macro_rules! impl_float_sample {
    ($t:ty, $variant:ident) => {
        impl Sample for $t {
            const TYPE: SampleType = SampleType::$variant;

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_int_sample!(u8, UInt8);
impl_int_sample!(u16, UInt16);
impl_int_sample!(i16, Int16);
impl_int_sample!(u32, UInt32);
impl_int_sample!(i32, Int32);
impl_float_sample!(f32, Float32);
impl_float_sample!(f64, Float64);

/// Samples of one band in their native storage type, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum BandData {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            BandData::UInt8($v) => $body,
            BandData::UInt16($v) => $body,
            BandData::Int16($v) => $body,
            BandData::UInt32($v) => $body,
            BandData::Int32($v) => $body,
            BandData::Float32($v) => $body,
            BandData::Float64($v) => $body,
        }
    };
}

impl BandData {
    pub fn sample_type(&self) -> SampleType {
        match self {
            BandData::UInt8(_) => SampleType::UInt8,
            BandData::UInt16(_) => SampleType::UInt16,
            BandData::Int16(_) => SampleType::Int16,
            BandData::UInt32(_) => SampleType::UInt32,
            BandData::Int32(_) => SampleType::Int32,
            BandData::Float32(_) => SampleType::Float32,
            BandData::Float64(_) => SampleType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        dispatch!(self, v => v.get(index).map(|s| s.to_f64()))
    }

    /// Convert every sample to `T`.
    pub fn to_vec<T: Sample>(&self) -> Vec<T> {
        dispatch!(self, v => convert_slice(v, |s| T::from_f64(s.to_f64())))
    }

    /// Map every sample through `f` into a band of `target` type.
    pub fn map_to(&self, target: SampleType, f: impl Fn(f64) -> f64 + Sync) -> BandData {
        fn build<T: Sample>(src: &BandData, f: &(impl Fn(f64) -> f64 + Sync)) -> Vec<T> {
            dispatch!(src, v => convert_slice(v, |s| T::from_f64(f(s.to_f64()))))
        }

        match target {
            SampleType::UInt8 => BandData::UInt8(build(self, &f)),
            SampleType::UInt16 => BandData::UInt16(build(self, &f)),
            SampleType::Int16 => BandData::Int16(build(self, &f)),
            SampleType::UInt32 => BandData::UInt32(build(self, &f)),
            SampleType::Int32 => BandData::Int32(build(self, &f)),
            SampleType::Float32 => BandData::Float32(build(self, &f)),
            SampleType::Float64 => BandData::Float64(build(self, &f)),
        }
    }

    /// Minimum and maximum finite sample values, skipping `no_data`.
    pub fn min_max(&self, no_data: Option<f64>) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for i in 0..self.len() {
            let Some(v) = self.get_f64(i) else { continue };
            if !v.is_finite() || no_data == Some(v) {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        range
    }
}

fn convert_slice<S, T, F>(src: &[S], f: F) -> Vec<T>
where
    S: Sample,
    T: Sample,
    F: Fn(S) -> T + Sync,
{
    if src.len() >= PARALLEL_THRESHOLD {
        src.par_iter().map(|&s| f(s)).collect()
    } else {
        src.iter().map(|&s| f(s)).collect()
    }
}

macro_rules! impl_from_vec {
    ($t:ty, $variant:ident) => {
        impl From<Vec<$t>> for BandData {
            fn from(v: Vec<$t>) -> Self {
                BandData::$variant(v)
            }
        }
    };
}

impl_from_vec!(u8, UInt8);
impl_from_vec!(u16, UInt16);
impl_from_vec!(i16, Int16);
impl_from_vec!(u32, UInt32);
impl_from_vec!(i32, Int32);
impl_from_vec!(f32, Float32);
impl_from_vec!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversion_saturates() {
        let band = BandData::Float32(vec![-5.0, 0.4, 0.6, 300.0, f32::NAN]);
        assert_eq!(band.to_vec::<u8>(), vec![0, 0, 1, 255, 0]);
    }

    #[test]
    fn test_widening() {
        let band = BandData::UInt16(vec![0, 1000, 65535]);
        assert_eq!(band.to_vec::<f32>(), vec![0.0, 1000.0, 65535.0]);
        assert_eq!(band.sample_type(), SampleType::UInt16);
        assert_eq!(band.len(), 3);
    }

    #[test]
    fn test_map_to() {
        let band = BandData::UInt8(vec![0, 128, 255]);
        let mapped = band.map_to(SampleType::Float64, |v| v / 255.0);
        match mapped {
            BandData::Float64(v) => {
                assert_eq!(v[0], 0.0);
                assert_eq!(v[2], 1.0);
            }
            other => panic!("unexpected {:?}", other.sample_type()),
        }
    }

    #[test]
    fn test_min_max_skips_no_data() {
        let band = BandData::Float32(vec![-9999.0, 12.0, 3.5, f32::NAN, 40.0]);
        assert_eq!(band.min_max(Some(-9999.0)), Some((3.5, 40.0)));
        assert_eq!(BandData::Float32(vec![]).min_max(None), None);
    }

    #[test]
    fn test_parallel_path_matches_serial() {
        let src: Vec<u16> = (0..PARALLEL_THRESHOLD as u32 + 10).map(|v| (v % 65536) as u16).collect();
        let band = BandData::UInt16(src.clone());
        let out = band.to_vec::<f32>();
        assert_eq!(out.len(), src.len());
        assert_eq!(out[PARALLEL_THRESHOLD + 5], src[PARALLEL_THRESHOLD + 5] as f32);
    }
}

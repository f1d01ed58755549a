//! Band descriptors.

use std::fmt;
use std::str::FromStr;

use crate::error::RasterError;

/// Storage type of one band's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl SampleType {
    /// Name as accepted by `-ot`.
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::UInt8 => "Byte",
            SampleType::UInt16 => "UInt16",
            SampleType::Int16 => "Int16",
            SampleType::UInt32 => "UInt32",
            SampleType::Int32 => "Int32",
            SampleType::Float32 => "Float32",
            SampleType::Float64 => "Float64",
        }
    }

    /// Size of one sample in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            SampleType::UInt8 => 1,
            SampleType::UInt16 | SampleType::Int16 => 2,
            SampleType::UInt32 | SampleType::Int32 | SampleType::Float32 => 4,
            SampleType::Float64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::Float32 | SampleType::Float64)
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleType {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "byte" | "uint8" => Ok(SampleType::UInt8),
            "uint16" => Ok(SampleType::UInt16),
            "int16" => Ok(SampleType::Int16),
            "uint32" => Ok(SampleType::UInt32),
            "int32" => Ok(SampleType::Int32),
            "float32" => Ok(SampleType::Float32),
            "float64" => Ok(SampleType::Float64),
            _ => Err(RasterError::invalid_options(format!("unknown output type '{}'", s))),
        }
    }
}

/// Colour interpretation of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorRole {
    #[default]
    Undefined,
    Gray,
    Palette,
    Red,
    Green,
    Blue,
    Alpha,
}

/// Metadata of one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    pub sample_type: SampleType,
    pub no_data: Option<f64>,
    pub color_role: ColorRole,
}

impl BandInfo {
    pub fn new(sample_type: SampleType, color_role: ColorRole) -> Self {
        Self {
            sample_type,
            no_data: None,
            color_role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_type() {
        assert_eq!("Float32".parse::<SampleType>().unwrap(), SampleType::Float32);
        assert_eq!("Byte".parse::<SampleType>().unwrap(), SampleType::UInt8);
        assert_eq!("uint16".parse::<SampleType>().unwrap(), SampleType::UInt16);
        assert!("CFloat32".parse::<SampleType>().is_err());
    }

    #[test]
    fn test_sample_sizes() {
        assert_eq!(SampleType::UInt8.size_bytes(), 1);
        assert_eq!(SampleType::Float64.size_bytes(), 8);
        assert!(SampleType::Float32.is_float());
        assert!(!SampleType::Int16.is_float());
    }
}

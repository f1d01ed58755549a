//! Common types and utilities shared by the terrain GIS data sources.

pub mod bbox;
pub mod config;
pub mod crs;
pub mod data;
pub mod error;
pub mod geo;
pub mod source;
pub mod tile;

pub use bbox::{BboxParseError, LatLonBox};
pub use config::GisConfig;
pub use crs::{AxisOrder, CrsCode, CrsParseError};
pub use data::{Coord, CornerType, DatasetRole, GisData, PixelFormat};
pub use error::{ErrorKind, GisError, GisResult};
pub use geo::{GeoTransform, RasterCorners, RasterGeometry};
pub use source::DataSource;
pub use tile::{TileCoord, TileRange};

//! Raster dataset access for terrain ingest.
//!
//! Datasets are opened through a [`RasterProvider`]:
//!
//! - [`MemProvider`] serves in-memory [`MemDataset`]s
//! - [`WorldFileProvider`] reads images with world-file georeferencing
//! - `GdalProvider` (feature `gdal`) reads anything GDAL can open
//!
//! Every provider can [`translate`](RasterProvider::translate) a dataset
//! into a new in-memory one (type conversion, rescaling, band selection).

pub mod band;
pub mod dataset;
pub mod error;
#[cfg(feature = "gdal")]
pub mod gdal_backend;
pub mod mem;
pub mod translate;
pub mod types;
pub mod world_file;

pub use band::{BandData, Sample};
pub use dataset::{read_dataset, RasterData, RasterDataset, RasterProvider};
pub use error::{RasterError, Result};
#[cfg(feature = "gdal")]
pub use gdal_backend::{GdalDataset, GdalProvider};
pub use mem::{MemDataset, MemProvider};
pub use translate::{translate_dataset, ScaleParams, TranslateOptions};
pub use types::{BandInfo, ColorRole, SampleType};
pub use world_file::{parse_world_file, WorldFileDataset, WorldFileProvider};

//! Terrain data from a local heightmap and colour raster pair.
//!
//! Both datasets must share the same coordinate system and extent. The
//! heightmap is converted to 32-bit floats when needed and the colour
//! raster is read into an RGBA buffer with opaque alpha.

pub mod compat;
pub mod source;

pub use compat::{
    check_color_bands, check_raster_size, check_same_crs, check_same_extent,
    log_dataset_warnings, REQUIRED_COLOR_BANDS,
};
pub use source::{default_provider, LocalDatasetSource};

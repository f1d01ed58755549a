//! Engine-independent terrain preparation.
//!
//! Takes the [`gis_common::GisData`] produced by any data source and
//! derives what a landscape importer needs: a 16-bit heightmap spanning the
//! full sample range, a BGRA colour texture, projected corners, a
//! pixel/WGS84 frame and the landscape scale.

pub mod color;
pub mod frame;
pub mod heights;
pub mod prepare;
pub mod scale;

pub use color::{color_to_bgra, RGBA_TO_BGRA};
pub use frame::{projected_corners, TerrainFrame};
pub use heights::{rescale_heights, RescaledHeights};
pub use prepare::{check_limits, prepare_terrain, TerrainInput, TerrainMetadata};
pub use scale::{landscape_scale, HEIGHT_RANGE_CM};

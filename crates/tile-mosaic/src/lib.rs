//! Terrain data from web map tiles.
//!
//! A [`TileMosaicSource`] turns a lat/lon box and zoom level into a square
//! grid of XYZ tiles, fetches a colour and a Terrain-RGB tile for each
//! cell concurrently, and stitches them into one [`gis_common::GisData`].
//!
//! # Architecture
//!
//! ```text
//! MosaicRequest
//!      │
//!      ▼
//! MosaicPlan::build ──► validate, cover, pad to square, size guard
//!      │
//!      ▼
//! TileMosaicSource::start
//!      │
//!      ├─► tokio::spawn per (layer, tile)
//!      │        │
//!      │        ├─► TileFetcher::fetch
//!      │        ├─► decode_tile (blocking pool)
//!      │        └─► MosaicAssembly::complete
//!      │
//!      ▼
//! PendingMosaic::wait ──► exactly one GisResult<GisData>
//! ```

pub mod assembly;
pub mod decode;
pub mod endpoints;
pub mod fetch;
pub mod plan;
pub mod request;
pub mod source;

pub use assembly::{CropWindow, MosaicAssembly, MosaicProgress};
pub use decode::{decode_terrain_rgb, decode_tile, TilePixels};
pub use endpoints::{MosaicEndpoints, TileLayer, Tileset};
pub use fetch::{FetchError, HttpFetchConfig, HttpTileFetcher, TileFetcher};
pub use plan::{MosaicPlan, TileRequest};
pub use request::MosaicRequest;
pub use source::{PendingMosaic, TileMosaicSource};

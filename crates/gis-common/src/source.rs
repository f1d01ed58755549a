//! The seam every data source implements.

use async_trait::async_trait;

use crate::data::GisData;
use crate::error::GisResult;

/// Something that can produce a heightmap and colour raster pair.
///
/// Implementations resolve exactly once per call: either with a populated
/// [`GisData`] or with the first error encountered.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Retrieve the data.
    async fn retrieve(&self) -> GisResult<GisData>;

    /// Short name used in log records.
    fn name(&self) -> &str;
}

//! Web tile data source.

use std::sync::Arc;

use async_trait::async_trait;
use gis_common::{DataSource, GisConfig, GisData, GisError, GisResult};
use tracing::{debug, info, instrument};

use crate::assembly::{MosaicAssembly, MosaicProgress, MosaicReceiver};
use crate::decode::decode_tile;
use crate::endpoints::{redact_token, MosaicEndpoints};
use crate::fetch::TileFetcher;
use crate::plan::{MosaicPlan, TileRequest};
use crate::request::MosaicRequest;

/// Builds [`GisData`] from colour and Terrain-RGB web map tiles.
pub struct TileMosaicSource {
    request: MosaicRequest,
    config: GisConfig,
    endpoints: MosaicEndpoints,
    fetcher: Arc<dyn TileFetcher>,
}

impl TileMosaicSource {
    pub fn new(
        request: MosaicRequest,
        config: GisConfig,
        endpoints: MosaicEndpoints,
        fetcher: Arc<dyn TileFetcher>,
    ) -> Self {
        Self {
            request,
            config,
            endpoints,
            fetcher,
        }
    }

    pub fn request(&self) -> &MosaicRequest {
        &self.request
    }

    /// Validate the request and lay out the tile grid without any I/O.
    pub fn plan(&self) -> GisResult<MosaicPlan> {
        MosaicPlan::build(&self.request, &self.config, &self.endpoints)
    }

    /// Spawn every tile fetch and return a handle to the single outcome.
    ///
    /// Must be called inside a Tokio runtime. Returns without waiting for
    /// any fetch to finish.
    #[instrument(skip(self), fields(zoom = self.request.zoom))]
    pub fn start(&self) -> GisResult<PendingMosaic> {
        let plan = self.plan()?;
        let wkt = projection::wkt_for_epsg(3857)?;
        let (assembly, receiver) =
            MosaicAssembly::new(&plan, wkt, self.request.ignore_missing_tiles);

        info!(
            tiles_x = plan.tiles_x,
            tiles_y = plan.tiles_y,
            zoom = plan.range.zoom,
            width = plan.width,
            height = plan.height,
            fetches = plan.total_fetches(),
            "Starting tile mosaic"
        );

        for tile_request in plan.requests.iter().cloned() {
            tokio::spawn(run_fetch(
                tile_request,
                plan.tile_width,
                plan.tile_height,
                Arc::clone(&self.fetcher),
                Arc::clone(&assembly),
            ));
        }

        Ok(PendingMosaic { receiver, assembly })
    }
}

async fn run_fetch(
    request: TileRequest,
    tile_width: u32,
    tile_height: u32,
    fetcher: Arc<dyn TileFetcher>,
    assembly: Arc<MosaicAssembly>,
) {
    let TileRequest { layer, tile, url } = request;

    if assembly.is_delivered() {
        debug!(%layer, tile = %tile.path(), "Skipping fetch, mosaic already resolved");
        return;
    }

    debug!(%layer, tile = %tile.path(), url = %redact_token(&url), "Fetching tile");
    let outcome = match fetcher.fetch(&url).await {
        Ok(bytes) => tokio::task::spawn_blocking(move || {
            decode_tile(layer, &bytes, tile_width, tile_height)
        })
        .await
        .unwrap_or_else(|e| Err(GisError::Internal(format!("tile decode task failed: {}", e)))),
        Err(e) => Err(GisError::Transport(e.to_string())),
    };

    assembly.complete(layer, tile, outcome);
}

/// Handle to a running mosaic request.
pub struct PendingMosaic {
    receiver: MosaicReceiver,
    assembly: Arc<MosaicAssembly>,
}

impl PendingMosaic {
    pub fn progress(&self) -> MosaicProgress {
        self.assembly.progress()
    }

    /// Wait for the outcome.
    pub async fn wait(self) -> GisResult<GisData> {
        self.receiver.await.unwrap_or_else(|_| {
            Err(GisError::Internal(
                "tile mosaic finished without a result".to_string(),
            ))
        })
    }
}

#[async_trait]
impl DataSource for TileMosaicSource {
    async fn retrieve(&self) -> GisResult<GisData> {
        self.start()?.wait().await
    }

    fn name(&self) -> &str {
        "tile-mosaic"
    }
}

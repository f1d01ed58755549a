//! End-to-end tests of the tile mosaic source against mock tile servers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use gis_common::{CornerType, DataSource, GisConfig, GisError, LatLonBox, PixelFormat, TileCoord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_utils::{assert_approx_eq, bbox, png_bytes, position_color_tile, terrain_rgb_tile};
use tile_mosaic::{
    FetchError, MosaicEndpoints, MosaicPlan, MosaicRequest, TileFetcher, TileLayer,
    TileMosaicSource,
};

const TILE: u32 = 16;

fn config() -> GisConfig {
    GisConfig {
        tile_width: TILE,
        tile_height: TILE,
        ..GisConfig::default()
    }
}

/// Elevation encoded into every pixel of a height tile.
fn tile_elevation(tile: TileCoord, x: u32, y: u32) -> f64 {
    tile.x as f64 * 1000.0 + tile.y as f64 * 100.0 + (y * TILE + x) as f64 * 0.5
}

fn tile_tag(tile: TileCoord) -> u8 {
    (tile.x * 16 + tile.y) as u8
}

fn tile_payload(layer: TileLayer, tile: TileCoord) -> Bytes {
    let image = match layer {
        TileLayer::Color => position_color_tile(TILE, TILE, tile_tag(tile)),
        TileLayer::Height => terrain_rgb_tile(TILE, TILE, |x, y| tile_elevation(tile, x, y)),
    };
    Bytes::from(png_bytes(&image))
}

/// Serves canned responses keyed by URL.
#[derive(Default)]
struct MockFetcher {
    responses: HashMap<String, Result<Bytes, FetchError>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockFetcher {
    fn for_plan(plan: &MosaicPlan) -> Self {
        let responses = plan
            .requests
            .iter()
            .map(|r| (r.url.clone(), Ok(tile_payload(r.layer, r.tile))))
            .collect();
        Self {
            responses,
            ..Self::default()
        }
    }

    fn respond(mut self, url: &str, response: Result<Bytes, FetchError>) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    fn with_random_delays(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for url in self.responses.keys() {
            self.delays
                .insert(url.clone(), Duration::from_millis(rng.gen_range(0..20)));
        }
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                })
            })
    }
}

fn source(request: MosaicRequest, fetcher: Arc<MockFetcher>) -> TileMosaicSource {
    TileMosaicSource::new(request, config(), MosaicEndpoints::default(), fetcher)
}

fn plan_for(request: &MosaicRequest) -> MosaicPlan {
    MosaicPlan::build(request, &config(), &MosaicEndpoints::default()).unwrap()
}

// ============================================================================
// Success paths
// ============================================================================

#[tokio::test]
async fn test_equator_zoom_one_mosaic() {
    let request = MosaicRequest::new(bbox::EQUATOR, 1, "token");
    let plan = plan_for(&request);
    let fetcher = Arc::new(MockFetcher::for_plan(&plan));

    let data = source(request, fetcher.clone()).retrieve().await.unwrap();

    assert_eq!(fetcher.calls(), 8);
    assert_eq!((data.height_width, data.height_height), (2 * TILE, 2 * TILE));
    assert_eq!((data.color_width, data.color_height), (2 * TILE, 2 * TILE));
    assert_eq!(data.height_buffer.len(), (4 * TILE * TILE) as usize);
    assert_eq!(data.color_buffer.len(), (16 * TILE * TILE) as usize);
    assert_eq!(data.pixel_format, PixelFormat::Bgra8);
    assert_eq!(data.corner_type, CornerType::LatLon);
    assert!(data.projection_wkt.contains("3857"));
    assert!(data.validate().is_ok());

    assert_approx_eq!(data.upper_left.x, 85.0511287798, 1e-6);
    assert_approx_eq!(data.upper_left.y, -180.0, 1e-9);
    assert_approx_eq!(data.lower_right.x, -85.0511287798, 1e-6);
    assert_approx_eq!(data.lower_right.y, 180.0, 1e-9);

    // Every pixel comes from the tile covering it
    let width = data.color_width as usize;
    for tile in plan.range.iter() {
        let col = (tile.x as i64 - plan.range.min_x) as usize;
        let row = (tile.y as i64 - plan.range.min_y) as usize;
        for (u, v) in [(0, 0), (TILE - 1, 0), (3, 7), (TILE - 1, TILE - 1)] {
            let px = (row * TILE as usize + v as usize) * width + col * TILE as usize + u as usize;
            let bgra = &data.color_buffer[px * 4..px * 4 + 4];
            assert_eq!(bgra, &[tile_tag(tile), v as u8, u as u8, 255], "tile {:?}", tile);
            assert_approx_eq!(data.height_buffer[px], tile_elevation(tile, u, v), 0.05);
        }
    }
}

#[tokio::test]
async fn test_single_tile_request_is_idempotent() {
    let request = MosaicRequest::new(bbox::MATTERHORN, 3, "token");
    let plan = plan_for(&request);
    assert_eq!(plan.tile_count(), 1);
    let fetcher = Arc::new(MockFetcher::for_plan(&plan));

    let first = source(request.clone(), fetcher.clone()).retrieve().await.unwrap();
    let second = source(request, fetcher.clone()).retrieve().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.calls(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_completion_order() {
    let request = MosaicRequest::new(bbox::ALPS_STRIP, 7, "token");
    let plan = plan_for(&request);
    assert!(plan.tile_count() > 1);

    let mut outcomes = Vec::new();
    for seed in 0..5 {
        let fetcher = Arc::new(MockFetcher::for_plan(&plan).with_random_delays(seed));
        outcomes.push(source(request.clone(), fetcher).retrieve().await.unwrap());
    }

    for outcome in &outcomes[1..] {
        assert_eq!(outcome, &outcomes[0]);
    }
}

#[tokio::test]
async fn test_whole_world_mosaic() {
    let world = LatLonBox::new(85.0511, -180.0, -85.0511, 180.0);
    let request = MosaicRequest::new(world, 1, "token");
    let plan = plan_for(&request);
    assert_eq!((plan.tiles_x, plan.tiles_y), (2, 2));
    let fetcher = Arc::new(MockFetcher::for_plan(&plan));

    let data = source(request, fetcher.clone()).retrieve().await.unwrap();

    assert_eq!(fetcher.calls(), 8);
    assert_eq!((data.color_width, data.color_height), (2 * TILE, 2 * TILE));
    assert_approx_eq!(data.upper_left.y, -180.0, 1e-9);
    assert_approx_eq!(data.lower_right.y, 180.0, 1e-9);
}

#[test]
fn test_edge_reaching_plans_address_real_tiles() {
    let boxes = [
        LatLonBox::new(85.0511, -180.0, -85.0511, 180.0),
        LatLonBox::new(10.0, 170.0, 0.0, 180.0),
        LatLonBox::new(-80.0, 179.0, -85.0511, 180.0),
    ];
    let config = GisConfig::default();

    for bounds in boxes {
        for zoom in 0..=15 {
            let request = MosaicRequest::new(bounds, zoom, "token");
            match MosaicPlan::build(&request, &config, &MosaicEndpoints::default()) {
                Ok(plan) => {
                    let n = 1u32 << zoom;
                    assert!(plan.range.within_world(), "{bounds:?} z{zoom}: {:?}", plan.range);
                    assert!(plan.requests.iter().all(|r| r.tile.x < n && r.tile.y < n));
                    assert_eq!(plan.total_fetches(), 2 * plan.tile_count());
                }
                Err(err) => {
                    assert!(
                        matches!(err, GisError::RasterTooLarge { .. }),
                        "{bounds:?} z{zoom}: {err:?}"
                    );
                }
            }
        }
    }
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_oversized_mosaic_issues_no_fetch() {
    let request = MosaicRequest::new(bbox::ALPS_STRIP, 15, "token");
    let fetcher = Arc::new(MockFetcher::default());
    let source = TileMosaicSource::new(
        request,
        GisConfig::default(),
        MosaicEndpoints::default(),
        fetcher.clone(),
    );

    let err = source.retrieve().await.unwrap_err();
    assert!(matches!(err, GisError::RasterTooLarge { .. }), "{:?}", err);
    tokio::task::yield_now().await;
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_invalid_request_issues_no_fetch() {
    let request = MosaicRequest::new(LatLonBox::new(-1.0, -1.0, 1.0, 1.0), 4, "token");
    let fetcher = Arc::new(MockFetcher::default());
    let err = source(request, fetcher.clone()).retrieve().await.unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_http_failure_fails_request() {
    let request = MosaicRequest::new(bbox::EQUATOR, 1, "token");
    let plan = plan_for(&request);
    let failing = plan.requests[3].url.clone();
    let fetcher = Arc::new(MockFetcher::for_plan(&plan).respond(
        &failing,
        Err(FetchError::Status {
            status: 500,
            url: failing.clone(),
        }),
    ));

    let err = source(request, fetcher).retrieve().await.unwrap_err();
    assert!(matches!(err, GisError::Transport(_)));
    assert!(err
        .to_string()
        .starts_with("One or more requests failed: Web request failed"));
}

#[tokio::test]
async fn test_undecodable_tile_fails_request() {
    let request = MosaicRequest::new(bbox::EQUATOR, 1, "token");
    let plan = plan_for(&request);
    let broken = plan.requests[0].url.clone();
    let fetcher = Arc::new(
        MockFetcher::for_plan(&plan).respond(&broken, Ok(Bytes::from_static(b"<html>rate limited</html>"))),
    );

    let err = source(request, fetcher).retrieve().await.unwrap_err();
    assert!(matches!(err, GisError::Decode(_)));
    assert!(err
        .to_string()
        .starts_with("One or more requests failed: Unable to process image"));
}

#[tokio::test]
async fn test_ignore_missing_tiles_finishes_with_gaps() {
    let request = MosaicRequest::new(bbox::EQUATOR, 1, "token").ignore_missing_tiles(true);
    let plan = plan_for(&request);
    let missing = plan
        .requests
        .iter()
        .find(|r| r.layer == TileLayer::Height)
        .unwrap()
        .clone();
    let fetcher = Arc::new(MockFetcher::for_plan(&plan).respond(
        &missing.url,
        Err(FetchError::EmptyBody {
            url: missing.url.clone(),
        }),
    ));

    let data = source(request, fetcher).retrieve().await.unwrap();
    let col = (missing.tile.x as i64 - plan.range.min_x) as usize;
    let row = (missing.tile.y as i64 - plan.range.min_y) as usize;
    let px = row * TILE as usize * data.height_width as usize + col * TILE as usize;
    assert_eq!(data.height_buffer[px], 0.0);
    assert!(data.validate().is_ok());
}

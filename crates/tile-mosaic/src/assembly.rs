//! Shared mosaic state updated by concurrently completing tile fetches.
//!
//! Completions may arrive in any order, more than once, or after the
//! request has already been resolved. The assembly guarantees that the
//! caller observes exactly one outcome:
//!
//! - each `(layer, tile)` slot is claimed once; repeats are ignored
//! - the completion counter only moves for claimed slots
//! - the outcome is sent through a one-shot channel guarded by a
//!   compare-exchange on `delivered`
//!
//! Pixel rectangles of different tiles never overlap, so each buffer lock
//! is held only for one tile's row copy.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gis_common::{CornerType, GisData, GisError, GisResult, PixelFormat, TileCoord, TileRange};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::decode::TilePixels;
use crate::endpoints::TileLayer;
use crate::plan::MosaicPlan;

/// Receiving half of an assembly's outcome.
pub type MosaicReceiver = oneshot::Receiver<GisResult<GisData>>;

/// Sub-rectangle of each tile copied into the mosaic.
///
/// `max_u` and `max_v` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub min_u: u32,
    pub max_u: u32,
    pub min_v: u32,
    pub max_v: u32,
}

impl CropWindow {
    /// The whole tile.
    pub fn identity(tile_width: u32, tile_height: u32) -> Self {
        Self {
            min_u: 0,
            max_u: tile_width,
            min_v: 0,
            max_v: tile_height,
        }
    }

    pub fn width(&self) -> u32 {
        self.max_u - self.min_u
    }

    pub fn height(&self) -> u32 {
        self.max_v - self.min_v
    }
}

/// Progress counters of an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicProgress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub delivered: bool,
}

/// Mosaic buffers and completion bookkeeping for one request.
pub struct MosaicAssembly {
    range: TileRange,
    tiles_y: usize,
    tiles_per_layer: usize,
    tile_width: u32,
    tile_height: u32,
    width: u32,
    height: u32,
    crop: CropWindow,
    projection_wkt: String,
    ignore_missing_tiles: bool,

    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    slots: Vec<AtomicBool>,

    color: Mutex<Vec<u8>>,
    heights: Mutex<Vec<f32>>,

    delivered: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<GisResult<GisData>>>>,
}

impl MosaicAssembly {
    /// Allocate the mosaic buffers for a plan.
    pub fn new(
        plan: &MosaicPlan,
        projection_wkt: impl Into<String>,
        ignore_missing_tiles: bool,
    ) -> (Arc<Self>, MosaicReceiver) {
        let (tx, rx) = oneshot::channel();
        let pixels = plan.width as usize * plan.height as usize;
        let slot_count = plan.tile_count() * TileLayer::ALL.len();

        let assembly = Arc::new(Self {
            range: plan.range,
            tiles_y: plan.tiles_y as usize,
            tiles_per_layer: plan.tile_count(),
            tile_width: plan.tile_width,
            tile_height: plan.tile_height,
            width: plan.width,
            height: plan.height,
            crop: CropWindow::identity(plan.tile_width, plan.tile_height),
            projection_wkt: projection_wkt.into(),
            ignore_missing_tiles,
            total: plan.total_fetches(),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            slots: (0..slot_count).map(|_| AtomicBool::new(false)).collect(),
            color: Mutex::new(vec![0u8; pixels * 4]),
            heights: Mutex::new(vec![0.0f32; pixels]),
            delivered: AtomicBool::new(false),
            sender: Mutex::new(Some(tx)),
        });

        (assembly, rx)
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    pub fn progress(&self) -> MosaicProgress {
        MosaicProgress {
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
            total: self.total,
            delivered: self.is_delivered(),
        }
    }

    /// Record the outcome of one fetch.
    pub fn complete(&self, layer: TileLayer, tile: TileCoord, outcome: GisResult<TilePixels>) {
        if self.is_delivered() {
            debug!(%layer, tile = %tile.path(), "Discarding completion after delivery");
            return;
        }

        let Some(slot) = self.slot_index(layer, tile) else {
            self.fail(GisError::InternalBounds(format!(
                "{} tile {} is outside the requested range",
                layer,
                tile.path()
            )));
            return;
        };

        if self.slots[slot].swap(true, Ordering::AcqRel) {
            debug!(%layer, tile = %tile.path(), "Ignoring duplicate completion");
            return;
        }

        let result = outcome.and_then(|pixels| {
            if pixels.layer() != layer {
                return Err(GisError::Internal(format!(
                    "{} pixels delivered for the {} layer",
                    pixels.layer(),
                    layer
                )));
            }
            self.place(tile, &pixels)
        });

        if let Err(err) = result {
            let ignorable = matches!(err, GisError::Transport(_) | GisError::Decode(_));
            if self.ignore_missing_tiles && ignorable {
                warn!(%layer, tile = %tile.path(), error = %err, "Leaving missing tile empty");
                self.failed.fetch_add(1, Ordering::AcqRel);
            } else {
                self.fail(err);
                return;
            }
        }

        let done = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(%layer, tile = %tile.path(), done, total = self.total, "Tile completed");
        if done == self.total {
            self.finalize();
        }
    }

    fn slot_index(&self, layer: TileLayer, tile: TileCoord) -> Option<usize> {
        let (col, row) = self.tile_offset(tile)?;
        Some(layer.index() * self.tiles_per_layer + col as usize * self.tiles_y + row as usize)
    }

    /// Column and row of a tile inside the range.
    fn tile_offset(&self, tile: TileCoord) -> Option<(u32, u32)> {
        let (x, y) = (tile.x as i64, tile.y as i64);
        if tile.z != self.range.zoom
            || x < self.range.min_x
            || x > self.range.max_x
            || y < self.range.min_y
            || y > self.range.max_y
        {
            return None;
        }
        Some(((x - self.range.min_x) as u32, (y - self.range.min_y) as u32))
    }

    /// Copy a decoded tile into its rectangle of the mosaic.
    fn place(&self, tile: TileCoord, pixels: &TilePixels) -> GisResult<()> {
        let (col, row) = self.tile_offset(tile).ok_or_else(|| {
            GisError::InternalBounds(format!("tile {} is outside the requested range", tile.path()))
        })?;

        let tile_pixels = self.tile_width as usize * self.tile_height as usize;
        if pixels.pixel_count() != tile_pixels {
            return Err(GisError::Decode(format!(
                "tile {} holds {} pixels, expected {}",
                tile.path(),
                pixels.pixel_count(),
                tile_pixels
            )));
        }

        let copies = self.row_copies(col, row)?;
        match pixels {
            TilePixels::Color(src) => {
                let mut dst = self
                    .color
                    .lock()
                    .map_err(|_| GisError::Internal("colour buffer lock poisoned".into()))?;
                for &(src_px, dst_px, len) in &copies {
                    dst[dst_px * 4..(dst_px + len) * 4]
                        .copy_from_slice(&src[src_px * 4..(src_px + len) * 4]);
                }
            }
            TilePixels::Height(src) => {
                let mut dst = self
                    .heights
                    .lock()
                    .map_err(|_| GisError::Internal("height buffer lock poisoned".into()))?;
                for &(src_px, dst_px, len) in &copies {
                    dst[dst_px..dst_px + len].copy_from_slice(&src[src_px..src_px + len]);
                }
            }
        }

        Ok(())
    }

    /// `(source pixel, destination pixel, length)` of every row copy for the
    /// tile at `(col, row)`, each checked against both buffers.
    fn row_copies(&self, col: u32, row: u32) -> GisResult<Vec<(usize, usize, usize)>> {
        let crop = self.crop;
        let tile_pixels = self.tile_width as usize * self.tile_height as usize;
        let mosaic_pixels = self.width as usize * self.height as usize;
        let len = crop.width() as usize;
        let dst_x = col as usize * crop.width() as usize;
        let dst_y = row as usize * crop.height() as usize;

        let mut copies = Vec::with_capacity(crop.height() as usize);
        for v in crop.min_v..crop.max_v {
            let src = v as usize * self.tile_width as usize + crop.min_u as usize;
            let dst = (dst_y + (v - crop.min_v) as usize) * self.width as usize + dst_x;

            if src + len > tile_pixels {
                error!(src, len, tile_pixels, "Tile source offset out of bounds");
                return Err(GisError::InternalBounds(format!(
                    "source offset {}+{} exceeds tile size {}",
                    src, len, tile_pixels
                )));
            }

            if dst + len > mosaic_pixels {
                error!(dst, len, mosaic_pixels, "Mosaic destination offset out of bounds");
                return Err(GisError::InternalBounds(format!(
                    "destination offset {}+{} exceeds mosaic size {}",
                    dst, len, mosaic_pixels
                )));
            }

            copies.push((src, dst, len));
        }

        Ok(copies)
    }

    fn fail(&self, err: GisError) {
        if matches!(err, GisError::InternalBounds(_)) {
            error!(error = %err, "Mosaic assembly failed");
        } else {
            debug!(error = %err, "Mosaic assembly failed");
        }
        self.deliver(Err(err));
    }

    fn finalize(&self) {
        let color = self.color.lock().map(|mut buf| std::mem::take(&mut *buf));
        let heights = self.heights.lock().map(|mut buf| std::mem::take(&mut *buf));
        let taken = match (color, heights) {
            (Ok(color), Ok(heights)) => Ok((color, heights)),
            _ => Err(()),
        };

        let (color_buffer, height_buffer) = match taken {
            Ok(buffers) => buffers,
            Err(_) => {
                self.deliver(Err(GisError::Internal("mosaic buffer lock poisoned".into())));
                return;
            }
        };

        let data = GisData {
            height_buffer,
            height_width: self.width,
            height_height: self.height,
            color_buffer,
            color_width: self.width,
            color_height: self.height,
            pixel_format: PixelFormat::Bgra8,
            projection_wkt: self.projection_wkt.clone(),
            corner_type: CornerType::LatLon,
            upper_left: self.range.upper_left(),
            lower_right: self.range.lower_right(),
        };

        info!(
            width = self.width,
            height = self.height,
            tiles = self.tiles_per_layer,
            missing = self.failed.load(Ordering::Acquire),
            "Tile mosaic assembled"
        );
        self.deliver(Ok(data));
    }

    fn deliver(&self, outcome: GisResult<GisData>) {
        if self
            .delivered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let sender = self.sender.lock().ok().and_then(|mut guard| guard.take());
        if let Some(tx) = sender {
            // Receiver may already be gone; nothing left to notify then.
            let _ = tx.send(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::MosaicEndpoints;
    use crate::request::MosaicRequest;
    use gis_common::{GisConfig, LatLonBox};

    fn small_config() -> GisConfig {
        GisConfig {
            tile_width: 2,
            tile_height: 2,
            ..GisConfig::default()
        }
    }

    fn equator_plan() -> MosaicPlan {
        let request = MosaicRequest::new(LatLonBox::new(1.0, -1.0, -1.0, 1.0), 1, "t");
        MosaicPlan::build(&request, &small_config(), &MosaicEndpoints::default()).unwrap()
    }

    fn color(value: u8) -> TilePixels {
        TilePixels::Color(vec![value; 16])
    }

    fn height(value: f32) -> TilePixels {
        TilePixels::Height(vec![value; 4])
    }

    #[test]
    fn test_crop_identity() {
        let crop = CropWindow::identity(256, 256);
        assert_eq!((crop.width(), crop.height()), (256, 256));
    }

    #[test]
    fn test_tile_placement() {
        let plan = equator_plan();
        let (assembly, mut rx) = MosaicAssembly::new(&plan, "wkt", false);

        for tile in plan.range.iter() {
            let tag = (tile.x * 10 + tile.y) as u8;
            assembly.complete(TileLayer::Color, tile, Ok(color(tag)));
            assembly.complete(TileLayer::Height, tile, Ok(height(tag as f32)));
        }

        let data = rx.try_recv().unwrap().unwrap();
        assert_eq!((data.color_width, data.color_height), (4, 4));
        assert!(data.validate().is_ok());
        // Mosaic pixel (3, 1) belongs to tile x=1, y=0
        assert_eq!(data.height_buffer[1 * 4 + 3], 10.0);
        // Mosaic pixel (0, 2) belongs to tile x=0, y=1
        assert_eq!(data.color_buffer[(2 * 4) * 4], 1);
        assert_eq!(data.pixel_format, PixelFormat::Bgra8);
        assert_eq!(data.corner_type, CornerType::LatLon);
    }

    #[test]
    fn test_failure_delivered_once() {
        let plan = equator_plan();
        let (assembly, mut rx) = MosaicAssembly::new(&plan, "wkt", false);
        let tiles: Vec<_> = plan.range.iter().collect();

        assembly.complete(TileLayer::Color, tiles[0], Ok(color(1)));
        assembly.complete(
            TileLayer::Height,
            tiles[0],
            Err(GisError::Transport("HTTP 404".into())),
        );
        assert!(assembly.is_delivered());

        // Late arrivals are discarded
        for &tile in &tiles[1..] {
            assembly.complete(TileLayer::Color, tile, Ok(color(1)));
            assembly.complete(TileLayer::Height, tile, Ok(height(1.0)));
        }

        let outcome = rx.try_recv().unwrap();
        assert!(matches!(outcome, Err(GisError::Transport(_))));
        assert_eq!(assembly.progress().completed, 1);
    }

    #[test]
    fn test_ignore_missing_tiles() {
        let plan = equator_plan();
        let (assembly, mut rx) = MosaicAssembly::new(&plan, "wkt", true);
        let tiles: Vec<_> = plan.range.iter().collect();

        for (i, &tile) in tiles.iter().enumerate() {
            if i == 2 {
                assembly.complete(TileLayer::Color, tile, Err(GisError::Decode("bad".into())));
            } else {
                assembly.complete(TileLayer::Color, tile, Ok(color(9)));
            }
            assembly.complete(TileLayer::Height, tile, Ok(height(5.0)));
        }

        let data = rx.try_recv().unwrap().unwrap();
        let progress = assembly.progress();
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.completed, progress.total);
        // tiles[2] is x=1, y=0: its pixels stay zero
        assert_eq!(data.color_buffer[(0 * 4 + 2) * 4], 0);
        assert_eq!(data.color_buffer[0], 9);
    }

    #[test]
    fn test_ignore_missing_does_not_hide_bounds_errors() {
        let plan = equator_plan();
        let (assembly, mut rx) = MosaicAssembly::new(&plan, "wkt", true);
        let outside = TileCoord::new(1, 5, 5);
        assembly.complete(TileLayer::Color, outside, Ok(color(1)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(GisError::InternalBounds(_))
        ));
    }

    #[test]
    fn test_wrong_pixel_count_is_decode_error() {
        let plan = equator_plan();
        let (assembly, mut rx) = MosaicAssembly::new(&plan, "wkt", false);
        let tile = plan.range.iter().next().unwrap();
        assembly.complete(TileLayer::Height, tile, Ok(TilePixels::Height(vec![0.0; 3])));
        assert!(matches!(rx.try_recv().unwrap(), Err(GisError::Decode(_))));
    }
}

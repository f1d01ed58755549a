//! Files written for a prepared terrain.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::{ImageBuffer, Luma, Rgba};
use terrain_prep::TerrainInput;
use tracing::debug;

pub const HEIGHTMAP_FILE: &str = "heightmap.png";
pub const COLOR_FILE: &str = "color.png";
pub const METADATA_FILE: &str = "metadata.json";

/// Write heightmap, colour texture and metadata into `dir`.
pub fn write_terrain(dir: &Path, terrain: &TerrainInput) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let heightmap: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(
        terrain.height_width,
        terrain.height_height,
        terrain.heights.samples.clone(),
    )
    .ok_or_else(|| anyhow!("height samples do not match the heightmap size"))?;
    let heightmap_path = dir.join(HEIGHTMAP_FILE);
    heightmap
        .save(&heightmap_path)
        .with_context(|| format!("Failed to write {}", heightmap_path.display()))?;

    let color: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(
        terrain.color_width,
        terrain.color_height,
        bgra_to_rgba(&terrain.color_bgra),
    )
    .ok_or_else(|| anyhow!("colour samples do not match the texture size"))?;
    let color_path = dir.join(COLOR_FILE);
    color
        .save(&color_path)
        .with_context(|| format!("Failed to write {}", color_path.display()))?;

    let metadata_path = dir.join(METADATA_FILE);
    let file = File::create(&metadata_path)
        .with_context(|| format!("Failed to create {}", metadata_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &terrain.metadata())
        .context("Failed to write terrain metadata")?;

    debug!(dir = %dir.display(), "Wrote terrain files");
    Ok(vec![heightmap_path, color_path, metadata_path])
}

fn bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    bgra.chunks_exact(4)
        .flat_map(|p| [p[2], p[1], p[0], p[3]])
        .collect()
}

//! Terrain fetcher.
//!
//! Retrieves GIS data from web map tiles or a local dataset pair, prepares
//! it for landscape import and writes:
//! - `heightmap.png`: 16-bit grayscale spanning the full height range
//! - `color.png`: RGBA colour texture
//! - `metadata.json`: dimensions, corners, WKT, height range and scale

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gis_common::{DataSource, GisConfig, LatLonBox};
use local_dataset::{default_provider, LocalDatasetSource};
use terrain_prep::prepare_terrain;
use tile_mosaic::{
    HttpFetchConfig, HttpTileFetcher, MosaicEndpoints, MosaicRequest, TileMosaicSource,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gis-fetch")]
#[command(about = "Fetch terrain GIS data and write landscape import files")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output directory
    #[arg(long, global = true, default_value = "terrain-out")]
    out: PathBuf,

    /// Landscape scale multiplier (x, y, z)
    #[arg(long, global = true, num_args = 3, value_delimiter = ',', default_value = "1,1,1")]
    scale: Vec<f64>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit JSON log records
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stitch satellite and Terrain-RGB tiles for a lat/lon box
    Mapbox {
        #[arg(long, allow_hyphen_values = true)]
        upper_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        left_lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        lower_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        right_lon: f64,

        /// Tile zoom level
        #[arg(long)]
        zoom: i32,

        /// Tile service access token
        #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Leave failed tiles empty instead of aborting
        #[arg(long)]
        ignore_missing_tiles: bool,
    },

    /// Read a heightmap and colour raster pair from disk
    Local {
        #[arg(long)]
        heightmap: PathBuf,

        #[arg(long)]
        color: PathBuf,
    },
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_source(command: Command, config: &GisConfig) -> Result<Box<dyn DataSource>> {
    let source: Box<dyn DataSource> = match command {
        Command::Mapbox {
            upper_lat,
            left_lon,
            lower_lat,
            right_lon,
            zoom,
            access_token,
            ignore_missing_tiles,
        } => {
            let bounds = LatLonBox::new(upper_lat, left_lon, lower_lat, right_lon);
            let request = MosaicRequest::new(bounds, zoom, access_token)
                .ignore_missing_tiles(ignore_missing_tiles);
            let fetcher = HttpTileFetcher::new(&HttpFetchConfig::from_env())
                .context("Failed to build HTTP client")?;
            Box::new(TileMosaicSource::new(
                request,
                config.clone(),
                MosaicEndpoints::from_env(),
                Arc::new(fetcher),
            ))
        }
        Command::Local { heightmap, color } => Box::new(LocalDatasetSource::new(
            heightmap,
            color,
            config.clone(),
            default_provider(),
        )),
    };
    Ok(source)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = GisConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let scale = [args.scale[0], args.scale[1], args.scale[2]];
    let out = args.out.clone();
    let source = build_source(args.command, &config)?;

    info!(source = source.name(), out = %out.display(), "Retrieving terrain");
    let gis = source
        .retrieve()
        .await
        .with_context(|| format!("{} retrieval failed", source.name()))?;

    let terrain = prepare_terrain(&gis, &config, scale).context("Terrain preparation failed")?;
    let written = output::write_terrain(&out, &terrain)?;

    info!(
        width = terrain.height_width,
        height = terrain.height_height,
        files = written.len(),
        "Terrain written"
    );
    Ok(())
}

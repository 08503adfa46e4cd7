//! Island snapshot tool: builds a field, streams every island in and writes
//! each island's synthesized image to a PNG.
//!
//! Usage: cargo run --release --bin snapshot_islands -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON terrain config (default: built-in defaults)
//!   --seed <SEED>     Override the config seed
//!   --random-seed     Use a clock-derived seed instead
//!   --out <DIR>       Output directory (default: "snapshots")
//!   --damage <N>      Random craters punched into each island before export (default: 0)
//!   --timeout <SECS>  Max time to wait for the loader (default: 60)
//!
//! Output structure:
//!   <out>/
//!     island_000.png
//!     island_001.png
//!     ...

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use atoll::core::{logging, Result};
use atoll::math::Quad;
use atoll::{Terrain, TerrainConfig};
use glam::Vec2;

struct Snapshot {
    index: u32,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("Snapshot failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "snapshots".to_string()));
    let craters = parse_u32_arg(&args, "--damage").unwrap_or(0);
    let timeout = Duration::from_secs(parse_u32_arg(&args, "--timeout").unwrap_or(60) as u64);

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => TerrainConfig::load(Path::new(&path))?,
        None => TerrainConfig::default(),
    };
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.seed = seed;
    }
    if args.iter().any(|a| a == "--random-seed") {
        config = config.with_random_seed();
    }

    println!("=== Atoll Island Snapshot ===");
    println!("Seed:   {}", config.seed);
    println!("Field:  {} x {}", config.field_size, config.field_size);
    println!("Output: {}", out_dir.display());
    println!();

    let start = Instant::now();
    let field_size = config.field_size;
    let mut terrain = Terrain::new(config)?;
    if !terrain.wait_idle(timeout) {
        log::warn!("Island generation did not finish within {:?}", timeout);
    }

    // One camera over the whole field loads every island and every chunk
    let camera = Quad::new(Vec2::ZERO, Vec2::splat(field_size));
    terrain.update_visual(&camera);

    for (i, island) in terrain.islands().iter().enumerate() {
        let bounds = *island.bounds();
        for k in 0..craters {
            let t = (i as u32 * 31 + k * 17) as f32;
            let centre = bounds.min + bounds.size() * Vec2::new((t * 0.37).fract(), (t * 0.61).fract());
            let crater = Quad::from_center_half_extent(centre, Vec2::splat(island.cell_size() as f32 * 3.0));
            terrain.damage_area(&crater, f32::MAX);
        }
    }

    if !terrain.wait_idle(timeout) {
        log::warn!("Chunk synthesis did not finish within {:?}", timeout);
    }
    terrain.update_visual(&camera);

    let stats = terrain.stats();
    log::info!(
        "Streamed {} islands ({} chunks) in {:.2}s",
        stats.loaded,
        stats.rendered_chunks,
        start.elapsed().as_secs_f64()
    );

    let snapshots: Vec<Snapshot> = terrain
        .islands()
        .iter()
        .filter_map(|island| {
            island.with_pixels(|buffer| Snapshot {
                index: island.id().0,
                width: buffer.width(),
                height: buffer.height(),
                rgba: buffer.as_bytes().to_vec(),
            })
        })
        .collect();

    std::fs::create_dir_all(&out_dir)?;
    let results: Vec<Result<PathBuf>> = snapshots
        .par_iter()
        .map(|snap| {
            let path = out_dir.join(format!("island_{:03}.png", snap.index));
            image::save_buffer(
                &path,
                &snap.rgba,
                snap.width,
                snap.height,
                image::ExtendedColorType::Rgba8,
            )?;
            Ok(path)
        })
        .collect();

    let mut written = 0;
    for result in results {
        let path = result?;
        log::debug!("Wrote {}", path.display());
        written += 1;
    }

    println!("Wrote {} island images to {}", written, out_dir.display());
    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

//! Voxelize an object description and compare the two cube meshers.
//!
//! Usage: cargo run --release --bin voxelize -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Object description (default: built-in demo scene)
//!   --depth <N>           Override the octree depth
//!   --threads <N>         Dedicated pool size for the parallel mesher
//!                         (default: rayon global pool)
//!   --save-config <PATH>  Write the effective description to PATH and exit

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use voxcarve::core::logging;
use voxcarve::core::types::Result;
use voxcarve::mesh::{MeshBuilder, ParallelMeshBuilder};
use voxcarve::scene::ObjectConfig;
use voxcarve::voxel::svo::LeafVoxel;
use voxcarve::voxel::VoxelObject;

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("voxelize failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_arg::<PathBuf>(&args, "--config");
    let depth = parse_arg::<u8>(&args, "--depth");
    let threads = parse_arg::<usize>(&args, "--threads");
    let save_path = parse_arg::<PathBuf>(&args, "--save-config");

    let mut config = match &config_path {
        Some(path) => ObjectConfig::load_sync(path)?,
        None => ObjectConfig::default(),
    };
    if let Some(depth) = depth {
        config.depth = depth;
    }
    config.validate()?;

    if let Some(path) = save_path {
        config.save_sync(&path)?;
        println!("Saved config to {}", path.display());
        return Ok(());
    }

    println!("=== Voxcarve ===");
    match &config_path {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: demo scene"),
    }
    println!("Depth:  {} (unit size {})", config.depth, config.unit_size);
    println!("Passes: {}", config.passes.len());
    println!();

    let object = VoxelObject::from_config(&config)?;
    object.store().validate(object.registry())?;

    let start = Instant::now();
    let leaves: Vec<LeafVoxel> = object.leaves().collect();
    log::info!(
        "Collected {} leaves in {:.2}ms",
        leaves.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let start = Instant::now();
    let sequential = MeshBuilder::new(object.registry()).build(leaves.iter().copied())?;
    let sequential_ms = start.elapsed().as_secs_f64() * 1000.0;
    log::info!("Sequential mesher: {:.2}ms", sequential_ms);

    let parallel_builder = match threads {
        Some(n) => ParallelMeshBuilder::new(object.registry()).with_threads(n)?,
        None => ParallelMeshBuilder::new(object.registry()),
    };
    let start = Instant::now();
    let parallel = parallel_builder.build_from_slice(&leaves)?;
    let parallel_ms = start.elapsed().as_secs_f64() * 1000.0;
    log::info!("Parallel mesher: {:.2}ms", parallel_ms);

    if sequential != parallel {
        log::warn!("Sequential and parallel meshes differ");
    }

    println!("Leaves:    {}", leaves.len());
    println!("Vertices:  {}", parallel.vertex_count());
    println!("Triangles: {}", parallel.triangle_count());
    println!("Memory:    {:.1} KB", parallel.memory_usage() as f64 / 1024.0);
    println!(
        "Timing:    sequential {:.2}ms, parallel {:.2}ms ({:.2}x)",
        sequential_ms,
        parallel_ms,
        sequential_ms / parallel_ms.max(f64::EPSILON)
    );
    Ok(())
}

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

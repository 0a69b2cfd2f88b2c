use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hashbrown::HashMap;
use strata_blocks::{BlockRegistry, ContentId};
use strata_chunk::VoxelManip;
use strata_geom::{V3i, VoxelArea};
use strata_runtime::{ChunkResult, EmergeRuntime};
use strata_world::voxel::containing_chunk;
use strata_world::worldgen::load_params_from_path;
use strata_world::{ChunkBounds, MapgenV7p, WorldGenParams};

/// V7P terrain generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Worldgen config (TOML); built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Node registry (TOML); built-in nodes when absent
    #[arg(long, global = true)]
    blocks: Option<PathBuf>,

    /// Override the configured map seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a box of chunks (inclusive, in chunk coordinates)
    Gen {
        #[arg(long, value_parser = parse_v3i, default_value = "0,0,0")]
        from: V3i,
        #[arg(long, value_parser = parse_v3i, default_value = "0,0,0")]
        to: V3i,
        /// Worker threads; 0 uses every core
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
    /// Spawn level of one column, or a full spawn search without --x/--z
    Spawn {
        #[arg(long, requires = "z")]
        x: Option<i32>,
        #[arg(long, requires = "x")]
        z: Option<i32>,
    },
    /// Print the effective worldgen config
    Config,
}

fn parse_v3i(s: &str) -> Result<V3i, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z, got '{s}'"));
    }
    let mut v = [0i32; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("bad coordinate '{part}': {e}"))?;
    }
    Ok(V3i::new(v[0], v[1], v[2]))
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut params = match &args.config {
        Some(path) => load_params_from_path(path)?,
        None => WorldGenParams::default(),
    };
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    params.validate()?;
    let params = Arc::new(params);

    let registry = Arc::new(match &args.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::builtin()?,
    });

    match args.command {
        Command::Gen { from, to, threads } => run_gen(params, registry, from, to, threads),
        Command::Spawn { x: Some(x), z: Some(z) } => {
            let mg = MapgenV7p::new(params, registry)?;
            match mg.spawn_level_at_point(x, z) {
                Some(y) => println!("spawn level at ({x}, {z}): {y}"),
                None => println!("column ({x}, {z}) is unsuitable for spawning"),
            }
            Ok(())
        }
        Command::Spawn { .. } => {
            let runtime = EmergeRuntime::new(params, registry, 1)?;
            let p = runtime.find_spawn_pos()?;
            println!("spawn position: {} {} {}", p.x, p.y, p.z);
            Ok(())
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&params.to_config())?);
            Ok(())
        }
    }
}

fn run_gen(
    params: Arc<WorldGenParams>,
    registry: Arc<BlockRegistry>,
    from: V3i,
    to: V3i,
    threads: usize,
) -> Result<(), Box<dyn Error>> {
    let cs = params.chunksize;
    let (lo, hi) = (from.min(to), from.max(to));
    let mut chunks = Vec::new();
    for z in lo.z..=hi.z {
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                chunks.push(containing_chunk(V3i::new(x, y, z) * cs, cs));
            }
        }
    }

    let runtime = EmergeRuntime::new(params.clone(), registry.clone(), threads)?;
    log::info!(
        "generating {} chunks on {} workers (seed {})",
        chunks.len(),
        runtime.worker_count(),
        params.seed
    );
    let results = runtime.generate_all(chunks)?;
    for r in &results {
        print_chunk(r, cs, &registry);
    }
    Ok(())
}

fn print_chunk(r: &ChunkResult, chunksize: i32, registry: &BlockRegistry) {
    let core = ChunkBounds::for_chunk(r.blockpos_min, chunksize).core();

    println!(
        "chunk {:?}..={:?}: {} ms, {} liquid updates",
        core.min,
        core.max,
        r.t_total_ms,
        r.liquid_queue.len()
    );
    for (name, count) in content_histogram(&r.vmanip, &core, registry) {
        println!("  {name:<24} {count}");
    }
    let stages: Vec<String> = r
        .timing
        .iter()
        .map(|(stage, d)| format!("{}={}us", stage.label(), d.as_micros()))
        .collect();
    println!("  timing: {}", stages.join(" "));
}

/// Node counts inside `core`, most common first.
fn content_histogram<'r>(
    vm: &VoxelManip,
    core: &VoxelArea,
    registry: &'r BlockRegistry,
) -> Vec<(&'r str, usize)> {
    let mut counts: HashMap<ContentId, usize> = HashMap::new();
    for p in core.iter() {
        *counts.entry(vm.content(p)).or_insert(0) += 1;
    }
    let mut out: Vec<_> = counts
        .into_iter()
        .map(|(id, n)| (registry.get(id).name.as_str(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    out
}

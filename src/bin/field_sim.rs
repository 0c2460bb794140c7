//! Headless Field Runner
//!
//! Runs a grid for a fixed number of ticks and writes the final snapshot
//! as JSON for external visualization.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use negation_grid::core::config::GridConfig;
use negation_grid::core::error::Result;
use negation_grid::core::types::SweepMode;
use negation_grid::simulation::FieldWorld;

/// Headless Field Runner - batch runs with JSON output
#[derive(Parser, Debug)]
#[command(name = "field_sim")]
#[command(about = "Run the propagation grid for N ticks and dump the final state")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 128)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 128)]
    height: usize,

    /// Number of ticks to run
    #[arg(long, default_value_t = 500)]
    ticks: u32,

    /// TOML config file (defaults are used for missing keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed override for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Read neighbor state from a pre-pass snapshot in Pass 2
    #[arg(long)]
    snapshot: bool,

    /// Disable the persistent seed region
    #[arg(long)]
    no_seed: bool,

    /// Print stats every N ticks (0 = only at the end)
    #[arg(long, default_value_t = 100)]
    report_every: u32,

    /// Where to write the final JSON snapshot
    #[arg(long, short = 'o', default_value = "field_output.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "negation_grid=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GridConfig::load_from_file(path)?,
        None => GridConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if args.snapshot {
        config.sweep_mode = SweepMode::Snapshot;
    }
    if args.no_seed {
        config.seed_region = None;
    }

    println!("Starting Field Simulation");
    println!("=========================");
    println!("Grid: {}x{} cells", args.width, args.height);
    println!("Seed: {} ({:?} sweep)", config.random_seed, config.sweep_mode);
    println!("Simulating {} ticks...", args.ticks);
    println!();

    let mut world = FieldWorld::new(args.width, args.height, config)?;

    let start = Instant::now();
    let mut collapses = 0;
    for _ in 0..args.ticks {
        let stats = world.tick();
        collapses += stats.collapses;
        if args.report_every > 0 && stats.tick % u64::from(args.report_every) == 0 {
            let field = world.stats();
            println!(
                "tick {:>6}: {:>6} active, budget {:>10.2}, entropy {:.3}, pool {:.1}",
                field.tick, field.active_cells, field.total_budget, field.mean_entropy, field.global_pool
            );
        }
    }
    let elapsed = start.elapsed();

    let snapshot = world.snapshot();
    println!();
    println!("{}", snapshot.summary());
    println!("{} collapses", collapses);
    println!("Actual time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    std::fs::write(&args.output, snapshot.to_json())?;
    println!("\nFull output written to {}", args.output.display());

    Ok(())
}

//! Negation Grid - Entry Point
//!
//! Interactive headless console over a single grid. Builds the world from
//! an optional TOML config, then reads commands from stdin to step, run,
//! play, pause and inspect the simulation.

use negation_grid::core::config::GridConfig;
use negation_grid::core::error::Result;
use negation_grid::simulation::{FieldWorld, TickScheduler};

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const DEFAULT_WIDTH: usize = 64;
const DEFAULT_HEIGHT: usize = 64;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "negation_grid=info".into()),
        )
        .init();

    tracing::info!("Negation Grid starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => GridConfig::load_from_file(Path::new(&path))?,
        None => GridConfig::default(),
    };

    let world = FieldWorld::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, config)?;
    let mut scheduler = TickScheduler::new(world);
    scheduler.pause();

    println!("\n=== NEGATION GRID ===");
    println!("Budget propagation over a {}x{} grid", DEFAULT_WIDTH, DEFAULT_HEIGHT);
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance simulation by one tick");
    println!("  run <n>         - Run n simulation ticks");
    println!("  play / pause    - Toggle the scheduler");
    println!("  wait <ms>       - Feed the scheduler <ms> of wall time");
    println!("  cell <x> <y>    - Show one cell");
    println!("  status / s      - Show field statistics");
    println!("  quit / q        - Exit");
    println!();

    loop {
        display_status(&scheduler);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            let stats = scheduler.step();
            println!(
                "Tick {} complete: {} propagating, {} activated, {} collapsed.",
                stats.tick, stats.propagating, stats.activations, stats.collapses
            );
            continue;
        }

        if input == "status" || input == "s" {
            println!("{}", scheduler.world().snapshot().summary());
            continue;
        }

        if input == "play" {
            scheduler.play();
            println!("Playing at {} ticks/s.", scheduler.world().config().ticks_per_second);
            continue;
        }

        if input == "pause" {
            scheduler.pause();
            println!("Paused.");
            continue;
        }

        if let Some(arg) = input.strip_prefix("run ") {
            match arg.trim().parse::<u32>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    scheduler.world_mut().run(n);
                    println!(
                        "Completed {} ticks. Now at tick {}.",
                        n,
                        scheduler.world().current_tick
                    );
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        if let Some(arg) = input.strip_prefix("wait ") {
            match arg.trim().parse::<u64>() {
                Ok(ms) => {
                    let ran = scheduler.advance(Duration::from_millis(ms));
                    if scheduler.is_playing() {
                        println!("{} tick(s) ran in {}ms of wall time.", ran.len(), ms);
                    } else {
                        println!("Scheduler is paused; use `play` first.");
                    }
                }
                Err(_) => println!("Usage: wait <milliseconds>"),
            }
            continue;
        }

        if let Some(args) = input.strip_prefix("cell ") {
            let coords: Vec<_> = args.split_whitespace().map(str::parse::<usize>).collect();
            match coords.as_slice() {
                [Ok(x), Ok(y)] => match scheduler.world().cell_view(*x, *y) {
                    Ok(cell) => println!(
                        "({}, {}) budget {:.3}, viability {:.3}, entropy {:.3}, active {}, vacuum {}",
                        cell.x,
                        cell.y,
                        cell.local_budget,
                        cell.viability,
                        cell.entropy,
                        cell.active,
                        cell.is_vacuum
                    ),
                    Err(e) => println!("{}", e),
                },
                _ => println!("Usage: cell <x> <y>"),
            }
            continue;
        }

        println!("Unknown command. Available: tick, run <n>, play, pause, wait <ms>, cell <x> <y>, status, quit");
    }

    let stats = scheduler.world().stats();
    println!(
        "\nGoodbye! Final state: {} active cells, {} ticks elapsed.",
        stats.active_cells, stats.tick
    );
    Ok(())
}

/// Display a brief status line
fn display_status(scheduler: &TickScheduler) {
    let stats = scheduler.world().stats();
    println!();
    println!(
        "--- Tick {} | Active: {} | Pool: {:.1} | {:?} ---",
        stats.tick,
        stats.active_cells,
        stats.global_pool,
        scheduler.state()
    );
}

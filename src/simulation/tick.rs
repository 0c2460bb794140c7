//! Tick system - orchestrates one discrete simulation step
//!
//! The pass order is fixed:
//! 1. Gather outflow into `incoming` (Pass 1)
//! 2. Inject the seed region's continuous inflow
//! 3. Apply flow, entropy estimate and viability (Pass 2)
//! 4. Recharge the global pool (Pass 3)
//! 5. Diffuse and relax entropy (Pass 4)
//!
//! Pass 2 must see the same pre-pass budgets Pass 1 judged eligibility
//! on, and Pass 4 must diffuse the entropy Pass 2 just wrote. A tick runs
//! to completion; hosts only ever pause between ticks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::simulation::diffusion::diffuse_entropy;
use crate::simulation::flow::{gather_outflow, inject_seed_inflow};
use crate::simulation::viability::apply_viability;
use crate::simulation::world::FieldWorld;

/// Summary of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    /// Tick number after this step completed
    pub tick: Tick,
    /// Cells that pushed budget in Pass 1
    pub propagating: usize,
    /// Cells activated in Pass 2
    pub activations: usize,
    /// Cells hit by stochastic collapse
    pub collapses: usize,
    /// Total drawn from the global pool by activations
    pub pool_drawn: f32,
    /// Pool level after recharge
    pub pool_after: f32,
}

/// Run a single simulation tick
pub fn run_simulation_tick<R: Rng>(world: &mut FieldWorld<R>) -> TickStats {
    let FieldWorld {
        topology,
        cells,
        pool,
        config,
        seed_cells,
        rng,
        current_tick,
    } = world;

    let propagating = gather_outflow(topology, cells, config);
    inject_seed_inflow(cells, seed_cells, config.seed_inflow_per_tick);
    let outcome = apply_viability(topology, cells, pool, config, rng);
    pool.recharge();
    diffuse_entropy(topology, cells, config);

    *current_tick += 1;

    let stats = TickStats {
        tick: *current_tick,
        propagating,
        activations: outcome.activations,
        collapses: outcome.collapses,
        pool_drawn: outcome.pool_drawn,
        pool_after: pool.current(),
    };

    tracing::debug!(
        tick = stats.tick,
        propagating = stats.propagating,
        activations = stats.activations,
        collapses = stats.collapses,
        pool = stats.pool_after,
        "Tick complete"
    );

    stats
}

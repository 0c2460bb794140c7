//! Pass 2 - apply flow, estimate entropy, score viability
//!
//! For every non-vacuum cell, in index order:
//! 1. Entropy estimate from the 16 neighbor activation patterns
//! 2. Stochastic collapse (seeded RNG)
//! 3. Spend the outflow Pass 1 already distributed
//! 4. Draw the activation cost from the global pool for dormant cells
//! 5. Add inflow, clamp to the local cap
//! 6. Entropy update
//! 7. Viability score against a scarcity-scaled threshold
//! 8. Activation
//! 9. Baseline decay
//! 10. Static attraction bonus for non-viable cells next to active ones
//! 11. Zero-budget streak tracking
//!
//! The pool draw in step 4 is check-then-subtract on shared state, so the
//! cell loop always runs sequentially. In `SweepMode::Snapshot` the entropy
//! estimates (the expensive part) are computed up front in parallel.

use rand::Rng;
use rayon::prelude::*;

use crate::core::config::GridConfig;
use crate::core::types::SweepMode;
use crate::simulation::budget_pool::GlobalBudgetPool;
use crate::simulation::cell_state::CellState;
use crate::simulation::flow::outflow_eligible;
use crate::spatial::grid::GridTopology;

/// Share of a neighbor's pushed budget assumed to reach this cell when
/// estimating persistence
pub const PERSISTENCE_NEIGHBOR_SHARE: f32 = 0.25;

/// Number of neighbor activation patterns (2^4)
const PATTERN_COUNT: u32 = 16;

/// What happened during one Pass 2 sweep
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViabilityOutcome {
    /// Cells that became active this tick
    pub activations: usize,
    /// Cells hit by stochastic collapse
    pub collapses: usize,
    /// Total drawn from the global pool
    pub pool_drawn: f32,
}

/// Combinatorial persistence score in `[0, 1]`
///
/// Counts how many of the 16 on/off patterns over the four neighbors leave
/// the cell above `min_budget_for_persistence`, then log-scales the count.
pub fn entropy_estimate(own_budget: f32, neighbor_budgets: [f32; 4], config: &GridConfig) -> f32 {
    let mut persistent = 0u32;
    for mask in 0..PATTERN_COUNT {
        let mut simulated = own_budget;
        for (bit, &neighbor) in neighbor_budgets.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                simulated += config.propagate_fraction * neighbor * PERSISTENCE_NEIGHBOR_SHARE;
            }
        }
        if simulated > config.min_budget_for_persistence {
            persistent += 1;
        }
    }
    (1.0 + persistent as f32).ln() / (1.0 + PATTERN_COUNT as f32).ln()
}

/// Viability score for a cell with the given inflow and entropy
///
/// Scarcity in the global pool raises the threshold for every cell at once.
pub fn viability_score(inflow: f32, entropy: f32, pool: &GlobalBudgetPool, config: &GridConfig) -> f32 {
    let energy_loss = config.decay_loss + config.entropy_penalty * entropy;
    let effective_threshold =
        config.threshold_base * (1.0 + config.scarcity_gain * pool.scarcity());
    (inflow - energy_loss) / effective_threshold.max(config.viability_epsilon)
}

/// Budgets in the four neighbor slots; boundary slots read as zero
#[inline]
fn neighbor_budgets(topology: &GridTopology, budget: &[f32], idx: usize) -> [f32; 4] {
    topology
        .neighbor_slots(idx)
        .map(|slot| slot.map_or(0.0, |n| budget[n]))
}

#[inline]
fn active_neighbor_count(topology: &GridTopology, active: &[bool], idx: usize) -> usize {
    topology.neighbors(idx).filter(|&n| active[n]).count()
}

/// Snapshot mode: every estimate from pre-pass budgets, written into `out`
fn precompute_estimates(topology: &GridTopology, cells: &CellState, config: &GridConfig, out: &mut [f32]) {
    let budget = &cells.local_budget;
    let vacuum = &cells.is_vacuum;
    let compute = |(idx, slot): (usize, &mut f32)| {
        *slot = if vacuum[idx] {
            0.0
        } else {
            entropy_estimate(budget[idx], neighbor_budgets(topology, budget, idx), config)
        };
    };

    if out.len() >= config.parallel_threshold {
        out.par_iter_mut().enumerate().for_each(compute);
    } else {
        out.iter_mut().enumerate().for_each(compute);
    }
}

/// Run Pass 2 over the whole grid
pub fn apply_viability<R: Rng + ?Sized>(
    topology: &GridTopology,
    cells: &mut CellState,
    pool: &mut GlobalBudgetPool,
    config: &GridConfig,
    rng: &mut R,
) -> ViabilityOutcome {
    let mut outcome = ViabilityOutcome::default();

    // Scratch buffers are moved out for the sweep and handed back after
    let mut estimates = std::mem::take(&mut cells.estimates);
    let mut active_before = std::mem::take(&mut cells.active_before);
    let snapshot = config.sweep_mode == SweepMode::Snapshot;
    if snapshot {
        precompute_estimates(topology, cells, config, &mut estimates);
        active_before.copy_from_slice(&cells.active);
    }

    for idx in 0..cells.len() {
        if cells.is_vacuum[idx] {
            continue;
        }

        let pre_budget = cells.local_budget[idx];
        let pre_viability = cells.viability[idx];
        let mut inflow = cells.incoming[idx];

        // Neighbors earlier in the sweep are already updated in in-place mode
        let mut estimate = if snapshot {
            estimates[idx]
        } else {
            entropy_estimate(
                pre_budget,
                neighbor_budgets(topology, &cells.local_budget, idx),
                config,
            )
        };

        // One draw per non-vacuum cell keeps the stream position fixed
        let mut budget = pre_budget;
        let collapsed = rng.gen_bool(f64::from(config.collapse_probability)) && pre_budget > 0.0;
        if collapsed {
            estimate = 1.0;
            budget = 0.0;
            outcome.collapses += 1;
            tracing::trace!(cell = idx, lost = pre_budget, "Cell collapsed");
        }

        // Same predicate and inputs Pass 1 used
        let outflow = if outflow_eligible(pre_budget, pre_viability, config) {
            pre_budget * config.propagate_fraction
        } else {
            0.0
        };
        budget = (budget - outflow).max(0.0);

        // Waking a dormant cell costs the shared pool
        if !cells.active[idx] && inflow > 0.0 && !pool.is_empty() {
            let drawn = pool.draw(config.activation_cost);
            inflow += drawn;
            outcome.pool_drawn += drawn;
        }

        budget = (budget + inflow).min(config.local_budget_max);

        // Gain only applies to cells that carried flow this tick
        if !cells.entropy_locked[idx] {
            let used = inflow > 0.0 || outflow > 0.0 || collapsed;
            let gain = if used { config.entropy_gain_per_use } else { 0.0 };
            cells.entropy[idx] = (estimate + gain).clamp(0.0, 1.0);
        }

        let viability = viability_score(inflow, cells.total_entropy(idx), pool, config);
        cells.viability[idx] = viability;

        // Activation is one-way
        if !cells.active[idx]
            && viability > config.activation_viability_threshold
            && budget > config.min_budget_to_propagate
        {
            cells.active[idx] = true;
            outcome.activations += 1;
        }

        budget = (budget - config.decay_loss).max(0.0);

        // Static attraction from active neighbors
        if viability <= 0.0 && budget > 0.0 && budget < config.attraction_cap {
            let active = if snapshot { &active_before[..] } else { &cells.active[..] };
            let bonus =
                config.attraction_per_neighbor * active_neighbor_count(topology, active, idx) as f32;
            budget = (budget + bonus).min(config.attraction_cap);
        }

        cells.local_budget[idx] = budget;

        // Nothing reads the streak yet
        if budget == 0.0 && inflow == 0.0 {
            cells.zero_budget_ticks[idx] = cells.zero_budget_ticks[idx].saturating_add(1);
        } else {
            cells.zero_budget_ticks[idx] = 0;
        }
    }

    cells.estimates = estimates;
    cells.active_before = active_before;
    outcome
}

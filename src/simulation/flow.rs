//! Pass 1 - gather outflow into the `incoming` buffer
//!
//! Only viable, sufficiently funded cells push budget outward. Each one
//! sends `budget * propagate_fraction * neighbor_split_fraction` to every
//! open (non-vacuum, in-bounds) orthogonal neighbor. The split is per
//! neighbor, so total outflow grows with the number of open neighbors.
//!
//! The pass is written as a gather: each cell sums what its neighbors
//! send it. Every cell's sum is independent, so large grids use rayon.

use rayon::prelude::*;

use crate::core::config::GridConfig;
use crate::simulation::cell_state::CellState;
use crate::spatial::grid::GridTopology;

/// Whether a cell pushes budget this tick. Pass 2 evaluates the same
/// predicate against the same pre-pass values to decide what it spends.
#[inline]
pub fn outflow_eligible(budget: f32, viability: f32, config: &GridConfig) -> bool {
    budget > config.min_budget_to_propagate && viability > 0.0
}

/// Amount an eligible cell sends to each open neighbor
#[inline]
pub fn neighbor_portion(budget: f32, config: &GridConfig) -> f32 {
    let available = budget * config.propagate_fraction;
    available * config.neighbor_split_fraction
}

/// Rebuild `incoming` from scratch. Returns how many cells propagated.
pub fn gather_outflow(topology: &GridTopology, cells: &mut CellState, config: &GridConfig) -> usize {
    let budget = &cells.local_budget;
    let viability = &cells.viability;
    let vacuum = &cells.is_vacuum;

    let sends = |src: usize| -> f32 {
        if !vacuum[src] && outflow_eligible(budget[src], viability[src], config) {
            neighbor_portion(budget[src], config)
        } else {
            0.0
        }
    };

    let gather = |(idx, slot): (usize, &mut f32)| {
        *slot = if vacuum[idx] {
            0.0
        } else {
            topology.neighbors(idx).map(sends).sum()
        };
    };

    if cells.incoming.len() >= config.parallel_threshold {
        cells.incoming.par_iter_mut().enumerate().for_each(gather);
    } else {
        cells.incoming.iter_mut().enumerate().for_each(gather);
    }

    (0..cells.len())
        .filter(|&idx| !vacuum[idx] && outflow_eligible(budget[idx], viability[idx], config))
        .count()
}

/// Feed the persistent source: add `amount` to each seed cell's inflow
pub fn inject_seed_inflow(cells: &mut CellState, seed_cells: &[usize], amount: f32) {
    for &idx in seed_cells {
        if !cells.is_vacuum[idx] {
            cells.incoming[idx] += amount;
        }
    }
}

//! Read-side views and serialization
//!
//! Visualization hosts consume these after each tick: per-cell viability,
//! entropy, active and vacuum flags, plus aggregate field statistics.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellCoord, Tick};
use crate::simulation::cell_state::CellState;
use crate::simulation::world::FieldWorld;

/// Everything a renderer needs for one cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub x: usize,
    pub y: usize,
    pub viability: f32,
    pub entropy: f32,
    pub active: bool,
    pub is_vacuum: bool,
    pub local_budget: f32,
}

impl CellView {
    pub(crate) fn from_cells(cells: &CellState, coord: CellCoord, idx: usize) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            viability: cells.viability[idx],
            entropy: cells.total_entropy(idx),
            active: cells.active[idx],
            is_vacuum: cells.is_vacuum[idx],
            local_budget: cells.local_budget[idx],
        }
    }
}

/// Aggregate state of the whole field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub tick: Tick,
    pub active_cells: usize,
    pub vacuum_cells: usize,
    pub total_budget: f32,
    pub mean_entropy: f32,
    pub max_viability: f32,
    pub global_pool: f32,
}

impl FieldStats {
    pub fn from_world<R: Rng>(world: &FieldWorld<R>) -> Self {
        let cells = world.cells();
        Self {
            tick: world.current_tick,
            active_cells: cells.active_count(),
            vacuum_cells: cells.is_vacuum.iter().filter(|&&v| v).count(),
            total_budget: cells.total_budget(),
            mean_entropy: cells.mean_entropy(),
            max_viability: cells
                .viability
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max),
            global_pool: world.pool().current(),
        }
    }
}

/// Serializable snapshot of the full grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub width: usize,
    pub height: usize,
    pub global_pool_max: f32,
    pub stats: FieldStats,
    /// Row-major, `width * height` entries
    pub cells: Vec<CellView>,
}

impl FieldSnapshot {
    pub fn from_world<R: Rng>(world: &FieldWorld<R>) -> Self {
        let topology = world.topology();
        let cells = (0..topology.len())
            .filter_map(|idx| {
                topology
                    .coords(idx)
                    .map(|coord| CellView::from_cells(world.cells(), coord, idx))
            })
            .collect();

        Self {
            width: topology.width(),
            height: topology.height(),
            global_pool_max: world.pool().max(),
            stats: world.stats(),
            cells,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "Tick {} on {}x{}\n{} active, {} vacuum, total budget {:.2}, mean entropy {:.3}, pool {:.1}/{:.1}",
            self.stats.tick,
            self.width,
            self.height,
            self.stats.active_cells,
            self.stats.vacuum_cells,
            self.stats.total_budget,
            self.stats.mean_entropy,
            self.stats.global_pool,
            self.global_pool_max,
        )
    }
}

//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one discrete step)
pub type Tick = u64;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// How Pass 2 reads neighbor state while it sweeps the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Row-major sweep reading live neighbor values. Results depend on
    /// sweep order: later cells see budgets already updated this tick.
    #[default]
    InPlace,
    /// Neighbor reads come from a copy taken before the pass, so the
    /// result is independent of sweep order and the entropy estimate
    /// can run in parallel.
    Snapshot,
}

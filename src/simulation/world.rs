//! Grid world - owns topology, cell arrays, pool and RNG
//!
//! Construction allocates every per-cell array once, generates terrain
//! from the seeded RNG, then force-activates the seed region.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::GridConfig;
use crate::core::error::{FieldError, Result};
use crate::core::types::{CellCoord, Tick};
use crate::simulation::budget_pool::GlobalBudgetPool;
use crate::simulation::cell_state::CellState;
use crate::simulation::output::{CellView, FieldSnapshot, FieldStats};
use crate::simulation::tick::{run_simulation_tick, TickStats};
use crate::simulation::viability::viability_score;
use crate::spatial::grid::GridTopology;

/// Complete simulation state for one grid
#[derive(Debug, Clone)]
pub struct FieldWorld<R: Rng = ChaCha8Rng> {
    pub(crate) topology: GridTopology,
    pub(crate) cells: CellState,
    pub(crate) pool: GlobalBudgetPool,
    pub(crate) config: GridConfig,
    pub(crate) seed_cells: Vec<usize>,
    pub(crate) rng: R,
    pub current_tick: Tick,
}

impl FieldWorld<ChaCha8Rng> {
    /// Build a grid whose randomness comes from `config.random_seed`
    pub fn new(width: usize, height: usize, config: GridConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.random_seed);
        Self::with_rng(width, height, config, rng)
    }
}

impl<R: Rng> FieldWorld<R> {
    /// Build a grid drawing terrain and collapses from `rng`
    pub fn with_rng(width: usize, height: usize, config: GridConfig, rng: R) -> Result<Self> {
        let topology = GridTopology::new(width, height)?;
        config.validate()?;

        let seed_cells = match config.seed_region {
            Some(region) => {
                let center = region.center.unwrap_or_else(|| topology.center());
                if !topology.contains(center.x, center.y) {
                    return Err(FieldError::OutOfBounds {
                        x: center.x,
                        y: center.y,
                    });
                }
                topology.square(center, region.radius)
            }
            None => Vec::new(),
        };

        let pool = GlobalBudgetPool::new(
            config.global_pool_initial,
            config.global_pool_max,
            config.global_replenish_per_tick,
        );

        let mut world = Self {
            topology,
            cells: CellState::new(topology.len()),
            pool,
            config,
            seed_cells,
            rng,
            current_tick: 0,
        };

        world.generate_terrain();
        for idx in world.seed_cells.clone() {
            world.activate(idx, world.config.seed_initial_budget);
        }

        tracing::info!(
            width,
            height,
            seed_cells = world.seed_cells.len(),
            vacuum_cells = world.cells.is_vacuum.iter().filter(|&&v| v).count(),
            "Grid created"
        );

        Ok(world)
    }

    /// Vacuum terrain and entropy wells, drawn in index order
    fn generate_terrain(&mut self) {
        if self.config.vacuum_fraction > 0.0 {
            let mut is_seed = vec![false; self.cells.len()];
            for &idx in &self.seed_cells {
                is_seed[idx] = true;
            }
            for (idx, seed) in is_seed.into_iter().enumerate() {
                let roll: f32 = self.rng.gen();
                if roll < self.config.vacuum_fraction && !seed {
                    self.cells.is_vacuum[idx] = true;
                }
            }
        }

        // Wells live in the static terrain term so the passes never erase them
        for _ in 0..self.config.entropy_wells {
            let idx = self.rng.gen_range(0..self.cells.len());
            self.cells.base_entropy[idx] = self.config.entropy_well_strength;
        }
    }

    /// Force a cell alive with `budget`, scoring it as if the budget had
    /// just flowed in
    fn activate(&mut self, idx: usize, budget: f32) {
        let budget = budget.clamp(0.0, self.config.local_budget_max);
        self.cells.is_vacuum[idx] = false;
        self.cells.local_budget[idx] = budget;
        self.cells.active[idx] = true;
        self.cells.viability[idx] =
            viability_score(budget, self.cells.total_entropy(idx), &self.pool, &self.config);
    }

    /// Advance exactly one discrete step
    pub fn tick(&mut self) -> TickStats {
        run_simulation_tick(self)
    }

    /// Run `n` ticks, returning the stats of the last one
    pub fn run(&mut self, n: u32) -> Option<TickStats> {
        (0..n).map(|_| self.tick()).last()
    }

    // === SETUP ===

    /// Force-activate an extra source cell with `budget` (clamped to the cap)
    pub fn seed_cell(&mut self, x: usize, y: usize, budget: f32) -> Result<()> {
        let idx = self.topology.index(x, y)?;
        self.activate(idx, budget);
        Ok(())
    }

    /// Mark terrain before the run starts. The passes never change this flag.
    pub fn set_vacuum(&mut self, x: usize, y: usize, vacuum: bool) -> Result<()> {
        let idx = self.topology.index(x, y)?;
        self.cells.is_vacuum[idx] = vacuum;
        if vacuum {
            self.cells.local_budget[idx] = 0.0;
            self.cells.active[idx] = false;
            self.cells.viability[idx] = 0.0;
        }
        Ok(())
    }

    /// Pin a cell's entropy at `value` (clamped to `[0, 1]`)
    pub fn lock_entropy(&mut self, x: usize, y: usize, value: f32) -> Result<()> {
        let idx = self.topology.index(x, y)?;
        self.cells.entropy[idx] = value.clamp(0.0, 1.0);
        self.cells.entropy_locked[idx] = true;
        Ok(())
    }

    pub fn unlock_entropy(&mut self, x: usize, y: usize) -> Result<()> {
        let idx = self.topology.index(x, y)?;
        self.cells.entropy_locked[idx] = false;
        Ok(())
    }

    // === READ INTERFACE ===

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    pub fn width(&self) -> usize {
        self.topology.width()
    }

    pub fn height(&self) -> usize {
        self.topology.height()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cells(&self) -> &CellState {
        &self.cells
    }

    pub fn pool(&self) -> &GlobalBudgetPool {
        &self.pool
    }

    pub fn seed_cells(&self) -> &[usize] {
        &self.seed_cells
    }

    pub fn viability(&self, x: usize, y: usize) -> Result<f32> {
        Ok(self.cells.viability[self.topology.index(x, y)?])
    }

    /// Dynamic plus terrain entropy, as a renderer should show it
    pub fn entropy(&self, x: usize, y: usize) -> Result<f32> {
        Ok(self.cells.total_entropy(self.topology.index(x, y)?))
    }

    pub fn is_active(&self, x: usize, y: usize) -> Result<bool> {
        Ok(self.cells.active[self.topology.index(x, y)?])
    }

    pub fn is_vacuum(&self, x: usize, y: usize) -> Result<bool> {
        Ok(self.cells.is_vacuum[self.topology.index(x, y)?])
    }

    pub fn local_budget(&self, x: usize, y: usize) -> Result<f32> {
        Ok(self.cells.local_budget[self.topology.index(x, y)?])
    }

    /// Inflow the cell received in the most recent tick's Pass 1
    pub fn incoming(&self, x: usize, y: usize) -> Result<f32> {
        Ok(self.cells.incoming[self.topology.index(x, y)?])
    }

    pub fn cell_view(&self, x: usize, y: usize) -> Result<CellView> {
        let idx = self.topology.index(x, y)?;
        Ok(CellView::from_cells(&self.cells, CellCoord::new(x, y), idx))
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats::from_world(self)
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::from_world(self)
    }
}

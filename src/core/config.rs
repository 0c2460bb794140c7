//! Grid simulation configuration with documented constants
//!
//! Every tunable of the tick engine lives here. The values interact:
//! the viability threshold scales with pool scarcity, so pool size,
//! replenish rate and activation cost together set how fast the
//! propagation front can advance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FieldError, Result};
use crate::core::types::{CellCoord, SweepMode};

/// Square region that is force-activated at construction and fed every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedRegion {
    /// Center cell. `None` means the grid center (`width / 2`, `height / 2`).
    pub center: Option<CellCoord>,
    /// Chebyshev radius. 0 is a single cell, 1 is a 3x3 square.
    pub radius: usize,
}

impl Default for SeedRegion {
    fn default() -> Self {
        Self {
            center: None,
            radius: 1,
        }
    }
}

/// Configuration for the grid simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    // === GLOBAL POOL ===
    /// Capacity of the shared pool
    pub global_pool_max: f32,

    /// Pool level at construction
    pub global_pool_initial: f32,

    /// Amount added to the pool at the end of every tick (Pass 3)
    ///
    /// Together with `activation_cost` this bounds how many dormant cells
    /// can be woken per tick once the initial pool is spent.
    pub global_replenish_per_tick: f32,

    // === PERSISTENCE / VIABILITY ===
    /// Simulated budget a cell needs, for a given neighbor activation
    /// pattern, to count that pattern as persistent
    pub min_budget_for_persistence: f32,

    /// Base divisor of the viability score
    pub threshold_base: f32,

    /// How strongly pool scarcity raises the threshold
    ///
    /// At 2.0, an empty pool triples the effective threshold.
    pub scarcity_gain: f32,

    /// Energy loss per unit of entropy in the viability score
    pub entropy_penalty: f32,

    /// Baseline loss per tick, both in the viability score and as budget decay
    pub decay_loss: f32,

    /// Viability a cell must exceed to become active
    pub activation_viability_threshold: f32,

    /// Floor on the effective threshold so the viability division is total
    pub viability_epsilon: f32,

    // === FLOW ===
    /// Fraction of local budget a viable cell pushes out each tick
    pub propagate_fraction: f32,

    /// Share of the pushed budget sent to each open neighbor
    ///
    /// Applied per neighbor, not divided by neighbor count. At 0.25 an
    /// interior cell sends exactly what it spends; edge cells send less.
    pub neighbor_split_fraction: f32,

    /// Budget a cell must exceed to propagate or activate
    pub min_budget_to_propagate: f32,

    /// Pool draw paid the first tick a dormant cell receives inflow
    pub activation_cost: f32,

    /// Upper bound on any cell's local budget
    pub local_budget_max: f32,

    // === ENTROPY ===
    /// Entropy added on top of the estimate when a cell carried flow this tick
    pub entropy_gain_per_use: f32,

    /// Laplacian coefficient of the diffusion stencil
    ///
    /// Must stay at or below 0.25 for the explicit 5-point stencil to be stable.
    pub entropy_diffuse_rate: f32,

    /// Entropy removed from every cell per tick after diffusion
    pub entropy_decay: f32,

    /// Per-cell per-tick chance of catastrophic collapse
    pub collapse_probability: f32,

    // === STATIC ATTRACTION ===
    /// Budget granted to a non-viable cell per active neighbor
    pub attraction_per_neighbor: f32,

    /// Attraction never lifts a cell's budget above this
    pub attraction_cap: f32,

    // === SEEDING ===
    /// Persistent source. `None` disables seeding entirely.
    pub seed_region: Option<SeedRegion>,

    /// Budget placed in each seed cell at construction
    pub seed_initial_budget: f32,

    /// Inflow injected into each seed cell every tick
    pub seed_inflow_per_tick: f32,

    // === TERRAIN ===
    /// Fraction of cells marked vacuum at construction (seed region excluded)
    pub vacuum_fraction: f32,

    /// Number of random high-entropy cells placed at construction
    pub entropy_wells: usize,

    /// Entropy value written into each well
    pub entropy_well_strength: f32,

    // === SCHEDULING ===
    /// Host cadence used by the scheduler
    pub ticks_per_second: f32,

    /// Most ticks one scheduler `advance` call may run before dropping time
    pub max_catch_up_ticks: u32,

    /// RNG seed for terrain generation and collapse draws
    pub random_seed: u64,

    /// Pass 2 neighbor read strategy
    pub sweep_mode: SweepMode,

    // === PARALLELIZATION ===
    /// Minimum cell count before stencil passes use rayon
    pub parallel_threshold: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            // Pool
            global_pool_max: 1000.0,
            global_pool_initial: 1000.0,
            global_replenish_per_tick: 5.0,

            // Viability
            min_budget_for_persistence: 1.0,
            threshold_base: 1.0,
            scarcity_gain: 2.0,
            entropy_penalty: 0.5,
            decay_loss: 0.01,
            activation_viability_threshold: 0.1,
            viability_epsilon: 1e-6,

            // Flow
            propagate_fraction: 0.1,
            neighbor_split_fraction: 0.25,
            min_budget_to_propagate: 0.05,
            activation_cost: 1.0,
            local_budget_max: 100.0,

            // Entropy
            entropy_gain_per_use: 0.01,
            entropy_diffuse_rate: 0.1,
            entropy_decay: 0.001,
            collapse_probability: 0.01,

            // Attraction
            attraction_per_neighbor: 0.05,
            attraction_cap: 0.5,

            // Seeding
            seed_region: Some(SeedRegion::default()),
            seed_initial_budget: 50.0,
            seed_inflow_per_tick: 0.5,

            // Terrain
            vacuum_fraction: 0.0,
            entropy_wells: 0,
            entropy_well_strength: 1.0,

            // Scheduling
            ticks_per_second: 30.0,
            max_catch_up_ticks: 5,
            random_seed: 12345,
            sweep_mode: SweepMode::InPlace,

            parallel_threshold: 4096,
        }
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FieldError::config(
            field,
            format!("{} must be finite and >= 0", value),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FieldError::config(
            field,
            format!("{} must be finite and > 0", value),
        ));
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FieldError::config(
            field,
            format!("{} must be within [0, 1]", value),
        ));
    }
    Ok(())
}

impl GridConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML. Missing keys take their default.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Range-check every option
    pub fn validate(&self) -> Result<()> {
        check_positive("global_pool_max", self.global_pool_max)?;
        check_non_negative("global_pool_initial", self.global_pool_initial)?;
        if self.global_pool_initial > self.global_pool_max {
            return Err(FieldError::config(
                "global_pool_initial",
                format!(
                    "{} exceeds global_pool_max ({})",
                    self.global_pool_initial, self.global_pool_max
                ),
            ));
        }
        check_non_negative("global_replenish_per_tick", self.global_replenish_per_tick)?;

        check_non_negative("min_budget_for_persistence", self.min_budget_for_persistence)?;
        check_non_negative("threshold_base", self.threshold_base)?;
        check_non_negative("scarcity_gain", self.scarcity_gain)?;
        check_non_negative("entropy_penalty", self.entropy_penalty)?;
        check_non_negative("decay_loss", self.decay_loss)?;
        if !self.activation_viability_threshold.is_finite() {
            return Err(FieldError::config(
                "activation_viability_threshold",
                "must be finite",
            ));
        }
        check_positive("viability_epsilon", self.viability_epsilon)?;

        check_unit("propagate_fraction", self.propagate_fraction)?;
        check_unit("neighbor_split_fraction", self.neighbor_split_fraction)?;
        check_non_negative("min_budget_to_propagate", self.min_budget_to_propagate)?;
        check_non_negative("activation_cost", self.activation_cost)?;
        check_positive("local_budget_max", self.local_budget_max)?;

        check_unit("entropy_gain_per_use", self.entropy_gain_per_use)?;
        if !(0.0..=0.25).contains(&self.entropy_diffuse_rate) {
            return Err(FieldError::config(
                "entropy_diffuse_rate",
                format!(
                    "{} must be within [0, 0.25] for a stable stencil",
                    self.entropy_diffuse_rate
                ),
            ));
        }
        check_unit("entropy_decay", self.entropy_decay)?;
        check_unit("collapse_probability", self.collapse_probability)?;

        check_non_negative("attraction_per_neighbor", self.attraction_per_neighbor)?;
        check_non_negative("attraction_cap", self.attraction_cap)?;

        check_non_negative("seed_initial_budget", self.seed_initial_budget)?;
        if self.seed_initial_budget > self.local_budget_max {
            return Err(FieldError::config(
                "seed_initial_budget",
                format!(
                    "{} exceeds local_budget_max ({})",
                    self.seed_initial_budget, self.local_budget_max
                ),
            ));
        }
        check_non_negative("seed_inflow_per_tick", self.seed_inflow_per_tick)?;

        check_unit("vacuum_fraction", self.vacuum_fraction)?;
        check_unit("entropy_well_strength", self.entropy_well_strength)?;

        check_positive("ticks_per_second", self.ticks_per_second)?;
        if self.max_catch_up_ticks == 0 {
            return Err(FieldError::config(
                "max_catch_up_ticks",
                "must be at least 1 or a playing scheduler never ticks",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GridConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let config = GridConfig {
            decay_loss: -0.1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            FieldError::InvalidConfig {
                field: "decay_loss",
                ..
            }
        ));
    }

    #[test]
    fn test_initial_pool_above_max_rejected() {
        let config = GridConfig {
            global_pool_max: 100.0,
            global_pool_initial: 150.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unstable_diffusion_rate_rejected() {
        let config = GridConfig {
            entropy_diffuse_rate: 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let config = GridConfig {
            collapse_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_catch_up_rejected() {
        let config = GridConfig {
            max_catch_up_ticks: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FieldError::InvalidConfig { field: "max_catch_up_ticks", .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let config = GridConfig {
            scarcity_gain: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_override() {
        let toml_str = r#"
            propagate_fraction = 0.2
            random_seed = 7
            sweep_mode = "snapshot"

            [seed_region]
            radius = 0
            center = { x = 3, y = 4 }
        "#;
        let config = GridConfig::from_toml_str(toml_str).unwrap();
        assert!((config.propagate_fraction - 0.2).abs() < 1e-6);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.sweep_mode, SweepMode::Snapshot);
        let region = config.seed_region.unwrap();
        assert_eq!(region.radius, 0);
        assert_eq!(region.center, Some(CellCoord::new(3, 4)));
        // Untouched keys keep defaults
        assert!((config.decay_loss - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = GridConfig::from_toml_str(include_str!("../../config/default.toml")).unwrap();
        let defaults = GridConfig::default();
        assert_eq!(config.random_seed, defaults.random_seed);
        assert_eq!(config.seed_region, defaults.seed_region);
        assert_eq!(config.sweep_mode, defaults.sweep_mode);
        assert!((config.propagate_fraction - defaults.propagate_fraction).abs() < 1e-6);
        assert!((config.global_pool_max - defaults.global_pool_max).abs() < 1e-3);
    }

    #[test]
    fn test_toml_invalid_value_rejected() {
        let result = GridConfig::from_toml_str("entropy_decay = -1.0");
        assert!(matches!(result, Err(FieldError::InvalidConfig { .. })));
    }

    #[test]
    fn test_toml_syntax_error() {
        let result = GridConfig::from_toml_str("propagate_fraction = ");
        assert!(matches!(result, Err(FieldError::TomlError(_))));
    }
}

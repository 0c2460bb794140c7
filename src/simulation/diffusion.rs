//! Pass 4 - entropy diffusion and relaxation
//!
//! 5-point Laplacian over the entropy field with a zero-flux boundary: an
//! out-of-bounds neighbor reads as the cell's own value. Reads come from
//! `entropy`, writes go to `entropy_next`, and the two are swapped once
//! every cell is done. An in-place stencil would read half-updated
//! neighbors.

use rayon::prelude::*;

use crate::core::config::GridConfig;
use crate::simulation::cell_state::CellState;
use crate::spatial::grid::GridTopology;

/// `N + S + W + E - 4C` with missing neighbors replaced by `C`
///
/// Summed as per-neighbor differences so a flat field gives exactly zero.
#[inline]
pub fn laplacian(topology: &GridTopology, field: &[f32], idx: usize) -> f32 {
    let center = field[idx];
    topology
        .neighbor_slots(idx)
        .iter()
        .map(|slot| slot.map_or(0.0, |n| field[n] - center))
        .sum()
}

/// One diffusion + decay step for a single cell
#[inline]
pub fn diffuse_cell(topology: &GridTopology, field: &[f32], idx: usize, config: &GridConfig) -> f32 {
    let diffused = field[idx] + config.entropy_diffuse_rate * laplacian(topology, field, idx);
    (diffused - config.entropy_decay).clamp(0.0, 1.0)
}

/// Run Pass 4 and commit the result into `cells.entropy`
pub fn diffuse_entropy(topology: &GridTopology, cells: &mut CellState, config: &GridConfig) {
    let field = &cells.entropy;
    let locked = &cells.entropy_locked;

    let step = |(idx, slot): (usize, &mut f32)| {
        *slot = if locked[idx] {
            field[idx]
        } else {
            diffuse_cell(topology, field, idx, config)
        };
    };

    if cells.entropy_next.len() >= config.parallel_threshold {
        cells.entropy_next.par_iter_mut().enumerate().for_each(step);
    } else {
        cells.entropy_next.iter_mut().enumerate().for_each(step);
    }

    std::mem::swap(&mut cells.entropy, &mut cells.entropy_next);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_decay() -> GridConfig {
        GridConfig {
            entropy_decay: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_field_has_zero_laplacian() {
        let topo = GridTopology::new(5, 4).unwrap();
        let field = vec![0.6; topo.len()];
        for idx in 0..topo.len() {
            assert_eq!(laplacian(&topo, &field, idx), 0.0);
        }
    }

    #[test]
    fn test_uniform_field_stays_uniform_without_decay() {
        let topo = GridTopology::new(6, 6).unwrap();
        let mut cells = CellState::new(topo.len());
        cells.entropy = vec![0.5; topo.len()];

        diffuse_entropy(&topo, &mut cells, &no_decay());
        assert!(cells.entropy.iter().all(|&e| e == 0.5));
    }

    #[test]
    fn test_uniform_field_decays_monotonically() {
        let topo = GridTopology::new(4, 4).unwrap();
        let mut cells = CellState::new(topo.len());
        cells.entropy = vec![0.5; topo.len()];
        let config = GridConfig::default();

        let mut previous = 0.5;
        for _ in 0..600 {
            diffuse_entropy(&topo, &mut cells, &config);
            let first = cells.entropy[0];
            assert!(cells.entropy.iter().all(|&e| e == first));
            assert!(first <= previous);
            previous = first;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_spike_spreads_to_orthogonal_neighbors() {
        let topo = GridTopology::new(3, 3).unwrap();
        let mut cells = CellState::new(topo.len());
        let center = topo.index(1, 1).unwrap();
        cells.entropy[center] = 1.0;
        let config = no_decay();

        diffuse_entropy(&topo, &mut cells, &config);

        let rate = config.entropy_diffuse_rate;
        assert!((cells.entropy[center] - (1.0 - 4.0 * rate)).abs() < 1e-6);
        for n in topo.neighbors(center) {
            assert!((cells.entropy[n] - rate).abs() < 1e-6);
        }
        assert_eq!(cells.entropy[topo.index(0, 0).unwrap()], 0.0);
    }

    #[test]
    fn test_zero_flux_boundary_conserves_mass() {
        let topo = GridTopology::new(4, 3).unwrap();
        let mut cells = CellState::new(topo.len());
        cells.entropy[0] = 0.8;
        cells.entropy[5] = 0.4;
        let before: f32 = cells.entropy.iter().sum();

        diffuse_entropy(&topo, &mut cells, &no_decay());
        let after: f32 = cells.entropy.iter().sum();
        assert!((before - after).abs() < 1e-5);
    }

    #[test]
    fn test_double_buffered_is_symmetric() {
        // A single-buffer sweep would bias values toward the sweep direction
        let topo = GridTopology::new(5, 1).unwrap();
        let mut cells = CellState::new(topo.len());
        cells.entropy[2] = 1.0;

        diffuse_entropy(&topo, &mut cells, &no_decay());
        assert_eq!(cells.entropy[1], cells.entropy[3]);
        assert_eq!(cells.entropy[0], cells.entropy[4]);
    }

    #[test]
    fn test_locked_cells_hold_value() {
        let topo = GridTopology::new(3, 1).unwrap();
        let mut cells = CellState::new(topo.len());
        cells.entropy[1] = 0.9;
        cells.entropy_locked[1] = true;

        diffuse_entropy(&topo, &mut cells, &GridConfig::default());
        assert_eq!(cells.entropy[1], 0.9);
        // Locked cells still feed their neighbors
        assert!(cells.entropy[0] > 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let topo = GridTopology::new(20, 20).unwrap();
        let mut cells = CellState::new(topo.len());
        for idx in 0..topo.len() {
            cells.entropy[idx] = ((idx * 37) % 100) as f32 / 100.0;
        }
        let mut parallel = cells.clone();
        let seq_config = GridConfig::default();
        let par_config = GridConfig {
            parallel_threshold: 1,
            ..Default::default()
        };

        diffuse_entropy(&topo, &mut cells, &seq_config);
        diffuse_entropy(&topo, &mut parallel, &par_config);
        assert_eq!(cells.entropy, parallel.entropy);
    }
}

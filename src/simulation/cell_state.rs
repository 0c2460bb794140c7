//! Per-cell state as parallel arrays (struct of arrays)
//!
//! Every vector has length `width * height` and is allocated once when the
//! grid is built. Cells are never added or removed; an exhausted cell just
//! sits at zero budget.

/// Struct-of-arrays storage for all cells
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    /// Local resource, always within `[0, local_budget_max]`
    pub local_budget: Vec<f32>,
    /// Inhibitory field, always within `[0, 1]`
    pub entropy: Vec<f32>,
    /// Static terrain entropy (wells) added on top of `entropy` when scoring
    /// viability. No pass ever writes it.
    pub base_entropy: Vec<f32>,
    /// Recomputed every tick in Pass 2; unbounded sign
    pub viability: Vec<f32>,
    /// Set once viability and budget clear their thresholds; never cleared
    pub active: Vec<bool>,
    /// Terrain flag fixed at construction; vacuum cells take no part in flow
    pub is_vacuum: Vec<bool>,
    /// Locked cells keep their entropy value through every pass
    pub entropy_locked: Vec<bool>,
    /// Consecutive ticks with neither budget nor inflow
    ///
    /// Tracked for a vacuum-promotion rule; nothing reads it yet.
    pub zero_budget_ticks: Vec<u32>,

    /// Pass 1 output, consumed by Pass 2 of the same tick
    pub(crate) incoming: Vec<f32>,
    /// Pass 4 write buffer, swapped into `entropy` on commit
    pub(crate) entropy_next: Vec<f32>,
    /// Snapshot-mode entropy estimates, rebuilt each Pass 2
    pub(crate) estimates: Vec<f32>,
    /// Snapshot-mode copy of `active` taken before Pass 2
    pub(crate) active_before: Vec<bool>,
}

impl CellState {
    pub fn new(len: usize) -> Self {
        Self {
            local_budget: vec![0.0; len],
            entropy: vec![0.0; len],
            base_entropy: vec![0.0; len],
            viability: vec![0.0; len],
            active: vec![false; len],
            is_vacuum: vec![false; len],
            entropy_locked: vec![false; len],
            zero_budget_ticks: vec![0; len],
            incoming: vec![0.0; len],
            entropy_next: vec![0.0; len],
            estimates: vec![0.0; len],
            active_before: vec![false; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.local_budget.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.local_budget.is_empty()
    }

    /// Inflow gathered for each cell by the most recent Pass 1
    pub fn incoming(&self) -> &[f32] {
        &self.incoming
    }

    /// Dynamic plus terrain entropy, clamped to `[0, 1]`
    #[inline]
    pub fn total_entropy(&self, idx: usize) -> f32 {
        (self.entropy[idx] + self.base_entropy[idx]).min(1.0)
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn total_budget(&self) -> f32 {
        self.local_budget.iter().sum()
    }

    pub fn mean_entropy(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (0..self.len()).map(|idx| self.total_entropy(idx)).sum::<f32>() / self.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrays_share_length() {
        let cells = CellState::new(12);
        assert_eq!(cells.len(), 12);
        assert_eq!(cells.entropy.len(), 12);
        assert_eq!(cells.viability.len(), 12);
        assert_eq!(cells.active.len(), 12);
        assert_eq!(cells.is_vacuum.len(), 12);
        assert_eq!(cells.zero_budget_ticks.len(), 12);
        assert_eq!(cells.incoming().len(), 12);
        assert_eq!(cells.entropy_next.len(), 12);
        assert_eq!(cells.base_entropy.len(), 12);
        assert_eq!(cells.estimates.len(), 12);
        assert_eq!(cells.active_before.len(), 12);
    }

    #[test]
    fn test_starts_empty_and_dormant() {
        let cells = CellState::new(4);
        assert_eq!(cells.active_count(), 0);
        assert_eq!(cells.total_budget(), 0.0);
        assert_eq!(cells.mean_entropy(), 0.0);
        assert!(cells.is_vacuum.iter().all(|&v| !v));
    }

    #[test]
    fn test_total_entropy_adds_terrain_and_clamps() {
        let mut cells = CellState::new(2);
        cells.entropy = vec![0.2, 0.7];
        cells.base_entropy = vec![0.3, 0.6];
        assert!((cells.total_entropy(0) - 0.5).abs() < 1e-6);
        assert_eq!(cells.total_entropy(1), 1.0);
    }
}

//! Shared global budget pool
//!
//! A single bounded scalar. Pass 2 draws from it when a dormant cell is
//! kicked alive; Pass 3 refills it at the end of every tick.

use serde::{Deserialize, Serialize};

/// Shared resource contended by all cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalBudgetPool {
    current: f32,
    max: f32,
    replenish_per_tick: f32,
}

impl GlobalBudgetPool {
    /// `initial` is clamped into `[0, max]`
    pub fn new(initial: f32, max: f32, replenish_per_tick: f32) -> Self {
        Self {
            current: initial.clamp(0.0, max),
            max,
            replenish_per_tick,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// `1 - current / max`: 0 when full, 1 when empty
    #[inline]
    pub fn scarcity(&self) -> f32 {
        1.0 - self.current / self.max
    }

    /// Draw up to `amount`, returns the amount actually drawn
    pub fn draw(&mut self, amount: f32) -> f32 {
        let drawn = amount.max(0.0).min(self.current);
        self.current -= drawn;
        drawn
    }

    /// Pass 3: add one tick's replenishment, clamped at `max`
    pub fn recharge(&mut self) {
        self.current = (self.current + self.replenish_per_tick).min(self.max);
    }
}

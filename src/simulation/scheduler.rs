//! Host-driven tick cadence with play / pause / step controls
//!
//! The engine never drives itself. A host (frame loop, timer, test) hands
//! the scheduler elapsed wall time and it runs however many whole ticks
//! that time covers at `ticks_per_second`.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::tick::TickStats;
use crate::simulation::world::FieldWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Playing,
    Paused,
}

/// Owns a world and decides when it ticks
#[derive(Debug)]
pub struct TickScheduler<R: Rng = ChaCha8Rng> {
    world: FieldWorld<R>,
    state: RunState,
    tick_interval_nanos: u128,
    accumulated_nanos: u128,
}

impl<R: Rng> TickScheduler<R> {
    /// Starts playing, like a frame loop that ticks from its first update
    pub fn new(world: FieldWorld<R>) -> Self {
        let tick_interval_nanos =
            ((1.0e9 / f64::from(world.config().ticks_per_second)).round() as u128).max(1);
        Self {
            world,
            state: RunState::Playing,
            tick_interval_nanos,
            accumulated_nanos: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RunState::Playing
    }

    pub fn play(&mut self) {
        self.state = RunState::Playing;
    }

    /// Stop ticking and discard any partial tick of accumulated time
    pub fn pause(&mut self) {
        self.state = RunState::Paused;
        self.accumulated_nanos = 0;
    }

    pub fn toggle(&mut self) {
        match self.state {
            RunState::Playing => self.pause(),
            RunState::Paused => self.play(),
        }
    }

    /// Run exactly one tick regardless of state. The state is unchanged.
    pub fn step(&mut self) -> TickStats {
        self.world.tick()
    }

    /// Feed elapsed wall time; returns the stats of every tick it ran
    ///
    /// At most `max_catch_up_ticks` run per call. Time beyond that is dropped
    /// rather than carried into the next call.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TickStats> {
        if self.state == RunState::Paused {
            return Vec::new();
        }

        self.accumulated_nanos += elapsed.as_nanos();
        let due = self.accumulated_nanos / self.tick_interval_nanos;
        let limit = u128::from(self.world.config().max_catch_up_ticks);
        let to_run = due.min(limit);

        let ran: Vec<TickStats> = (0..to_run).map(|_| self.world.tick()).collect();

        if due > limit {
            tracing::warn!(
                due = due as u64,
                ran = to_run as u64,
                "Tick scheduler falling behind, dropping time"
            );
            self.accumulated_nanos = 0;
        } else {
            self.accumulated_nanos -= to_run * self.tick_interval_nanos;
        }

        ran
    }

    pub fn world(&self) -> &FieldWorld<R> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut FieldWorld<R> {
        &mut self.world
    }

    pub fn into_world(self) -> FieldWorld<R> {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GridConfig;

    fn scheduler(ticks_per_second: f32, max_catch_up_ticks: u32) -> TickScheduler {
        let config = GridConfig {
            ticks_per_second,
            max_catch_up_ticks,
            ..Default::default()
        };
        TickScheduler::new(FieldWorld::new(5, 5, config).unwrap())
    }

    #[test]
    fn test_starts_playing() {
        let sched = scheduler(10.0, 20);
        assert!(sched.is_playing());
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let mut sched = scheduler(10.0, 20);
        assert_eq!(sched.advance(Duration::from_millis(250)).len(), 2);
        // Remaining 50ms carries over
        assert_eq!(sched.advance(Duration::from_millis(50)).len(), 1);
        assert_eq!(sched.world().current_tick, 3);
    }

    #[test]
    fn test_one_second_at_thirty_hz() {
        let mut sched = scheduler(30.0, 100);
        assert_eq!(sched.advance(Duration::from_secs(1)).len(), 30);
    }

    #[test]
    fn test_paused_discards_time() {
        let mut sched = scheduler(10.0, 20);
        sched.pause();
        assert!(sched.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(sched.world().current_tick, 0);
        sched.play();
        assert!(sched.advance(Duration::from_millis(50)).is_empty());
    }

    #[test]
    fn test_step_while_paused() {
        let mut sched = scheduler(10.0, 20);
        sched.pause();
        let stats = sched.step();
        assert_eq!(stats.tick, 1);
        assert_eq!(sched.state(), RunState::Paused);
    }

    #[test]
    fn test_catch_up_clamped() {
        let mut sched = scheduler(10.0, 5);
        assert_eq!(sched.advance(Duration::from_secs(3)).len(), 5);
        // Excess was dropped, not banked
        assert!(sched.advance(Duration::from_millis(10)).is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut sched = scheduler(10.0, 20);
        sched.toggle();
        assert_eq!(sched.state(), RunState::Paused);
        sched.toggle();
        assert_eq!(sched.state(), RunState::Playing);
    }
}

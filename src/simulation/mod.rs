pub mod budget_pool;
pub mod cell_state;
pub mod diffusion;
pub mod flow;
pub mod output;
pub mod scheduler;
pub mod tick;
pub mod viability;
pub mod world;

pub use budget_pool::GlobalBudgetPool;
pub use cell_state::CellState;
pub use output::{CellView, FieldSnapshot, FieldStats};
pub use scheduler::{RunState, TickScheduler};
pub use tick::{run_simulation_tick, TickStats};
pub use viability::{entropy_estimate, viability_score, ViabilityOutcome};
pub use world::FieldWorld;

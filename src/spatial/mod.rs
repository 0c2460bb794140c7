//! Spatial indexing for the simulation grid

pub mod grid;

pub use grid::{Direction, GridTopology};

//! Negation Grid - discrete-time budget propagation over a 2D grid
//!
//! A bounded local budget diffuses between cells, gated by a viability
//! score that couples each cell to a shared global pool, while an entropy
//! field diffuses and decays underneath.

pub mod core;
pub mod simulation;
pub mod spatial;

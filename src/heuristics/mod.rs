//! Heuristics module for the symmetric TSP.
//!
//! This module exports the Ant Colony Optimization solver and its building blocks.

pub mod aco;
pub mod construction;
pub mod convergence;
pub mod pheromone;

pub use aco::*;
pub use construction::*;
pub use convergence::*;
pub use pheromone::*;

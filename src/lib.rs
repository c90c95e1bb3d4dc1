//! ACO TSP Solver Library
//!
//! An Ant Colony Optimization heuristic for the symmetric Traveling Salesman Problem.
//!
//! # Features
//!
//! - Euclidean instances from TSP-LIB or `x,y` CSV files
//! - Ant System with pheromone-guided probabilistic tour construction
//! - Seedable, reproducible runs with optional parallel tour construction
//! - Convergence trace and pheromone snapshot export for external plotting
//! - Multi-seed benchmarking
//!
//! # Example
//!
//! ```no_run
//! use aco_tsp_solver::instance::TSPInstance;
//! use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
//!
//! let instance = TSPInstance::from_file("instance.tsp").unwrap();
//! let config = ACOConfig { seed: Some(42), ..Default::default() };
//!
//! let mut aco = AntColonyOptimization::new(instance, config).unwrap();
//! let result = aco.run().unwrap();
//!
//! println!("Best distance: {:.2}", result.solution.cost);
//! println!("Convergence: {:?}", result.convergence.as_slice());
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod export;
pub mod benchmark;

pub use error::{AcoError, AcoResult};
pub use instance::{City, DistanceMatrix, TSPInstance};
pub use solution::Solution;

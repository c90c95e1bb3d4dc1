//! Pheromone trail matrix.

use crate::error::{AcoError, AcoResult};
use serde::{Deserialize, Serialize};

/// Lower bound applied after evaporation so trails never underflow to zero.
pub const PHEROMONE_FLOOR: f64 = f64::MIN_POSITIVE;

/// Directed trail strengths, one entry per ordered city pair.
///
/// Entries are strictly positive at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PheromoneMatrix {
    trails: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    /// Fill a `size` x `size` matrix with `initial_value`.
    pub fn new(size: usize, initial_value: f64) -> AcoResult<Self> {
        if !(initial_value.is_finite() && initial_value > 0.0) {
            return Err(AcoError::parameter(
                "initial_pheromone",
                format!("must be finite and > 0, got {}", initial_value),
            ));
        }

        Ok(PheromoneMatrix {
            trails: vec![vec![initial_value; size]; size],
        })
    }

    /// Multiply every entry by `1 - rate`.
    pub fn evaporate(&mut self, rate: f64) -> AcoResult<()> {
        if !(0.0..1.0).contains(&rate) {
            return Err(AcoError::parameter(
                "evaporation_rate",
                format!("must lie in [0, 1), got {}", rate),
            ));
        }

        let factor = 1.0 - rate;
        for row in self.trails.iter_mut() {
            for tau in row.iter_mut() {
                *tau = (*tau * factor).max(PHEROMONE_FLOOR);
            }
        }
        Ok(())
    }

    /// Add `amount` to the directed entry (from, to) only.
    ///
    /// Non-finite or negative amounts are ignored; the sum saturates at `f64::MAX`.
    #[inline]
    pub fn deposit(&mut self, from: usize, to: usize, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            let tau = &mut self.trails[from][to];
            *tau = (*tau + amount).min(f64::MAX);
        }
    }

    /// Deposit `amount` on every directed edge of a closed tour.
    pub fn deposit_tour(&mut self, tour: &[usize], amount: f64) {
        let n = tour.len();
        for i in 0..n {
            self.deposit(tour[i], tour[(i + 1) % n], amount);
        }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.trails[i][j]
    }

    pub fn size(&self) -> usize {
        self.trails.len()
    }

    /// Row-major view, e.g. for heat-map export
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.trails
    }

    /// Smallest entry of the matrix
    pub fn min_value(&self) -> f64 {
        self.trails
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest entry of the matrix
    pub fn max_value(&self) -> f64 {
        self.trails
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max)
    }
}

//! Probabilistic tour construction for a single ant.
//!
//! Starting from a given city, the ant repeatedly moves to an unvisited city `c`
//! chosen with probability proportional to
//!
//! ```text
//! tau(current, c)^alpha * (1 / d(current, c))^beta
//! ```
//!
//! until every city has been visited. Construction only reads the pheromone and
//! distance matrices, so any number of ants can build tours concurrently.

use crate::error::{AcoError, AcoResult};
use crate::heuristics::pheromone::PheromoneMatrix;
use crate::instance::DistanceMatrix;
use rand::prelude::*;

/// Desirability used for an edge between two cities at the same position.
pub const COINCIDENT_DESIRABILITY: f64 = 1e6;

/// Builds complete tours from pheromone and distance information
#[derive(Debug, Clone, Copy)]
pub struct TourConstructor {
    /// Pheromone importance
    pub alpha: f64,
    /// Distance importance
    pub beta: f64,
}

impl TourConstructor {
    pub fn new(alpha: f64, beta: f64) -> Self {
        TourConstructor { alpha, beta }
    }

    /// Inverse-distance attractiveness of an edge
    #[inline]
    pub fn desirability(distance: f64) -> f64 {
        if distance > 0.0 {
            1.0 / distance
        } else {
            COINCIDENT_DESIRABILITY
        }
    }

    /// Selection score of moving from `current` to `candidate`
    #[inline]
    pub fn score(
        &self,
        current: usize,
        candidate: usize,
        pheromones: &PheromoneMatrix,
        distances: &DistanceMatrix,
    ) -> f64 {
        let tau = pheromones.get(current, candidate).powf(self.alpha);
        let eta = Self::desirability(distances.distance(current, candidate)).powf(self.beta);
        tau * eta
    }

    /// Construct a complete tour starting at `start`.
    ///
    /// The returned tour is a permutation of `0..n`.
    pub fn construct<R: Rng + ?Sized>(
        &self,
        start: usize,
        pheromones: &PheromoneMatrix,
        distances: &DistanceMatrix,
        rng: &mut R,
    ) -> AcoResult<Vec<usize>> {
        let n = distances.len();
        if start >= n {
            return Err(AcoError::InvalidInput(format!(
                "start city {} out of range for {} cities",
                start, n
            )));
        }
        if pheromones.size() != n {
            return Err(AcoError::InvalidInput(format!(
                "pheromone matrix is {0}x{0} but there are {1} cities",
                pheromones.size(),
                n
            )));
        }

        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        tour.push(start);
        visited[start] = true;

        let mut current = start;
        while tour.len() < n {
            let next = self.select_next(current, &visited, pheromones, distances, rng)?;
            tour.push(next);
            visited[next] = true;
            current = next;
        }

        Ok(tour)
    }

    /// Pick the next city by roulette-wheel selection over the unvisited cities.
    fn select_next<R: Rng + ?Sized>(
        &self,
        current: usize,
        visited: &[bool],
        pheromones: &PheromoneMatrix,
        distances: &DistanceMatrix,
        rng: &mut R,
    ) -> AcoResult<usize> {
        let candidates: Vec<(usize, f64)> = visited
            .iter()
            .enumerate()
            .filter(|&(_, &seen)| !seen)
            .map(|(j, _)| (j, self.score(current, j, pheromones, distances)))
            .collect();

        if candidates.is_empty() {
            return Err(AcoError::InternalInvariantViolation(format!(
                "no unvisited city left after {} while the tour is incomplete",
                current
            )));
        }

        if candidates.iter().any(|&(_, p)| p.is_nan()) {
            return Self::pick_uniform(&candidates, rng);
        }

        let largest = candidates.iter().map(|&(_, p)| p).fold(0.0, f64::max);

        if largest == 0.0 {
            return Self::pick_uniform(&candidates, rng);
        }

        if largest.is_infinite() {
            let dominant: Vec<(usize, f64)> = candidates
                .iter()
                .copied()
                .filter(|&(_, p)| p.is_infinite())
                .collect();
            return Self::pick_uniform(&dominant, rng);
        }

        // Weights relative to the largest score lie in [0, 1], so their sum stays finite.
        let weights: Vec<(usize, f64)> = candidates
            .iter()
            .map(|&(j, p)| (j, p / largest))
            .collect();
        let total: f64 = weights.iter().map(|&(_, w)| w).sum();

        let mut pick = rng.gen::<f64>() * total;
        for &(j, weight) in &weights {
            pick -= weight;
            if pick <= 0.0 && weight > 0.0 {
                return Ok(j);
            }
        }

        // Rounding left a sliver; fall back to the last city with a positive weight.
        weights
            .iter()
            .rev()
            .find(|&&(_, w)| w > 0.0)
            .map(|&(j, _)| j)
            .ok_or_else(|| {
                AcoError::InternalInvariantViolation("positive total without positive score".to_string())
            })
    }

    fn pick_uniform<R: Rng + ?Sized>(candidates: &[(usize, f64)], rng: &mut R) -> AcoResult<usize> {
        candidates
            .choose(rng)
            .map(|&(j, _)| j)
            .ok_or_else(|| AcoError::InternalInvariantViolation("empty candidate pool".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TSPInstance;
    use crate::solution::is_permutation;
    use rand_chacha::ChaCha8Rng;

    fn instance(coords: Vec<(f64, f64)>) -> TSPInstance {
        TSPInstance::from_coords("test", coords).unwrap()
    }

    #[test]
    fn test_tour_is_permutation() {
        let inst = instance(vec![(0.0, 0.0), (5.0, 1.0), (2.0, 7.0), (9.0, 9.0), (4.0, 4.0), (8.0, 0.0)]);
        let pheromones = PheromoneMatrix::new(inst.dimension, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for start in 0..inst.dimension {
            let tour = constructor.construct(start, &pheromones, inst.distances(), &mut rng).unwrap();
            assert_eq!(tour[0], start);
            assert!(is_permutation(&tour, inst.dimension));
        }
    }

    #[test]
    fn test_start_out_of_range() {
        let inst = instance(vec![(0.0, 0.0), (1.0, 0.0)]);
        let pheromones = PheromoneMatrix::new(2, 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = TourConstructor::new(1.0, 1.0)
            .construct(2, &pheromones, inst.distances(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput(_)));
    }

    #[test]
    fn test_dominant_edge_is_followed() {
        // City 1 is next to city 0, city 2 is far away.
        let inst = instance(vec![(0.0, 0.0), (0.001, 0.0), (1000.0, 0.0)]);
        let pheromones = PheromoneMatrix::new(3, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..50 {
            let tour = constructor.construct(0, &pheromones, inst.distances(), &mut rng).unwrap();
            assert_eq!(tour, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_coincident_cities_do_not_break_selection() {
        let inst = instance(vec![(1.0, 1.0), (1.0, 1.0), (3.0, 1.0), (1.0, 1.0)]);
        let pheromones = PheromoneMatrix::new(4, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let score = constructor.score(0, 1, &pheromones, inst.distances());
        assert!(score.is_finite());

        for start in 0..4 {
            let tour = constructor.construct(start, &pheromones, inst.distances(), &mut rng).unwrap();
            assert!(is_permutation(&tour, 4));
        }
    }

    #[test]
    fn test_overflowing_scores_fall_back_to_uniform() {
        // (1e6)^400 overflows to infinity for every coincident neighbour.
        let inst = instance(vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (5.0, 5.0)]);
        let pheromones = PheromoneMatrix::new(4, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 400.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..20 {
            let tour = constructor.construct(0, &pheromones, inst.distances(), &mut rng).unwrap();
            assert!(is_permutation(&tour, 4));
            // the distant city is only reachable once the coincident ones are used up
            assert_eq!(tour[3], 3);
        }
    }

    #[test]
    fn test_overflowing_sum_keeps_roulette_proportions() {
        // Each near neighbour scores about 1e308; together they overflow, the far city scores 1.
        let inst = instance(vec![
            (0.0, 0.0),
            (1e-100, 0.0),
            (0.0, 1e-100),
            (-1e-100, 0.0),
            (1.0, 0.0),
        ]);
        let pheromones = PheromoneMatrix::new(5, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 3.08);

        let scores: Vec<f64> = (1..5)
            .map(|j| constructor.score(0, j, &pheromones, inst.distances()))
            .collect();
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores.iter().sum::<f64>().is_infinite());

        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..400 {
            let tour = constructor.construct(0, &pheromones, inst.distances(), &mut rng).unwrap();
            assert_ne!(tour[1], 4);
            assert_eq!(tour[4], 4);
        }
    }

    #[test]
    fn test_zero_scores_fall_back_to_uniform() {
        // With beta huge, 1/d^beta underflows to zero for every candidate.
        let inst = instance(vec![(0.0, 0.0), (1e6, 0.0), (0.0, 1e6), (1e6, 1e6)]);
        let pheromones = PheromoneMatrix::new(4, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 100.0);
        assert_eq!(constructor.score(0, 1, &pheromones, inst.distances()), 0.0);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seconds = std::collections::HashSet::new();
        for _ in 0..100 {
            let tour = constructor.construct(0, &pheromones, inst.distances(), &mut rng).unwrap();
            assert!(is_permutation(&tour, 4));
            seconds.insert(tour[1]);
        }
        assert_eq!(seconds.len(), 3);
    }

    #[test]
    fn test_same_seed_same_tour() {
        let inst = instance(vec![(0.0, 0.0), (3.0, 1.0), (1.0, 4.0), (6.0, 2.0), (2.0, 2.0)]);
        let pheromones = PheromoneMatrix::new(5, 1.0).unwrap();
        let constructor = TourConstructor::new(1.0, 2.0);

        let a = constructor
            .construct(0, &pheromones, inst.distances(), &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        let b = constructor
            .construct(0, &pheromones, inst.distances(), &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }
}

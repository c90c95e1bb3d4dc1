//! Ant Colony Optimization for the symmetric TSP.
//!
//! This module implements the classic Ant System: every iteration each ant
//! builds a full tour, the best tour is tracked, all trails evaporate and every
//! ant then deposits `q / length` on the directed edges it traversed.

use crate::error::{AcoError, AcoResult};
use crate::heuristics::construction::TourConstructor;
use crate::heuristics::convergence::ConvergenceTrace;
use crate::heuristics::pheromone::PheromoneMatrix;
use crate::instance::TSPInstance;
use crate::solution::{is_permutation, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// ACO configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ACOConfig {
    /// Number of ants
    pub num_ants: usize,
    /// Number of iterations
    pub max_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub evaporation_rate: f64,
    /// Initial pheromone level
    pub initial_pheromone: f64,
    /// Pheromone deposit factor
    pub q: f64,
    /// Random seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Build the ants' tours on the rayon thread pool
    pub parallel: bool,
    /// Optional wall-clock limit in seconds, checked between iterations
    pub time_limit: Option<f64>,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 20,
            max_iterations: 100,
            alpha: 1.0,
            beta: 5.0,
            evaporation_rate: 0.5,
            initial_pheromone: 1.0,
            q: 100.0,
            seed: None,
            parallel: false,
            time_limit: None,
        }
    }
}

impl ACOConfig {
    /// Check every parameter against its domain
    pub fn validate(&self) -> AcoResult<()> {
        if self.num_ants < 1 {
            return Err(AcoError::parameter("num_ants", "must be >= 1, got 0"));
        }
        if self.max_iterations < 1 {
            return Err(AcoError::parameter("max_iterations", "must be >= 1, got 0"));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(AcoError::parameter(
                "alpha",
                format!("must be finite and >= 0, got {}", self.alpha),
            ));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(AcoError::parameter(
                "beta",
                format!("must be finite and >= 0, got {}", self.beta),
            ));
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return Err(AcoError::parameter(
                "evaporation_rate",
                format!("must lie in [0, 1), got {}", self.evaporation_rate),
            ));
        }
        if !(self.initial_pheromone.is_finite() && self.initial_pheromone > 0.0) {
            return Err(AcoError::parameter(
                "initial_pheromone",
                format!("must be finite and > 0, got {}", self.initial_pheromone),
            ));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return Err(AcoError::parameter(
                "q",
                format!("pheromone deposit must be finite and > 0, got {}", self.q),
            ));
        }
        if let Some(limit) = self.time_limit {
            if !(limit > 0.0) {
                return Err(AcoError::parameter(
                    "time_limit",
                    format!("must be > 0 seconds, got {}", limit),
                ));
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ACOConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Lifecycle of one optimizer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColonyState {
    NotStarted,
    /// `iteration` is the last completed iteration (1-based)
    Running { iteration: usize },
    Finished,
}

/// A tour built by one ant and its cyclic length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntTour {
    pub tour: Vec<usize>,
    pub length: f64,
}

/// What happened during a single iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationSummary {
    /// 1-based iteration number
    pub iteration: usize,
    /// Every ant's tour, in ant order
    pub ants: Vec<AntTour>,
    /// Best distance known after this iteration
    pub best_distance: f64,
    /// Whether this iteration improved the best distance
    pub improved: bool,
}

/// Final outcome of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyResult {
    /// Best tour found and its length
    pub solution: Solution,
    /// Best distance after each executed iteration
    pub convergence: ConvergenceTrace,
    /// Snapshot of the trails at the end of the run
    pub pheromones: PheromoneMatrix,
    /// Number of iterations executed
    pub iterations: usize,
    /// True if the time limit ended the run before the iteration budget
    pub stopped_early: bool,
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization {
    config: ACOConfig,
    instance: TSPInstance,
    constructor: TourConstructor,
    pheromone: PheromoneMatrix,
    best: Solution,
    convergence: ConvergenceTrace,
    rng: ChaCha8Rng,
    state: ColonyState,
    started: Option<Instant>,
    stopped_early: bool,
}

impl AntColonyOptimization {
    /// Validate the configuration and set up the colony. No iteration runs here.
    pub fn new(instance: TSPInstance, config: ACOConfig) -> AcoResult<Self> {
        config.validate()?;

        let n = instance.dimension;
        if n < 2 {
            return Err(AcoError::InvalidInput(format!(
                "at least 2 cities are required, got {}",
                n
            )));
        }

        let pheromone = PheromoneMatrix::new(n, config.initial_pheromone)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut best = Solution::new();
        best.algorithm = "ACO".to_string();

        Ok(AntColonyOptimization {
            constructor: TourConstructor::new(config.alpha, config.beta),
            convergence: ConvergenceTrace::with_capacity(config.max_iterations),
            config,
            instance,
            pheromone,
            best,
            rng,
            state: ColonyState::NotStarted,
            started: None,
            stopped_early: false,
        })
    }

    /// Build one ant's tour from its own generator. Reads the matrices only.
    fn construct_ant(&self, ant_seed: u64) -> AcoResult<AntTour> {
        let mut rng = ChaCha8Rng::seed_from_u64(ant_seed);
        let start = rng.gen_range(0..self.instance.dimension);
        let tour = self
            .constructor
            .construct(start, &self.pheromone, self.instance.distances(), &mut rng)?;
        if !is_permutation(&tour, self.instance.dimension) {
            return Err(AcoError::InternalInvariantViolation(format!(
                "ant from {} built an incomplete tour {:?}",
                start, tour
            )));
        }
        let length = self.instance.tour_length(&tour);
        log::trace!("ant from {} built tour of length {:.4}", start, length);

        Ok(AntTour { tour, length })
    }

    /// Each ant constructs a solution
    fn construct_solutions(&mut self) -> AcoResult<Vec<AntTour>> {
        let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| self.rng.gen()).collect();
        let colony = &*self;

        if colony.config.parallel {
            seeds
                .into_par_iter()
                .map(|seed| colony.construct_ant(seed))
                .collect()
        } else {
            seeds
                .into_iter()
                .map(|seed| colony.construct_ant(seed))
                .collect()
        }
    }

    /// Replace the best solution with the first strictly shorter tour, if any.
    ///
    /// The very first tour is always kept, even if its length is not finite.
    fn update_best(&mut self, ants: &[AntTour]) -> bool {
        let mut improved = false;
        for ant in ants {
            if ant.length < self.best.cost || self.best.is_empty() {
                self.best.tour = ant.tour.clone();
                self.best.cost = ant.length;
                improved = true;
            }
        }
        improved
    }

    /// Evaporation followed by one deposit pass over all of this iteration's tours.
    fn global_pheromone_update(&mut self, ants: &[AntTour]) -> AcoResult<()> {
        self.pheromone.evaporate(self.config.evaporation_rate)?;

        for ant in ants {
            if ant.length > 0.0 && ant.length.is_finite() {
                self.pheromone.deposit_tour(&ant.tour, self.config.q / ant.length);
            } else {
                log::warn!(
                    "skipping deposit for tour of length {} (zero or not finite)",
                    ant.length
                );
            }
        }
        Ok(())
    }

    fn deadline_reached(&self) -> bool {
        match (self.config.time_limit, self.started) {
            (Some(limit), Some(start)) => start.elapsed().as_secs_f64() >= limit,
            _ => false,
        }
    }

    /// Run a single iteration. Returns `None` once the run is finished.
    pub fn step(&mut self) -> AcoResult<Option<IterationSummary>> {
        let iteration = match self.state {
            ColonyState::NotStarted => {
                self.started = Some(Instant::now());
                1
            }
            ColonyState::Running { iteration } => {
                if self.deadline_reached() {
                    log::warn!("time limit reached after {} iterations", iteration);
                    self.stopped_early = true;
                    self.state = ColonyState::Finished;
                    return Ok(None);
                }
                iteration + 1
            }
            ColonyState::Finished => return Ok(None),
        };

        let ants = self.construct_solutions()?;
        let improved = self.update_best(&ants);
        self.global_pheromone_update(&ants)?;
        self.convergence.append(self.best.cost);

        if improved {
            log::debug!("iteration {}: new best {:.4}", iteration, self.best.cost);
        }

        self.state = if iteration >= self.config.max_iterations {
            ColonyState::Finished
        } else {
            ColonyState::Running { iteration }
        };

        Ok(Some(IterationSummary {
            iteration,
            ants,
            best_distance: self.best.cost,
            improved,
        }))
    }

    /// Run ACO algorithm until the iteration budget (or time limit) is spent
    pub fn run(&mut self) -> AcoResult<ColonyResult> {
        log::info!(
            "ACO on {} (n={}): {} ants, {} iterations",
            self.instance.name,
            self.instance.dimension,
            self.config.num_ants,
            self.config.max_iterations
        );

        while self.step()?.is_some() {}

        let result = self.result();
        log::info!(
            "ACO finished after {} iterations: best {:.4}",
            result.iterations,
            result.solution.cost
        );
        Ok(result)
    }

    /// Snapshot of the current outcome
    pub fn result(&self) -> ColonyResult {
        let mut solution = self.best.clone();
        solution.computation_time = self
            .started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        solution.iterations = Some(self.convergence.len());

        ColonyResult {
            solution,
            convergence: self.convergence.clone(),
            pheromones: self.pheromone.clone(),
            iterations: self.convergence.len(),
            stopped_early: self.stopped_early,
        }
    }

    pub fn state(&self) -> ColonyState {
        self.state
    }

    pub fn best_tour(&self) -> &[usize] {
        &self.best.tour
    }

    pub fn best_distance(&self) -> f64 {
        self.best.cost
    }

    pub fn pheromones(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn convergence(&self) -> &ConvergenceTrace {
        &self.convergence
    }

    pub fn config(&self) -> &ACOConfig {
        &self.config
    }

    pub fn instance(&self) -> &TSPInstance {
        &self.instance
    }
}

//! Benchmarking and experimentation module.
//!
//! Runs the ACO solver over several seeds per instance, collects statistics
//! and exports them as CSV and a plain-text report.

use crate::error::AcoResult;
use crate::heuristics::aco::{ACOConfig, AntColonyOptimization};
use crate::instance::TSPInstance;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of a single seeded run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Seed of the run
    pub seed: u64,
    /// Best tour length found
    pub best_distance: f64,
    /// First iteration at which the best distance was reached
    pub best_iteration: Option<usize>,
    /// Iterations executed
    pub iterations: usize,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics for one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub instance: String,
    pub dimension: usize,
    pub num_runs: usize,
    pub mean_distance: f64,
    pub std_distance: f64,
    pub best_distance: f64,
    pub worst_distance: f64,
    pub mean_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeded runs per instance
    pub num_runs: usize,
    /// Seed of the first run; run `k` uses `base_seed + k`, wrapping at `u64::MAX`
    pub base_seed: u64,
    /// Solver parameters shared by every run (its seed is overridden)
    pub aco: ACOConfig,
    /// Run the seeds of an instance in parallel
    pub parallel: bool,
    /// Show a progress bar
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 0,
            aco: ACOConfig::default(),
            parallel: true,
            show_progress: false,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    fn run_once(&self, instance: &TSPInstance, seed: u64) -> AcoResult<RunResult> {
        let config = ACOConfig {
            seed: Some(seed),
            ..self.config.aco.clone()
        };

        let mut aco = AntColonyOptimization::new(instance.clone(), config)?;
        let result = aco.run()?;

        Ok(RunResult {
            instance: instance.name.clone(),
            dimension: instance.dimension,
            seed,
            best_distance: result.solution.cost,
            best_iteration: result.convergence.iteration_of_best(),
            iterations: result.iterations,
            time: result.solution.computation_time,
        })
    }

    /// Run every seed on one instance and record the results
    pub fn run_instance(&mut self, instance: &TSPInstance) -> AcoResult<()> {
        log::info!("Running benchmark on instance: {}", instance.name);

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(self.config.num_runs as u64);
            pb.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            pb.set_message(instance.name.clone());
            pb
        } else {
            ProgressBar::hidden()
        };

        let seeds: Vec<u64> = (0..self.config.num_runs as u64)
            .map(|k| self.config.base_seed.wrapping_add(k))
            .collect();

        let this = &*self;
        let runs: AcoResult<Vec<RunResult>> = if this.config.parallel {
            seeds
                .into_par_iter()
                .map(|seed| {
                    let run = this.run_once(instance, seed);
                    progress.inc(1);
                    run
                })
                .collect()
        } else {
            seeds
                .into_iter()
                .map(|seed| {
                    let run = this.run_once(instance, seed);
                    progress.inc(1);
                    run
                })
                .collect()
        };

        progress.finish_and_clear();
        self.results.extend(runs?);
        Ok(())
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[TSPInstance]) -> AcoResult<()> {
        for instance in instances {
            self.run_instance(instance)?;
        }
        Ok(())
    }

    /// Compute statistics for each instance, sorted by instance dimension then name
    pub fn compute_statistics(&self) -> Vec<RunStatistics> {
        let mut by_instance: BTreeMap<(usize, String), Vec<&RunResult>> = BTreeMap::new();

        for result in &self.results {
            by_instance
                .entry((result.dimension, result.instance.clone()))
                .or_default()
                .push(result);
        }

        by_instance
            .into_iter()
            .map(|((dimension, instance), runs)| {
                let distances: Vec<f64> = runs.iter().map(|r| r.best_distance).collect();
                let times: Vec<f64> = runs.iter().map(|r| r.time).collect();

                let std_distance = if distances.len() > 1 {
                    distances.iter().std_dev()
                } else {
                    0.0
                };
                let best_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
                let worst_distance = distances.iter().cloned().fold(0.0, f64::max);

                RunStatistics {
                    instance,
                    dimension,
                    num_runs: runs.len(),
                    mean_distance: distances.iter().mean(),
                    std_distance,
                    best_distance,
                    worst_distance,
                    mean_time: times.iter().mean(),
                }
            })
            .collect()
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("         ACO TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Ants: {} | Iterations: {} | alpha: {} | beta: {} | rho: {} | Q: {}\n\n",
            self.config.aco.num_ants,
            self.config.aco.max_iterations,
            self.config.aco.alpha,
            self.config.aco.beta,
            self.config.aco.evaporation_rate,
            self.config.aco.q
        ));

        report.push_str("-".repeat(86).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<25} {:>6} {:>6} {:>12} {:>10} {:>12} {:>10}\n",
            "Instance", "n", "Runs", "Mean", "Std", "Best", "Avg Time"
        ));
        report.push_str("-".repeat(86).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<25} {:>6} {:>6} {:>12.2} {:>10.2} {:>12.2} {:>10.4}\n",
                stat.instance,
                stat.dimension,
                stat.num_runs,
                stat.mean_distance,
                stat.std_distance,
                stat.best_distance,
                stat.mean_time
            ));
        }

        report.push_str("-".repeat(86).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

/// Helper function to load `.tsp` and `.csv` instances from a directory
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> AcoResult<Vec<TSPInstance>> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .map(|e| e == "tsp" || e == "csv")
            .unwrap_or(false);
        if !supported {
            continue;
        }

        match TSPInstance::from_file(&path) {
            Ok(instance) => instances.push(instance),
            Err(e) => log::warn!("Skipping {:?}: {}", path, e),
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension);

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(parallel: bool) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: 3,
            base_seed: 10,
            aco: ACOConfig {
                num_ants: 5,
                max_iterations: 10,
                ..Default::default()
            },
            parallel,
            show_progress: false,
        }
    }

    fn square() -> TSPInstance {
        TSPInstance::from_coords("square", vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
    }

    #[test]
    fn test_runs_are_recorded_per_seed() {
        let mut benchmark = Benchmark::new(small_config(false));
        benchmark.run_instance(&square()).unwrap();

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
        assert!(benchmark.results().iter().all(|r| r.iterations == 10));
    }

    #[test]
    fn test_seeds_wrap_past_u64_max() {
        let mut config = small_config(false);
        config.base_seed = u64::MAX;
        config.aco.max_iterations = 2;

        let mut benchmark = Benchmark::new(config);
        benchmark.run_instance(&square()).unwrap();

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![u64::MAX, 0, 1]);
    }

    #[test]
    fn test_parallel_runs_match_sequential() {
        let mut sequential = Benchmark::new(small_config(false));
        let mut parallel = Benchmark::new(small_config(true));
        sequential.run_instance(&square()).unwrap();
        parallel.run_instance(&square()).unwrap();

        let a: Vec<f64> = sequential.results().iter().map(|r| r.best_distance).collect();
        let b: Vec<f64> = parallel.results().iter().map(|r| r.best_distance).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_statistics() {
        let mut benchmark = Benchmark::new(small_config(false));
        benchmark.run_instance(&square()).unwrap();

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].num_runs, 3);
        assert!((stats[0].best_distance - 4.0).abs() < 1e-9);
        assert!(stats[0].worst_distance >= stats[0].best_distance);
        assert!(stats[0].mean_distance >= stats[0].best_distance);

        let report = benchmark.generate_report();
        assert!(report.contains("square"));
    }

    #[test]
    fn test_export_and_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.csv"), "0,0\n3,0\n3,4\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let instances = load_instances_from_dir(dir.path()).unwrap();
        assert_eq!(instances.len(), 1);

        let mut benchmark = Benchmark::new(small_config(false));
        benchmark.run_on_instances(&instances).unwrap();

        let results_path = dir.path().join("results.csv");
        let stats_path = dir.path().join("statistics.csv");
        benchmark.export_to_csv(&results_path).unwrap();
        benchmark.export_statistics_csv(&stats_path).unwrap();

        let results = std::fs::read_to_string(results_path).unwrap();
        assert_eq!(results.lines().count(), 4);
        assert!(results.starts_with("instance,dimension,seed"));
        let stats = std::fs::read_to_string(stats_path).unwrap();
        assert!(stats.contains("tri,3,3,12"));
    }
}

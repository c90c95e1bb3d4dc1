//! ACO TSP Solver - Command Line Interface
//!
//! Solves symmetric TSP instances with Ant Colony Optimization.

use aco_tsp_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use aco_tsp_solver::error::AcoResult;
use aco_tsp_solver::export::{write_convergence_csv, write_pheromone_csv, write_result_json};
use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
use aco_tsp_solver::instance::TSPInstance;
use clap::{Args, Parser, Subcommand};

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "aco-tsp-solver")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization for the symmetric Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Solver parameters; each flag overrides the value from `--config`
#[derive(Args, Debug, Default)]
struct AcoArgs {
    /// JSON file with an ACO configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ants per iteration
    #[arg(long)]
    ants: Option<usize>,

    /// Number of iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Distance importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate in [0, 1)
    #[arg(long)]
    evaporation: Option<f64>,

    /// Pheromone deposit factor Q
    #[arg(long)]
    deposit: Option<f64>,

    /// Initial pheromone level
    #[arg(long)]
    initial_pheromone: Option<f64>,

    /// Build tours in parallel
    #[arg(long)]
    parallel: bool,
}

impl AcoArgs {
    fn to_config(&self) -> AcoResult<ACOConfig> {
        let mut config = match &self.config {
            Some(path) => ACOConfig::from_json_file(path)?,
            None => ACOConfig::default(),
        };

        if let Some(v) = self.ants {
            config.num_ants = v;
        }
        if let Some(v) = self.iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.evaporation {
            config.evaporation_rate = v;
        }
        if let Some(v) = self.deposit {
            config.q = v;
        }
        if let Some(v) = self.initial_pheromone {
            config.initial_pheromone = v;
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance
    Solve {
        /// Path to a TSP-LIB (.tsp) or x,y (.csv) instance
        #[arg(short, long)]
        instance: PathBuf,

        #[command(flatten)]
        aco: AcoArgs,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Output result to JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the convergence trace to a CSV file
        #[arg(long)]
        convergence: Option<PathBuf>,

        /// Write the final pheromone matrix to a CSV file
        #[arg(long)]
        pheromone: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run benchmarks on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of seeded runs per instance
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value = "42")]
        base_seed: u64,

        #[command(flatten)]
        aco: AcoArgs,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve {
            instance,
            aco,
            seed,
            time_limit,
            output,
            convergence,
            pheromone,
            verbose,
        } => aco.to_config().and_then(|mut config| {
            config.seed = seed.or(config.seed);
            config.time_limit = time_limit.or(config.time_limit);
            solve_instance(
                &instance,
                config,
                output.as_deref(),
                convergence.as_deref(),
                pheromone.as_deref(),
                verbose,
            )
        }),

        Commands::Benchmark {
            dir,
            output,
            runs,
            base_seed,
            aco,
            max_size,
        } => aco
            .to_config()
            .and_then(|config| run_benchmark(&dir, &output, runs, base_seed, config, max_size)),

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    path: &Path,
    config: ACOConfig,
    output: Option<&Path>,
    convergence: Option<&Path>,
    pheromone: Option<&Path>,
    verbose: bool,
) -> AcoResult<()> {
    println!("Loading instance from {:?}...", path);
    let instance = TSPInstance::from_file(path)?;

    if verbose {
        println!("{}", instance.statistics());
        println!("Configuration: {:?}", config);
    }

    println!("Solving with ACO ({} ants, {} iterations)...", config.num_ants, config.max_iterations);
    let start = Instant::now();

    let mut aco = AntColonyOptimization::new(instance, config)?;
    let result = aco.run()?;

    let elapsed = start.elapsed();

    println!("\n========== Results ==========");
    println!("Instance: {}", aco.instance().name);
    println!("Best distance: {:.4}", result.solution.cost);
    println!("Iterations: {}", result.iterations);
    if result.stopped_early {
        println!("Stopped early: time limit reached");
    }
    if let Some(iter) = result.convergence.iteration_of_best() {
        println!("Best found at iteration: {}", iter);
    }
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if verbose {
        print!("\n{}", result.solution);
        println!(
            "Pheromone range: [{:.4e}, {:.4e}]",
            result.pheromones.min_value(),
            result.pheromones.max_value()
        );
    }

    if let Some(out_path) = output {
        write_result_json(out_path, &result)?;
        println!("\nResult saved to {:?}", out_path);
    }

    if let Some(conv_path) = convergence {
        write_convergence_csv(conv_path, &result.convergence)?;
        println!("Convergence trace saved to {:?}", conv_path);
    }

    if let Some(pher_path) = pheromone {
        write_pheromone_csv(pher_path, &result.pheromones)?;
        println!("Pheromone matrix saved to {:?}", pher_path);
    }

    Ok(())
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    runs: usize,
    base_seed: u64,
    aco: ACOConfig,
    max_size: Option<usize>,
) -> AcoResult<()> {
    println!("Loading instances from {:?}...", dir);

    let mut instances = load_instances_from_dir(dir)?;

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;

    let config = BenchmarkConfig {
        num_runs: runs,
        base_seed,
        parallel: true,
        show_progress: true,
        aco,
    };

    let mut benchmark = Benchmark::new(config);

    for (i, instance) in instances.iter().enumerate() {
        println!(
            "\n[{}/{}] Processing {} (n={})...",
            i + 1,
            instances.len(),
            instance.name,
            instance.dimension
        );

        benchmark.run_instance(instance)?;
    }

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(path: &Path) -> AcoResult<()> {
    let instance = TSPInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let config = ACOConfig {
        num_ants: 10,
        max_iterations: 20,
        seed: Some(0),
        ..Default::default()
    };
    let mut aco = AntColonyOptimization::new(instance, config)?;
    let quick = aco.run()?;

    println!("Quick Solution Estimate:");
    println!(
        "  ACO (10 ants, 20 iterations): {:.2} in {:.4}s",
        quick.solution.cost, quick.solution.computation_time
    );

    Ok(())
}

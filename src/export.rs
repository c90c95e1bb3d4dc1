//! Export of run results for external reporting and plotting tools.

use crate::error::AcoResult;
use crate::heuristics::aco::ColonyResult;
use crate::heuristics::convergence::ConvergenceTrace;
use crate::heuristics::pheromone::PheromoneMatrix;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct ConvergenceRow {
    iteration: usize,
    best_distance: f64,
}

/// Write the complete result (solution, trace, pheromone snapshot) as pretty JSON
pub fn write_result_json<P: AsRef<Path>>(path: P, result: &ColonyResult) -> AcoResult<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write `iteration,best_distance` rows, iterations numbered from 1
pub fn write_convergence_csv<P: AsRef<Path>>(path: P, trace: &ConvergenceTrace) -> AcoResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for (i, &best_distance) in trace.as_slice().iter().enumerate() {
        writer.serialize(ConvergenceRow {
            iteration: i + 1,
            best_distance,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the pheromone matrix, one CSV row per matrix row
pub fn write_pheromone_csv<P: AsRef<Path>>(path: P, pheromones: &PheromoneMatrix) -> AcoResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for row in pheromones.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

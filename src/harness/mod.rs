// src/harness/mod.rs

//! Benchmark harness: runs a selection of solvers on one configuration,
//! averages their wall-clock time over several repeats and tabulates
//! `{algorithm, iterations, time}` for reporting.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::provenance::ProvenanceChain;
use crate::{Grid, SolverConfig, SolverError, SolverManager};

/// Number of timed repeats per solver unless configured otherwise.
pub const DEFAULT_REPEAT: usize = 5;

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub algorithm: String,
    pub iterations: usize,
    pub converged: bool,
    /// Mean wall-clock seconds per solve.
    pub time_secs: f64,
}

/// Everything a reporting front end needs: the rows and the last solution grid.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub config: SolverConfig,
    pub records: Vec<BenchmarkRecord>,
    pub last_solution: Option<Grid>,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:<24}{:>12}{:>11}{:>14}", "algorithm", "iterations", "converged", "time (s)")?;
        for r in &self.records {
            writeln!(f, "{:<24}{:>12}{:>11}{:>14.6e}", r.algorithm, r.iterations, r.converged, r.time_secs)?;
        }
        Ok(())
    }
}

pub struct BenchmarkHarness {
    manager: SolverManager,
    repeat: usize,
    provenance: ProvenanceChain,
}

impl BenchmarkHarness {
    pub fn new() -> Self {
        BenchmarkHarness {
            manager: SolverManager::new(),
            repeat: DEFAULT_REPEAT,
            provenance: ProvenanceChain::new(),
        }
    }

    /// Sets the number of timed repeats; at least one solve always runs.
    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat.max(1);
        self
    }

    pub fn manager(&self) -> &SolverManager {
        &self.manager
    }

    pub fn provenance(&self) -> &ProvenanceChain {
        &self.provenance
    }

    /// Benchmarks the named solvers in the given order.
    ///
    /// Unknown names are logged and skipped. Solver failures abort the run.
    pub fn run(&mut self, names: &[&str], config: &SolverConfig) -> Result<BenchmarkReport, SolverError> {
        let mut records = Vec::with_capacity(names.len());
        let mut last_solution = None;

        for &name in names {
            let solver = match self.manager.get_solver(name) {
                Ok(solver) => solver,
                Err(SolverError::SolverNotFound(name)) => {
                    warn!(solver = %name, "skipping unknown solver");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut total = Duration::ZERO;
            let mut result = None;
            for _ in 0..self.repeat {
                let start = Instant::now();
                let solved = solver.solve(config)?;
                total += start.elapsed();
                result = Some(solved);
            }
            let Some(result) = result else { continue };

            let record = BenchmarkRecord {
                algorithm: name.to_string(),
                iterations: result.iterations,
                converged: result.converged,
                time_secs: total.as_secs_f64() / self.repeat as f64,
            };
            info!(
                solver = name,
                iterations = record.iterations,
                converged = record.converged,
                time_secs = record.time_secs,
                "benchmark finished"
            );
            self.provenance.record_run(config, &record, &result)?;
            records.push(record);
            last_solution = Some(result.solution);
        }

        Ok(BenchmarkReport { config: *config, records, last_solution })
    }

    /// Benchmarks every registered solver.
    pub fn run_all(&mut self, config: &SolverConfig) -> Result<BenchmarkReport, SolverError> {
        let names = self.manager.names();
        self.run(&names, config)
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}

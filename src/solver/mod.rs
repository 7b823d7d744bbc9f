//! Defines the solver framework: the `Solver` trait shared by every method.

pub mod block;
pub mod krylov;
pub mod point;

// src/solver/mod.rs

use tracing::debug;

use crate::{SolverConfig, SolverError, SolverResult};

/// The common interface for all iterative methods.
///
/// A solver takes the grid size, iteration cap, tolerance and (for SOR-type
/// methods) relaxation factor, and returns the solution grid together with
/// the number of iterations it performed.
pub trait Solver {
    /// Returns the unique name of the solver.
    fn name(&self) -> &'static str;

    /// Whether the method reads the relaxation factor `w`.
    fn uses_relaxation(&self) -> bool {
        false
    }

    /// Runs the iteration.
    ///
    /// Implementations build their [`ConvergenceMonitor`] before touching the
    /// grid, which rejects an invalid configuration with
    /// [`SolverError::InvalidConfig`].
    ///
    /// [`ConvergenceMonitor`]: crate::kernel::ConvergenceMonitor
    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError>;

    /// Runs the iteration with start and finish logged at debug level.
    fn solve(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        debug!(solver = self.name(), n = config.n, max_iter = config.max_iter, tol = config.tol, "solve started");
        let result = self.run(config)?;
        debug!(solver = self.name(), iterations = result.iterations, converged = result.converged, "solve finished");
        Ok(result)
    }
}

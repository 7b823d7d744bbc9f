//! Iterative solver laboratory for the discrete 2D Poisson equation
//! `-Δu = 2` on the unit square with homogeneous Dirichlet boundaries.
//!
//! Every method implements [`solver::Solver`] and is registered by name in
//! [`SolverManager`], so a harness can time any subset of them with the same
//! [`SolverConfig`] in and [`SolverResult`] out.
//!
//! ```rust
//! use poisson_lab::{SolverConfig, SolverManager};
//!
//! let manager = SolverManager::new();
//! let config = SolverConfig::default().with_n(5);
//! let result = manager.get_solver("ConjugateGradient").unwrap().solve(&config).unwrap();
//! assert!(result.converged);
//! ```

pub mod harness;
pub mod kernel;
pub mod provenance;
pub mod solver;

// Re-exporting core numerical types for easier access by other modules.
pub use kernel::{Grid, Vector};
pub use harness::{BenchmarkHarness, BenchmarkRecord, BenchmarkReport};

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

// --- Return Types and Errors ---

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// A pivot of the tridiagonal elimination is exactly zero.
    #[error("singular tridiagonal matrix: zero pivot at row {row}")]
    SingularMatrix { row: usize },

    /// A Krylov step needs to divide by a zero (or non-finite) quantity.
    #[error("Krylov breakdown at iteration {iteration}: {detail}")]
    DivergentStep { iteration: usize, detail: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("solver not found: {0}")]
    SolverNotFound(String),

    #[error("provenance failed: {0}")]
    ProvenanceFailed(String),
}

/// Input of a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Interior nodes per side; the grid is `(n+2)x(n+2)`.
    pub n: usize,
    pub max_iter: usize,
    pub tol: f64,
    /// Relaxation factor, read only by the SOR/SSOR variants.
    pub w: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            n: 9,
            max_iter: 1000,
            tol: 1e-5,
            w: 1.4,
        }
    }
}

impl SolverConfig {
    pub fn with_n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_w(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    /// Parses a (possibly partial) JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SolverError> {
        let config: SolverConfig =
            serde_json::from_str(json).map_err(|e| SolverError::InvalidConfig(e.to_string()))?;
        config.validate(false)?;
        Ok(config)
    }

    /// Rejects malformed input before any algorithm runs.
    ///
    /// `max_iter = 0` is accepted: the solve returns the zero grid after no iterations.
    pub fn validate(&self, uses_relaxation: bool) -> Result<(), SolverError> {
        if self.n < 1 {
            return Err(SolverError::InvalidConfig("n must be at least 1".to_string()));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(SolverError::InvalidConfig(format!("tol must be a positive finite number, got {}", self.tol)));
        }
        if uses_relaxation && !(self.w > 0.0 && self.w < 2.0) {
            return Err(SolverError::InvalidConfig(format!("relaxation factor w must lie in (0, 2), got {}", self.w)));
        }
        Ok(())
    }
}

/// Output of a single solve.
#[derive(Debug, Clone, Serialize)]
pub struct SolverResult {
    /// `(n+2)x(n+2)` grid including the zero boundary.
    pub solution: Grid,
    pub iterations: usize,
    /// False when the iteration cap was reached before the tolerance was met.
    pub converged: bool,
}

impl SolverResult {
    pub fn interior(&self) -> ArrayView2<'_, f64> {
        let last = self.solution.nrows() - 1;
        self.solution.slice(ndarray::s![1..last, 1..last])
    }

    /// Largest node-wise difference between two solutions on the same grid.
    pub fn max_abs_error_to(&self, other: &SolverResult) -> Result<f64, SolverError> {
        if self.solution.dim() != other.solution.dim() {
            return Err(SolverError::DimensionMismatch(format!(
                "grids {:?} and {:?} differ",
                self.solution.dim(),
                other.solution.dim()
            )));
        }
        Ok(self
            .solution
            .iter()
            .zip(other.solution.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}

// --- Solver Manager ---

/// Name-keyed registry of every available method.
pub struct SolverManager {
    solvers: Vec<Box<dyn solver::Solver>>,
}

impl SolverManager {
    pub fn new() -> Self {
        use solver::{block, krylov, point};
        SolverManager {
            solvers: vec![
                Box::new(point::Jacobi),
                Box::new(point::GaussSeidel),
                Box::new(point::Sor),
                Box::new(block::BlockJacobi),
                Box::new(block::BlockGaussSeidel),
                Box::new(block::BlockSor),
                Box::new(point::Ssor),
                Box::new(block::BlockSsor),
                Box::new(krylov::SteepestDescent),
                Box::new(krylov::ConjugateGradient),
                Box::new(krylov::SparseSteepestDescent),
            ],
        }
    }

    pub fn get_solver(&self, name: &str) -> Result<&dyn solver::Solver, SolverError> {
        self.solvers
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
            .ok_or_else(|| SolverError::SolverNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.solvers.iter().map(|s| s.name()).collect()
    }

    pub fn solvers(&self) -> impl Iterator<Item = &dyn solver::Solver> {
        self.solvers.iter().map(|s| s.as_ref())
    }
}

impl Default for SolverManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_every_method_in_menu_order() {
        let manager = SolverManager::new();
        assert_eq!(
            manager.names(),
            vec![
                "Jacobi",
                "GaussSeidel",
                "SOR",
                "BlockJacobi",
                "BlockGaussSeidel",
                "BlockSOR",
                "SSOR",
                "BlockSSOR",
                "SteepestDescent",
                "ConjugateGradient",
                "SparseSteepestDescent",
            ]
        );
    }

    #[test]
    fn test_unknown_solver_is_reported() {
        let manager = SolverManager::new();
        match manager.get_solver("Multigrid") {
            Err(SolverError::SolverNotFound(name)) => assert_eq!(name, "Multigrid"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("lookup should fail"),
        }
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = SolverConfig::from_json(r#"{"n": 4, "tol": 1e-6}"#).unwrap();
        assert_eq!(config, SolverConfig { n: 4, max_iter: 1000, tol: 1e-6, w: 1.4 });
    }

    #[test]
    fn test_config_validation() {
        assert!(SolverConfig::default().validate(true).is_ok());
        assert!(SolverConfig::default().with_max_iter(0).validate(true).is_ok());
        assert!(matches!(SolverConfig::default().with_n(0).validate(false), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(SolverConfig::default().with_tol(0.0).validate(false), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(SolverConfig::default().with_tol(f64::NAN).validate(false), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(SolverConfig::default().with_w(2.0).validate(true), Err(SolverError::InvalidConfig(_))));
        // w is ignored by methods without relaxation.
        assert!(SolverConfig::default().with_w(0.0).validate(false).is_ok());
        assert!(matches!(SolverConfig::from_json(r#"{"n": 0}"#), Err(SolverError::InvalidConfig(_))));
        assert!(matches!(SolverConfig::from_json("not json"), Err(SolverError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_solving() {
        let manager = SolverManager::new();
        let config = SolverConfig::default().with_w(2.5);
        assert!(matches!(manager.get_solver("SOR").unwrap().solve(&config), Err(SolverError::InvalidConfig(_))));
        // Jacobi does not read w.
        assert!(manager.get_solver("Jacobi").unwrap().solve(&config).is_ok());
    }

    #[test]
    fn test_direct_run_still_validates() {
        let manager = SolverManager::new();
        let empty = SolverConfig::default().with_n(0);
        let over = SolverConfig::default().with_w(3.0);
        for solver in manager.solvers() {
            let result = solver.run(&empty);
            assert!(matches!(result, Err(SolverError::InvalidConfig(_))), "{} accepted n = 0", solver.name());
            if solver.uses_relaxation() {
                assert!(matches!(solver.run(&over), Err(SolverError::InvalidConfig(_))), "{}", solver.name());
            }
        }
    }
}

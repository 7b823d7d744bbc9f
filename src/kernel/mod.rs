// src/kernel/mod.rs

//! The numerical kernel shared by every solver.
//! This module provides the grid layout, the discretized source term, and the
//! convergence bookkeeping that all iteration loops go through.

pub mod operator;
pub mod tridiagonal;

use ndarray::Array2;
use nalgebra::DVector;
use tracing::{trace, warn};

use crate::{SolverConfig, SolverError};

// Type aliases for clarity throughout the crate.
pub type Grid = Array2<f64>;
pub type Vector = DVector<f64>;

/// Mesh spacing `h = 1/(n+1)` of the unit square with `n` interior nodes per side.
pub fn mesh_spacing(n: usize) -> f64 {
    1.0 / (n + 1) as f64
}

/// Creates an all-zero `(n+2)x(n+2)` grid. Boundary rows and columns stay at zero.
pub fn zero_grid(n: usize) -> Grid {
    Array2::zeros((n + 2, n + 2))
}

/// The discretized right-hand side: `2h²` at interior nodes, zero on the boundary.
pub fn source_term(n: usize) -> Grid {
    let h = mesh_spacing(n);
    let mut f = zero_grid(n);
    f.slice_mut(ndarray::s![1..=n, 1..=n]).fill(2.0 * h * h);
    f
}

/// The source term restricted to the interior, flattened row-major.
pub fn source_vector(n: usize) -> Vector {
    let h = mesh_spacing(n);
    Vector::from_element(n * n, 2.0 * h * h)
}

/// Scatters a flattened interior vector (`k = (i-1)*n + (j-1)`) into a grid
/// with zero boundary.
pub fn grid_from_interior(n: usize, v: &Vector) -> Grid {
    let mut grid = zero_grid(n);
    for i in 1..=n {
        for j in 1..=n {
            grid[[i, j]] = v[(i - 1) * n + (j - 1)];
        }
    }
    grid
}

/// Returns true when every boundary node of `grid` is exactly zero.
pub fn boundary_is_zero(grid: &Grid) -> bool {
    let last = grid.nrows() - 1;
    grid.row(0).iter().all(|&v| v == 0.0)
        && grid.row(last).iter().all(|&v| v == 0.0)
        && grid.column(0).iter().all(|&v| v == 0.0)
        && grid.column(last).iter().all(|&v| v == 0.0)
}

/// How an iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub iterations: usize,
    pub converged: bool,
}

/// Shared convergence test: `error / n² < tol`, bounded by `max_iter`.
///
/// Every method hands its sweep to [`ConvergenceMonitor::run`] as a closure that
/// returns the error accumulated during that iteration only. The closure is
/// free to call [`ConvergenceMonitor::is_met`] itself when it has work that must
/// be skipped on convergence (conjugate gradient does).
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceMonitor {
    scale: f64,
    tol: f64,
    max_iter: usize,
}

impl ConvergenceMonitor {
    /// Validates `config` and builds the monitor for one solve.
    ///
    /// Every solver constructs its monitor before iterating, so an invalid
    /// configuration (for instance `n = 0`, which would make the scale zero)
    /// never reaches a sweep.
    pub fn new(config: &SolverConfig, uses_relaxation: bool) -> Result<Self, SolverError> {
        config.validate(uses_relaxation)?;
        Ok(ConvergenceMonitor {
            scale: (config.n * config.n) as f64,
            tol: config.tol,
            max_iter: config.max_iter,
        })
    }

    pub fn is_met(&self, error: f64) -> bool {
        error / self.scale < self.tol
    }

    /// Runs `sweep` once per iteration until the tolerance is met or the cap is hit.
    ///
    /// The sweep receives the 0-based iteration index; the returned
    /// [`Outcome::iterations`] is the 1-based count of completed iterations.
    /// Reaching `max_iter` is not an error.
    pub fn run<F>(&self, method: &str, mut sweep: F) -> Result<Outcome, SolverError>
    where
        F: FnMut(usize) -> Result<f64, SolverError>,
    {
        for k in 0..self.max_iter {
            let error = sweep(k)?;
            trace!(method, iteration = k + 1, error = error / self.scale, "sweep finished");
            if self.is_met(error) {
                return Ok(Outcome { iterations: k + 1, converged: true });
            }
        }
        if self.max_iter > 0 {
            warn!(method, max_iter = self.max_iter, tol = self.tol, "iteration cap reached without convergence");
        }
        Ok(Outcome { iterations: self.max_iter, converged: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_term_is_zero_on_boundary() {
        let f = source_term(3);
        assert_eq!(f.dim(), (5, 5));
        assert!(boundary_is_zero(&f));
        assert_eq!(f[[2, 2]], 2.0 * 0.25 * 0.25);
    }

    #[test]
    fn test_grid_from_interior_ordering() {
        let v = Vector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let grid = grid_from_interior(2, &v);
        assert_eq!(grid[[1, 1]], 1.0);
        assert_eq!(grid[[1, 2]], 2.0);
        assert_eq!(grid[[2, 1]], 3.0);
        assert_eq!(grid[[2, 2]], 4.0);
        assert!(boundary_is_zero(&grid));
    }

    #[test]
    fn test_monitor_counts_are_one_based() {
        let config = SolverConfig::default().with_n(2).with_max_iter(10).with_tol(0.1);
        let monitor = ConvergenceMonitor::new(&config, false).unwrap();
        // Errors 4.0, 2.0, 0.2 → scaled 1.0, 0.5, 0.05; third sweep converges.
        let errors = [4.0, 2.0, 0.2];
        let outcome = monitor.run("test", |k| Ok(errors[k])).unwrap();
        assert_eq!(outcome, Outcome { iterations: 3, converged: true });
    }

    #[test]
    fn test_monitor_cap_is_not_an_error() {
        let config = SolverConfig::default().with_n(1).with_max_iter(4);
        let monitor = ConvergenceMonitor::new(&config, false).unwrap();
        let mut calls = 0;
        let outcome = monitor
            .run("test", |_| {
                calls += 1;
                Ok(1.0)
            })
            .unwrap();
        assert_eq!(calls, 4);
        assert_eq!(outcome, Outcome { iterations: 4, converged: false });
    }

    #[test]
    fn test_monitor_rejects_invalid_config() {
        let empty = SolverConfig::default().with_n(0);
        assert!(matches!(ConvergenceMonitor::new(&empty, false), Err(SolverError::InvalidConfig(_))));
        let over = SolverConfig::default().with_w(2.5);
        assert!(ConvergenceMonitor::new(&over, false).is_ok());
        assert!(matches!(ConvergenceMonitor::new(&over, true), Err(SolverError::InvalidConfig(_))));
    }

    #[test]
    fn test_monitor_zero_cap_never_sweeps() {
        let config = SolverConfig::default().with_max_iter(0);
        let monitor = ConvergenceMonitor::new(&config, false).unwrap();
        let outcome = monitor.run("test", |_| panic!("sweep must not run")).unwrap();
        assert_eq!(outcome, Outcome { iterations: 0, converged: false });
    }
}

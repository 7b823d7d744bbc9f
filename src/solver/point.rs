// src/solver/point.rs

//! Point relaxation: Jacobi, Gauss-Seidel, SOR and SSOR sweeps over the grid.
//!
//! All four share the stencil update
//! `u_ij <- ((4/w - 4) u_ij + u_(i-1)j + u_(i+1)j + u_i(j-1) + u_i(j+1) + f_ij) * w/4`
//! and differ only in which buffer each neighbor is read from.

use crate::kernel::{self, ConvergenceMonitor, Grid};
use crate::solver::Solver;
use crate::{SolverConfig, SolverError, SolverResult};

#[inline]
fn relaxed(center: f64, neighbors: f64, f: f64, w: f64) -> f64 {
    ((4.0 / w - 4.0) * center + neighbors + f) * w / 4.0
}

/// One in-place forward sweep (increasing i, then j). Returns `Σ|Δu|`.
fn forward_sweep(u: &mut Grid, f: &Grid, n: usize, w: f64) -> f64 {
    let mut e = 0.0;
    for i in 1..=n {
        for j in 1..=n {
            let old = u[[i, j]];
            let neighbors = u[[i - 1, j]] + u[[i + 1, j]] + u[[i, j - 1]] + u[[i, j + 1]];
            u[[i, j]] = relaxed(old, neighbors, f[[i, j]], w);
            e += (u[[i, j]] - old).abs();
        }
    }
    e
}

/// Point Jacobi: every neighbor read comes from the previous iterate.
pub struct Jacobi;

impl Solver for Jacobi {
    fn name(&self) -> &'static str {
        "Jacobi"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let mut u = kernel::zero_grid(n);
        let mut next = u.clone();

        let outcome = monitor.run(self.name(), |_| {
            let mut e = 0.0;
            for i in 1..=n {
                for j in 1..=n {
                    let neighbors = u[[i - 1, j]] + u[[i + 1, j]] + u[[i, j - 1]] + u[[i, j + 1]];
                    next[[i, j]] = (neighbors + f[[i, j]]) / 4.0;
                    e += (next[[i, j]] - u[[i, j]]).abs();
                }
            }
            std::mem::swap(&mut u, &mut next);
            Ok(e)
        })?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Point Gauss-Seidel: in-place sweep, the `w = 1` case of SOR.
pub struct GaussSeidel;

impl Solver for GaussSeidel {
    fn name(&self) -> &'static str {
        "GaussSeidel"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let mut u = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| Ok(forward_sweep(&mut u, &f, n, 1.0)))?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Successive over-relaxation with factor `w`.
pub struct Sor;

impl Solver for Sor {
    fn name(&self) -> &'static str {
        "SOR"
    }

    fn uses_relaxation(&self) -> bool {
        true
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let mut u = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| Ok(forward_sweep(&mut u, &f, n, config.w)))?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Symmetric SOR: a forward sweep into `forward`, then a backward sweep into `u`.
///
/// The backward sweep reads `forward` for the nodes it has not reached yet
/// (i-1, j-1) and its own output for the nodes it already passed (i+1, j+1).
/// The two buffers evolve independently: `forward` carries a plain SOR
/// iteration and is never reseeded from `u`.
pub struct Ssor;

impl Solver for Ssor {
    fn name(&self) -> &'static str {
        "SSOR"
    }

    fn uses_relaxation(&self) -> bool {
        true
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let w = config.w;
        let f = kernel::source_term(n);
        let mut u = kernel::zero_grid(n);
        let mut forward = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| {
            let e_forward = forward_sweep(&mut forward, &f, n, w);

            let mut e_backward = 0.0;
            for i in (1..=n).rev() {
                for j in (1..=n).rev() {
                    let center = forward[[i, j]];
                    let neighbors = forward[[i - 1, j]] + u[[i + 1, j]] + forward[[i, j - 1]] + u[[i, j + 1]];
                    u[[i, j]] = relaxed(center, neighbors, f[[i, j]], w);
                    e_backward += (u[[i, j]] - center).abs();
                }
            }
            Ok(e_forward + e_backward)
        })?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

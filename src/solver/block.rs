// src/solver/block.rs

//! Block (line) relaxation: each grid column is solved exactly with the
//! tridiagonal solver while its two neighboring columns are folded into the
//! right-hand side.

use crate::kernel::tridiagonal::TridiagonalSystem;
use crate::kernel::{self, ConvergenceMonitor, Grid};
use crate::solver::Solver;
use crate::{SolverConfig, SolverError, SolverResult};

/// Right-hand side of column `j`: `f[1..=n, j] + left[1..=n, j-1] + right[1..=n, j+1]`.
fn column_rhs(f: &Grid, left: &Grid, right: &Grid, n: usize, j: usize) -> Vec<f64> {
    (1..=n).map(|i| f[[i, j]] + left[[i, j - 1]] + right[[i, j + 1]]).collect()
}

/// Writes `w x + (1-w) base[:, j]` into `target[:, j]` and returns the 1-norm of the change.
fn relax_column(target: &mut Grid, base: &Grid, x: &[f64], n: usize, j: usize, w: f64) -> f64 {
    let mut e = 0.0;
    for i in 1..=n {
        let old = base[[i, j]];
        target[[i, j]] = w * x[i - 1] + (1.0 - w) * old;
        e += (old - target[[i, j]]).abs();
    }
    e
}

/// One in-place forward column sweep (j = 1..=n). Returns the summed 1-norms.
fn forward_column_sweep(u: &mut Grid, f: &Grid, system: &TridiagonalSystem, n: usize, w: f64) -> Result<f64, SolverError> {
    let mut e = 0.0;
    for j in 1..=n {
        let d = column_rhs(f, u, u, n, j);
        let x = system.solve(&d)?;
        let old = u.column(j).to_owned();
        for i in 1..=n {
            u[[i, j]] = w * x[i - 1] + (1.0 - w) * old[i];
            e += (old[i] - u[[i, j]]).abs();
        }
    }
    Ok(e)
}

/// Block Jacobi: every column reads its neighbors from the pre-sweep snapshot.
pub struct BlockJacobi;

impl Solver for BlockJacobi {
    fn name(&self) -> &'static str {
        "BlockJacobi"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let system = TridiagonalSystem::poisson_line(n);
        let mut u = kernel::zero_grid(n);
        let mut next = u.clone();

        let outcome = monitor.run(self.name(), |_| {
            let mut e = 0.0;
            for j in 1..=n {
                let d = column_rhs(&f, &u, &u, n, j);
                let x = system.solve(&d)?;
                e += relax_column(&mut next, &u, &x, n, j, 1.0);
            }
            std::mem::swap(&mut u, &mut next);
            Ok(e)
        })?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Block Gauss-Seidel: column `j` sees the freshly solved column `j-1`.
pub struct BlockGaussSeidel;

impl Solver for BlockGaussSeidel {
    fn name(&self) -> &'static str {
        "BlockGaussSeidel"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let system = TridiagonalSystem::poisson_line(n);
        let mut u = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| forward_column_sweep(&mut u, &f, &system, n, 1.0))?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Block SOR: Gauss-Seidel coupling, new column blended as `w x + (1-w) u_old`.
pub struct BlockSor;

impl Solver for BlockSor {
    fn name(&self) -> &'static str {
        "BlockSOR"
    }

    fn uses_relaxation(&self) -> bool {
        true
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let f = kernel::source_term(n);
        let system = TridiagonalSystem::poisson_line(n);
        let mut u = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| forward_column_sweep(&mut u, &f, &system, n, config.w))?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

/// Block SSOR: a forward column sweep into `forward`, then a backward sweep
/// (j = n..=1) into `u` whose right-hand side takes column `j-1` from the
/// forward result and column `j+1` from its own output.
///
/// `forward` is never reseeded from `u`, so it carries a plain block SOR
/// iteration of its own.
pub struct BlockSsor;

impl Solver for BlockSsor {
    fn name(&self) -> &'static str {
        "BlockSSOR"
    }

    fn uses_relaxation(&self) -> bool {
        true
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let w = config.w;
        let f = kernel::source_term(n);
        let system = TridiagonalSystem::poisson_line(n);
        let mut u = kernel::zero_grid(n);
        let mut forward = kernel::zero_grid(n);

        let outcome = monitor.run(self.name(), |_| {
            let e_forward = forward_column_sweep(&mut forward, &f, &system, n, w)?;

            let mut e_backward = 0.0;
            for j in (1..=n).rev() {
                let d = column_rhs(&f, &forward, &u, n, j);
                let x = system.solve(&d)?;
                e_backward += relax_column(&mut u, &forward, &x, n, j, w);
            }
            Ok(e_forward + e_backward)
        })?;

        Ok(SolverResult { solution: u, iterations: outcome.iterations, converged: outcome.converged })
    }
}

// src/solver/krylov.rs

//! Descent methods on the interior unknowns: steepest descent and conjugate
//! gradient through the matrix-free stencil, plus steepest descent through the
//! assembled sparse matrix.

use tracing::{debug, warn};

use crate::kernel::operator::{Operator, SparseOperator, StencilOperator};
use crate::kernel::{self, ConvergenceMonitor, Outcome, Vector};
use crate::solver::Solver;
use crate::{SolverConfig, SolverError, SolverResult};

/// How the per-iteration update `Δu` is reduced to the convergence error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateNorm {
    /// `Σ|Δu_k|`, accumulated node by node.
    L1Sum,
    /// `‖Δu‖₂` over the whole vector.
    L2,
}

/// Applies `u += alpha * dir` and returns the size of the change under `norm`.
fn apply_step(u: &mut Vector, alpha: f64, dir: &Vector, norm: UpdateNorm) -> f64 {
    let mut acc = 0.0;
    for (uk, dk) in u.iter_mut().zip(dir.iter()) {
        let old = *uk;
        *uk += alpha * dk;
        let delta = *uk - old;
        acc += match norm {
            UpdateNorm::L1Sum => delta.abs(),
            UpdateNorm::L2 => delta * delta,
        };
    }
    match norm {
        UpdateNorm::L1Sum => acc,
        UpdateNorm::L2 => acc.sqrt(),
    }
}

/// `num / den`, failing when the denominator is zero or the quotient is not finite.
fn step_ratio(num: f64, den: f64, iteration: usize, what: &str) -> Result<f64, SolverError> {
    let ratio = num / den;
    if den == 0.0 || !ratio.is_finite() {
        warn!(iteration, numerator = num, denominator = den, "{} breakdown", what);
        return Err(SolverError::DivergentStep {
            iteration,
            detail: format!("{} = {:e} / {:e}", what, num, den),
        });
    }
    Ok(ratio)
}

/// Steepest descent from `u = 0`: the residual is recomputed from scratch every
/// iteration and `α = ⟨r,r⟩ / ⟨r,Ar⟩`.
pub fn steepest_descent<O: Operator>(
    op: &O,
    f: &Vector,
    monitor: &ConvergenceMonitor,
    method: &str,
    norm: UpdateNorm,
) -> Result<(Vector, Outcome), SolverError> {
    let mut u = Vector::zeros(op.dim());

    let outcome = monitor.run(method, |k| {
        let r = f - op.apply(&u);
        let rr = r.dot(&r);
        if rr == 0.0 {
            // The iterate is exact; the step is zero.
            return Ok(0.0);
        }
        let ar = op.apply(&r);
        let alpha = step_ratio(rr, r.dot(&ar), k + 1, "alpha")?;
        Ok(apply_step(&mut u, alpha, &r, norm))
    })?;

    Ok((u, outcome))
}

/// Preconditioner-free conjugate gradient from `u = 0`.
///
/// The convergence test runs right after the solution update, before the
/// residual and search direction are advanced.
pub fn conjugate_gradient<O: Operator>(
    op: &O,
    f: &Vector,
    monitor: &ConvergenceMonitor,
    method: &str,
) -> Result<(Vector, Outcome), SolverError> {
    let mut u = Vector::zeros(op.dim());
    let mut r = f - op.apply(&u);
    let mut p = r.clone();
    let mut rr = r.dot(&r);

    let outcome = monitor.run(method, |k| {
        if rr == 0.0 {
            return Ok(0.0);
        }
        let ap = op.apply(&p);
        let alpha = step_ratio(rr, p.dot(&ap), k + 1, "alpha")?;
        let e = apply_step(&mut u, alpha, &p, UpdateNorm::L1Sum);
        if monitor.is_met(e) {
            return Ok(e);
        }

        r.axpy(-alpha, &ap, 1.0);
        let rr_new = r.dot(&r);
        if rr_new == 0.0 {
            debug!(iteration = k + 1, "residual vanished, iterate is exact");
            return Ok(0.0);
        }
        let beta = step_ratio(rr_new, rr, k + 1, "beta")?;
        p.axpy(1.0, &r, beta);
        rr = rr_new;
        Ok(e)
    })?;

    Ok((u, outcome))
}

fn into_result(n: usize, u: &Vector, outcome: Outcome) -> SolverResult {
    SolverResult {
        solution: kernel::grid_from_interior(n, u),
        iterations: outcome.iterations,
        converged: outcome.converged,
    }
}

/// Matrix-free steepest descent; convergence on `Σ|Δu| / n²`.
pub struct SteepestDescent;

impl Solver for SteepestDescent {
    fn name(&self) -> &'static str {
        "SteepestDescent"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let op = StencilOperator::new(n);
        let f = kernel::source_vector(n);
        let (u, outcome) = steepest_descent(&op, &f, &monitor, self.name(), UpdateNorm::L1Sum)?;
        Ok(into_result(n, &u, outcome))
    }
}

/// Matrix-free conjugate gradient; convergence on `Σ|Δu| / n²`.
pub struct ConjugateGradient;

impl Solver for ConjugateGradient {
    fn name(&self) -> &'static str {
        "ConjugateGradient"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let op = StencilOperator::new(n);
        let f = kernel::source_vector(n);
        let (u, outcome) = conjugate_gradient(&op, &f, &monitor, self.name())?;
        Ok(into_result(n, &u, outcome))
    }
}

/// Steepest descent on the assembled CSR matrix; convergence on `‖Δu‖₂ / n²`.
pub struct SparseSteepestDescent;

impl Solver for SparseSteepestDescent {
    fn name(&self) -> &'static str {
        "SparseSteepestDescent"
    }

    fn run(&self, config: &SolverConfig) -> Result<SolverResult, SolverError> {
        let monitor = ConvergenceMonitor::new(config, self.uses_relaxation())?;
        let n = config.n;
        let op = SparseOperator::assemble(n);
        let f = kernel::source_vector(n);
        let (u, outcome) = steepest_descent(&op, &f, &monitor, self.name(), UpdateNorm::L2)?;
        Ok(into_result(n, &u, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(n: usize) -> SolverConfig {
        SolverConfig::default().with_n(n)
    }

    /// Maps everything to zero, so every step denominator vanishes.
    struct ZeroOperator(usize);

    impl Operator for ZeroOperator {
        fn dim(&self) -> usize {
            self.0
        }

        fn apply(&self, _v: &Vector) -> Vector {
            Vector::zeros(self.0)
        }
    }

    #[test]
    fn test_single_unknown_is_exact() {
        for solver in [&SteepestDescent as &dyn Solver, &ConjugateGradient, &SparseSteepestDescent] {
            let result = solver.solve(&config(1)).unwrap();
            assert!(result.converged, "{}", solver.name());
            assert_abs_diff_eq!(result.solution[[1, 1]], 0.125, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cg_single_unknown_stops_after_one_iteration() {
        let result = ConjugateGradient.solve(&config(1)).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.solution[[1, 1]], 0.125);
    }

    #[test]
    fn test_cg_beats_steepest_descent() {
        let sd = SteepestDescent.solve(&config(9)).unwrap();
        let cg = ConjugateGradient.solve(&config(9)).unwrap();
        assert!(sd.converged && cg.converged);
        assert!(cg.iterations < sd.iterations, "CG {} vs SD {}", cg.iterations, sd.iterations);
    }

    #[test]
    fn test_sparse_criterion_is_never_looser_than_dense() {
        // ‖Δu‖₂ ≤ Σ|Δu|, so the sparse variant stops no later than the dense one.
        let dense = SteepestDescent.solve(&config(8)).unwrap();
        let sparse = SparseSteepestDescent.solve(&config(8)).unwrap();
        assert!(sparse.iterations <= dense.iterations);
        assert!(sparse.max_abs_error_to(&dense).unwrap() < 1e-2);
    }

    #[test]
    fn test_update_norms() {
        let mut u = Vector::zeros(2);
        let dir = Vector::from_vec(vec![3.0, -4.0]);
        assert_eq!(apply_step(&mut u, 1.0, &dir, UpdateNorm::L1Sum), 7.0);
        assert_eq!(apply_step(&mut u, 1.0, &dir, UpdateNorm::L2), 5.0);
        assert_eq!(u, Vector::from_vec(vec![6.0, -8.0]));
    }

    #[test]
    fn test_zero_denominator_is_a_breakdown() {
        let f = Vector::from_element(4, 1.0);
        let monitor = ConvergenceMonitor::new(&config(2), false).unwrap();
        let err = steepest_descent(&ZeroOperator(4), &f, &monitor, "test", UpdateNorm::L1Sum).unwrap_err();
        assert!(matches!(err, SolverError::DivergentStep { iteration: 1, .. }));
        let err = conjugate_gradient(&ZeroOperator(4), &f, &monitor, "test").unwrap_err();
        assert!(matches!(err, SolverError::DivergentStep { iteration: 1, .. }));
    }
}

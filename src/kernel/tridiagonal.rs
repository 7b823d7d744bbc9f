// src/kernel/tridiagonal.rs

//! Direct solve of tridiagonal systems (Thomas algorithm, LU without pivoting).

use crate::SolverError;

/// Solves the tridiagonal system with sub-diagonal `a`, main diagonal `b`,
/// super-diagonal `c` and right-hand side `d`.
///
/// All four slices have the same length `m+1`; `a[0]` and `c[m]` are not read.
/// There is no pivoting: a zero pivot fails with [`SolverError::SingularMatrix`].
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> Result<Vec<f64>, SolverError> {
    let len = b.len();
    if len == 0 || a.len() != len || c.len() != len || d.len() != len {
        return Err(SolverError::DimensionMismatch(format!(
            "tridiagonal vectors must share a nonzero length (a={}, b={}, c={}, d={})",
            a.len(),
            len,
            c.len(),
            d.len()
        )));
    }
    let m = len - 1;

    let mut u = vec![0.0; len];
    let mut l = vec![0.0; len];

    // Forward elimination.
    if b[0] == 0.0 {
        return Err(SolverError::SingularMatrix { row: 0 });
    }
    u[0] = b[0];
    for k in 1..=m {
        l[k] = a[k] / u[k - 1];
        u[k] = b[k] - l[k] * c[k - 1];
        if u[k] == 0.0 {
            return Err(SolverError::SingularMatrix { row: k });
        }
    }

    // Back substitution.
    let mut y = vec![0.0; len];
    y[0] = d[0];
    for k in 1..=m {
        y[k] = d[k] - l[k] * y[k - 1];
    }

    let mut x = vec![0.0; len];
    x[m] = y[m] / u[m];
    for k in (0..m).rev() {
        x[k] = (y[k] - c[k] * x[k + 1]) / u[k];
    }

    Ok(x)
}

/// Coefficients of one line of a block method: constant (-1, 4, -1) bands.
///
/// Built once per solve; each line supplies its own right-hand side.
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    sub: Vec<f64>,
    main: Vec<f64>,
    sup: Vec<f64>,
}

impl TridiagonalSystem {
    /// The 1D slice of the 5-point Laplacian over `len` unknowns.
    pub fn poisson_line(len: usize) -> Self {
        TridiagonalSystem {
            sub: vec![-1.0; len],
            main: vec![4.0; len],
            sup: vec![-1.0; len],
        }
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, SolverError> {
        solve_tridiagonal(&self.sub, &self.main, &self.sup, rhs)
    }
}

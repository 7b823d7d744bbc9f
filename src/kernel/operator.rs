// src/kernel/operator.rs

//! Two representations of the 5-point Laplacian `A` acting on the `n²` interior
//! unknowns, flattened row-major (`k = (i-1)*n + (j-1)`).

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::Vector;

/// A linear operator `v -> A v` on interior vectors.
pub trait Operator {
    /// Number of unknowns, `n²`.
    fn dim(&self) -> usize;

    fn apply(&self, v: &Vector) -> Vector;
}

/// Matrix-free stencil: `(A v)_ij = 4 v_ij - v_(i-1)j - v_(i+1)j - v_i(j-1) - v_i(j+1)`,
/// with neighbors outside the interior read as the Dirichlet zero.
#[derive(Debug, Clone, Copy)]
pub struct StencilOperator {
    n: usize,
}

impl StencilOperator {
    pub fn new(n: usize) -> Self {
        StencilOperator { n }
    }
}

impl Operator for StencilOperator {
    fn dim(&self) -> usize {
        self.n * self.n
    }

    fn apply(&self, v: &Vector) -> Vector {
        let n = self.n;
        let mut out = Vector::zeros(n * n);
        for i in 0..n {
            for j in 0..n {
                let k = i * n + j;
                let mut acc = 4.0 * v[k];
                if i > 0 {
                    acc -= v[k - n];
                }
                if i + 1 < n {
                    acc -= v[k + n];
                }
                if j > 0 {
                    acc -= v[k - 1];
                }
                if j + 1 < n {
                    acc -= v[k + 1];
                }
                out[k] = acc;
            }
        }
        out
    }
}

/// Explicitly assembled `n² x n²` CSR matrix: diagonal 4, offsets ±1 and ±n
/// at -1, with the ±1 entries that would wrap across a row of the grid left out.
#[derive(Debug, Clone)]
pub struct SparseOperator {
    matrix: CsrMatrix<f64>,
}

impl SparseOperator {
    pub fn assemble(n: usize) -> Self {
        let size = n * n;
        let mut coo = CooMatrix::new(size, size);
        for k in 0..size {
            coo.push(k, k, 4.0);
            if k + 1 < size && (k + 1) % n != 0 {
                coo.push(k, k + 1, -1.0);
                coo.push(k + 1, k, -1.0);
            }
            if k + n < size {
                coo.push(k, k + n, -1.0);
                coo.push(k + n, k, -1.0);
            }
        }
        SparseOperator {
            matrix: CsrMatrix::from(&coo),
        }
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }
}

impl Operator for SparseOperator {
    fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    fn apply(&self, v: &Vector) -> Vector {
        &self.matrix * v
    }
}

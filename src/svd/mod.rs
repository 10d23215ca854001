//! # Singular Value Decomposition
//!
//! Dense SVD by Householder bidiagonalization followed by implicit-shift
//! Golub-Kahan QR iteration. Wide inputs are decomposed through their
//! transpose, so every shape goes through the same kernel.
//!
//! ```text
//! A (m×n) = U · diag(s) · Vᵀ
//! ```
//!
//! Singular values come out non-negative and descending. Each left singular
//! vector has its largest-magnitude component positive; the paired right
//! vector is flipped along with it.

mod golub_kahan;

use std::str::FromStr;

use log::debug;
use ndarray::{s, ArrayView2, Axis};

use crate::dense::{self, Matrix, Vector};
use crate::error::AlgebraError;
use crate::utils::FloatOps;

pub const DEFAULT_MAX_ITERATIONS: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvdMode {
    /// `U` is `m×min(m,n)` and `V` is `n×min(m,n)`.
    #[default]
    Economy,
    /// `U` is `m×m` and `V` is `n×n`.
    Full,
}

impl FromStr for SvdMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "economy" | "thin" | "reduced" => Ok(SvdMode::Economy),
            "full" | "complete" => Ok(SvdMode::Full),
            other => Err(AlgebraError::unsupported(format!("unknown SVD mode '{}'", other)).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvdResult<T: FloatOps> {
    u: Matrix<T>,
    s: Vector<T>,
    v: Matrix<T>,
}

impl<T: FloatOps> SvdResult<T> {
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    pub fn s(&self) -> &Vector<T> {
        &self.s
    }

    pub fn v(&self) -> &Matrix<T> {
        &self.v
    }

    pub fn vt(&self) -> Matrix<T> {
        self.v.t().to_owned()
    }

    /// `U · diag(s) · Vᵀ` restricted to the columns paired with singular values.
    pub fn reconstruct(&self) -> Matrix<T> {
        let k = self.s.len();
        let mut us = self.u.slice(s![.., ..k]).to_owned();
        for (mut col, &sigma) in us.axis_iter_mut(Axis(1)).zip(self.s.iter()) {
            col.mapv_inplace(|x| x * sigma);
        }
        us.dot(&self.v.slice(s![.., ..k]).t())
    }

    /// Number of singular values above `tol · s_max`.
    pub fn rank(&self, tol: T) -> usize {
        let cutoff = self.s.get(0).copied().unwrap_or_else(T::zero) * tol;
        self.s.iter().filter(|&&x| x > cutoff).count()
    }

    pub fn into_parts(self) -> (Matrix<T>, Vector<T>, Matrix<T>) {
        (self.u, self.s, self.v)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SvdSolverBuilder {
    mode: SvdMode,
    max_iterations: usize,
}

impl SvdSolverBuilder {
    pub fn mode(mut self, mode: SvdMode) -> Self {
        self.mode = mode;
        self
    }

    /// QR sweeps allowed per singular value.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> SvdSolver {
        SvdSolver {
            mode: self.mode,
            max_iterations: self.max_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SvdSolver {
    mode: SvdMode,
    max_iterations: usize,
}

impl Default for SvdSolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SvdSolver {
    pub fn builder() -> SvdSolverBuilder {
        SvdSolverBuilder {
            mode: SvdMode::Economy,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn mode(&self) -> SvdMode {
        self.mode
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// # Errors
    /// - [`AlgebraError::Dimension`] for an empty matrix
    /// - [`AlgebraError::Convergence`] when a singular value exhausts its sweep budget
    /// - [`AlgebraError::UnsupportedConfiguration`] for NaN or infinite entries
    pub fn solve<T: FloatOps>(&self, matrix: ArrayView2<T>) -> anyhow::Result<SvdResult<T>> {
        dense::ensure_non_empty(&matrix)?;
        dense::ensure_finite(&matrix)?;
        let (m, n) = matrix.dim();
        debug!("svd: {}x{} ({:?})", m, n, self.mode);

        let (mut u, s, mut v) = if m >= n {
            golub_kahan::decompose(matrix, self.max_iterations)?
        } else {
            let (ut, s, vt) = golub_kahan::decompose(matrix.t(), self.max_iterations)?;
            (vt, s, ut)
        };

        for j in 0..s.len() {
            if dense::canonical_sign(&mut u.column_mut(j)) {
                v.column_mut(j).mapv_inplace(|x| -x);
            }
        }

        if self.mode == SvdMode::Full {
            u = complete_basis(u)?;
            v = complete_basis(v)?;
        }

        Ok(SvdResult { u, s, v })
    }
}

/// Extends orthonormal columns to a square orthonormal basis.
///
/// Each round orthogonalizes every standard basis vector against the columns
/// filled so far and keeps the one with the largest residual, so directions
/// spread over many coordinates are still found.
fn complete_basis<T: FloatOps>(q: Matrix<T>) -> anyhow::Result<Matrix<T>> {
    let (dim, k) = q.dim();
    if k == dim {
        return Ok(q);
    }
    let mut basis = Matrix::zeros((dim, dim));
    basis.slice_mut(s![.., ..k]).assign(&q);
    // every round has a residual of at least 1/sqrt(dim) in exact arithmetic
    let floor = T::constant(0.5) / T::from_count(dim).sqrt();

    for filled in k..dim {
        let mut best: Option<(T, Vector<T>)> = None;
        for candidate in 0..dim {
            let mut w = Vector::zeros(dim);
            w[candidate] = T::one();
            // two passes keep the new column orthogonal in finite precision
            for _ in 0..2 {
                for j in 0..filled {
                    let col = basis.column(j);
                    let proj = col.dot(&w);
                    w.scaled_add(-proj, &col);
                }
            }
            let norm = dense::l2_norm(&w);
            if best.as_ref().map_or(true, |(top, _)| norm > *top) {
                best = Some((norm, w));
            }
        }
        match best {
            Some((norm, mut w)) if norm > floor => {
                w.mapv_inplace(|x| x / norm);
                dense::canonical_sign(&mut w);
                basis.column_mut(filled).assign(&w);
            }
            _ => {
                return Err(AlgebraError::dimension(format!(
                    "could not complete a {}-dimensional basis from {} columns",
                    dim, filled
                ))
                .into())
            }
        }
    }
    Ok(basis)
}

//! # Eigendecomposition
//!
//! Dense eigen solver for square real matrices.
//!
//! - Symmetric input goes through Householder tridiagonalization and
//!   implicit-shift QL iteration.
//! - Other input is reduced to Hessenberg form and iterated to real Schur
//!   form with Francis double shifts. A complex spectrum is reported as
//!   [`AlgebraError::ComplexEigenvalues`].
//!
//! Results are sorted by descending eigenvalue magnitude (ties by descending
//! value). Each eigenvector has unit length and its largest-magnitude
//! component is positive.

mod general;
mod symmetric;

use std::cmp::Ordering;
use std::str::FromStr;

use log::debug;
use ndarray::{s, ArrayView1, ArrayView2};

use crate::dense::{self, Matrix, Vector};
use crate::error::AlgebraError;
use crate::utils::FloatOps;

pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// How the solver decides between the symmetric and the general kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    /// Use the symmetric kernel when the input is symmetric within rounding.
    #[default]
    Auto,
    /// Treat the input as symmetric; only its lower triangle is read.
    Symmetric,
    General,
}

impl FromStr for Symmetry {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Symmetry::Auto),
            "symmetric" => Ok(Symmetry::Symmetric),
            "general" | "nonsymmetric" => Ok(Symmetry::General),
            other => Err(AlgebraError::unsupported(format!("unknown symmetry mode '{}'", other)).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EigenResult<T: FloatOps> {
    eigenvalues: Vector<T>,
    eigenvectors: Matrix<T>,
}

impl<T: FloatOps> EigenResult<T> {
    pub fn eigenvalues(&self) -> &Vector<T> {
        &self.eigenvalues
    }

    /// Eigenvectors as the columns of a square matrix, aligned with [`Self::eigenvalues`].
    pub fn eigenvectors(&self) -> &Matrix<T> {
        &self.eigenvectors
    }

    pub fn eigenvector(&self, index: usize) -> ArrayView1<'_, T> {
        self.eigenvectors.column(index)
    }

    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// The `k` leading eigenvalues and eigenvectors.
    pub fn leading(&self, k: usize) -> (ArrayView1<'_, T>, ArrayView2<'_, T>) {
        let k = k.min(self.len());
        (
            self.eigenvalues.slice(s![..k]),
            self.eigenvectors.slice(s![.., ..k]),
        )
    }

    pub fn into_parts(self) -> (Vector<T>, Matrix<T>) {
        (self.eigenvalues, self.eigenvectors)
    }

    /// Sorts the pairs, normalizes every vector and fixes its sign.
    fn canonical(values: Vector<T>, vectors: Matrix<T>) -> Self {
        let n = values.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let (x, y) = (values[a], values[b]);
            num_traits::Float::abs(y)
                .partial_cmp(&num_traits::Float::abs(x))
                .unwrap_or(Ordering::Equal)
                .then_with(|| y.partial_cmp(&x).unwrap_or(Ordering::Equal))
        });

        let eigenvalues = Vector::from_iter(order.iter().map(|&i| values[i]));
        let mut eigenvectors = Matrix::zeros((n, n));
        for (dst, &src) in order.iter().enumerate() {
            let mut col = eigenvectors.column_mut(dst);
            col.assign(&vectors.column(src));
            dense::unit_normalize(&mut col);
            dense::canonical_sign(&mut col);
        }
        EigenResult {
            eigenvalues,
            eigenvectors,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EigenSolverBuilder {
    max_iterations: usize,
    symmetry: Symmetry,
}

impl EigenSolverBuilder {
    /// Iteration budget per eigenvalue before the solver reports non-convergence.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn build(self) -> EigenSolver {
        EigenSolver {
            max_iterations: self.max_iterations,
            symmetry: self.symmetry,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EigenSolver {
    max_iterations: usize,
    symmetry: Symmetry,
}

impl Default for EigenSolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EigenSolver {
    pub fn builder() -> EigenSolverBuilder {
        EigenSolverBuilder {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            symmetry: Symmetry::Auto,
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Decomposes a square matrix into eigenvalues and unit eigenvectors.
    ///
    /// # Errors
    /// - [`AlgebraError::Dimension`] for empty or non-square input
    /// - [`AlgebraError::Convergence`] when the iteration budget runs out
    /// - [`AlgebraError::ComplexEigenvalues`] for a non-symmetric matrix with a complex spectrum
    /// - [`AlgebraError::UnsupportedConfiguration`] for NaN or infinite entries
    pub fn solve<T: FloatOps>(&self, matrix: ArrayView2<T>) -> anyhow::Result<EigenResult<T>> {
        let n = dense::ensure_square(&matrix, "eigendecomposition")?;
        dense::ensure_finite(&matrix)?;

        let use_symmetric = match self.symmetry {
            Symmetry::Symmetric => true,
            Symmetry::General => false,
            Symmetry::Auto => {
                dense::is_symmetric(&matrix, <T as num_traits::Float>::epsilon() * T::constant(1024.0))
            }
        };
        debug!(
            "eigen solve: n = {}, kernel = {}",
            n,
            if use_symmetric { "symmetric" } else { "general" }
        );

        let (values, vectors) = if use_symmetric {
            symmetric::decompose(matrix, self.max_iterations)?
        } else {
            general::decompose(matrix, self.max_iterations)?
        };
        Ok(EigenResult::canonical(values, vectors))
    }
}

//! Power iteration for the dominant (Perron) eigenvector of a square matrix.

use log::{debug, warn};
use ndarray::ArrayView2;

use crate::dense::{self, Vector};
use crate::utils::FloatOps;

/// Outcome of a power iteration run.
#[derive(Debug, Clone)]
pub struct PerronFrobenius<T: FloatOps> {
    /// Unit-norm estimate of the dominant eigenvector.
    pub vector: Vector<T>,
    /// Rayleigh quotient `vᵀ A v` of the final iterate.
    pub eigenvalue: T,
    /// Multiplications actually performed.
    pub iterations: usize,
}

impl<T: FloatOps> PerronFrobenius<T> {
    /// Runs exactly `iterations` steps of `v ← A v / ‖A v‖` from the all-ones vector.
    ///
    /// Stops early only if an iterate collapses to zero, in which case the last
    /// non-zero iterate is kept. Accuracy is whatever the iteration count
    /// yields; no convergence test is made.
    pub fn run(matrix: ArrayView2<T>, iterations: usize) -> anyhow::Result<Self> {
        let n = dense::ensure_square(&matrix, "Perron-Frobenius iteration")?;
        if matrix.iter().any(|&x| x < T::zero()) {
            warn!("Perron-Frobenius iteration on a matrix with negative entries");
        }

        let mut v = Vector::from_elem(n, T::one());
        dense::unit_normalize(&mut v);

        let mut done = 0;
        for _ in 0..iterations {
            let mut next = matrix.dot(&v);
            let norm = dense::unit_normalize(&mut next);
            if norm == T::zero() || !num_traits::Float::is_finite(norm) {
                debug!("power iterate vanished after {} steps", done);
                break;
            }
            v = next;
            done += 1;
        }

        let eigenvalue = v.dot(&matrix.dot(&v));
        Ok(PerronFrobenius {
            vector: v,
            eigenvalue,
            iterations: done,
        })
    }
}

/// Dominant eigenvector estimate after `iterations` power steps.
pub fn perron_frobenius<T: FloatOps>(
    matrix: ArrayView2<T>,
    iterations: usize,
) -> anyhow::Result<Vector<T>> {
    PerronFrobenius::run(matrix, iterations).map(|pf| pf.vector)
}

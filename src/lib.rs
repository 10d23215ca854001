pub mod clustering;
pub mod dense;
pub mod dimred;
pub mod eigen;
pub mod error;
pub mod perron;
pub mod random;
pub mod similarity;
pub mod svd;
mod utils;

pub use utils::Direction;
pub use utils::FloatOps;

pub use dense::{Matrix, Vector};
pub use eigen::{EigenResult, EigenSolver};
pub use error::AlgebraError;
pub use perron::perron_frobenius;
pub use random::{Distribution, DistributionKind, Sampler};
pub use svd::{SvdResult, SvdSolver};

use ndarray::ArrayView2;

/// Eigen-decomposition with the default solver settings.
pub fn eigen<T: FloatOps>(matrix: ArrayView2<T>) -> anyhow::Result<EigenResult<T>> {
    EigenSolver::default().solve(matrix)
}

/// Economy-size SVD with the default solver settings.
pub fn svd<T: FloatOps>(matrix: ArrayView2<T>) -> anyhow::Result<SvdResult<T>> {
    SvdSolver::default().solve(matrix)
}

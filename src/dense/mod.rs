//! Dense matrix and vector primitives shared by the solvers.
//!
//! Matrices are plain row-major [`ndarray::Array2`] values; every solver
//! validates the shape it needs on entry through the `ensure_*` helpers.

use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, DataMut, Ix1, Zip};
use rayon::prelude::*;

use crate::error::AlgebraError;
use crate::utils::{Direction, FloatOps};

pub type Matrix<T> = Array2<T>;
pub type Vector<T> = Array1<T>;

/// Fails with a dimension error if the matrix has no rows or no columns.
pub fn ensure_non_empty<T>(m: &ArrayView2<T>) -> anyhow::Result<()> {
    if m.nrows() == 0 || m.ncols() == 0 {
        return Err(AlgebraError::dimension(format!(
            "matrix must be non-empty, got {}x{}",
            m.nrows(),
            m.ncols()
        ))
        .into());
    }
    Ok(())
}

/// Returns the order of a non-empty square matrix.
pub fn ensure_square<T>(m: &ArrayView2<T>, what: &str) -> anyhow::Result<usize> {
    ensure_non_empty(m)?;
    if m.nrows() != m.ncols() {
        return Err(AlgebraError::dimension(format!(
            "{} requires a square matrix, got {}x{}",
            what,
            m.nrows(),
            m.ncols()
        ))
        .into());
    }
    Ok(m.nrows())
}

pub fn ensure_finite<T: FloatOps>(m: &ArrayView2<T>) -> anyhow::Result<()> {
    if m.iter().any(|x| !num_traits::Float::is_finite(*x)) {
        return Err(AlgebraError::unsupported("matrix contains NaN or infinite entries").into());
    }
    Ok(())
}

/// Symmetry test with tolerance relative to the largest absolute entry.
pub fn is_symmetric<T: FloatOps>(m: &ArrayView2<T>, rel_tol: T) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let scale = m.iter().fold(T::zero(), |acc, &x| num_traits::Float::max(acc, num_traits::Float::abs(x)));
    let tol = rel_tol * num_traits::Float::max(scale, T::one());
    let n = m.nrows();
    (0..n).all(|i| (i + 1..n).all(|j| num_traits::Float::abs(m[[i, j]] - m[[j, i]]) <= tol))
}

pub fn column_means<T: FloatOps>(m: &ArrayView2<T>) -> anyhow::Result<Vector<T>> {
    ensure_non_empty(m)?;
    let n = T::from_count(m.nrows());
    Ok(m.sum_axis(Axis(0)).mapv(|s| s / n))
}

pub fn row_means<T: FloatOps>(m: &ArrayView2<T>) -> anyhow::Result<Vector<T>> {
    ensure_non_empty(m)?;
    let n = T::from_count(m.ncols());
    Ok(m.sum_axis(Axis(1)).mapv(|s| s / n))
}

/// Removes the row or column means; returns the centered copy and the removed means.
///
/// `Direction::COLUMN` subtracts each column's mean (observations in rows),
/// `Direction::ROW` subtracts each row's mean.
pub fn center<T: FloatOps>(
    m: &ArrayView2<T>,
    direction: Direction,
) -> anyhow::Result<(Matrix<T>, Vector<T>)> {
    let mut centered = m.to_owned();
    match direction {
        Direction::COLUMN => {
            let means = column_means(m)?;
            centered
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .for_each(|mut row| {
                    row -= &means;
                });
            Ok((centered, means))
        }
        Direction::ROW => {
            let means = row_means(m)?;
            centered
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(i, mut row)| {
                    let mean = means[i];
                    row.mapv_inplace(|x| x - mean);
                });
            Ok((centered, means))
        }
    }
}

/// Sample covariance of observations stored in rows, with `n - 1` denominator.
pub fn covariance<T: FloatOps>(m: &ArrayView2<T>) -> anyhow::Result<Matrix<T>> {
    ensure_non_empty(m)?;
    if m.nrows() < 2 {
        return Err(AlgebraError::dimension(format!(
            "covariance needs at least two observations, got {}",
            m.nrows()
        ))
        .into());
    }
    let (centered, _) = center(m, Direction::COLUMN)?;
    let denom = T::from_count(m.nrows() - 1);
    Ok(centered.t().dot(&centered).mapv(|x| x / denom))
}

/// Double centering `-½ J A J` with `J = I - 11ᵀ/n`.
pub fn double_center<T: FloatOps>(m: &ArrayView2<T>) -> anyhow::Result<Matrix<T>> {
    let n = ensure_square(m, "double centering")?;
    let nt = T::from_count(n);
    let row_mean = m.sum_axis(Axis(1)).mapv(|s| s / nt);
    let col_mean = m.sum_axis(Axis(0)).mapv(|s| s / nt);
    let grand = row_mean.sum() / nt;
    let half = T::constant(-0.5);
    let mut out = Matrix::zeros((n, n));
    Zip::indexed(&mut out).and(m).for_each(|(i, j), o, &a| {
        *o = half * (a - row_mean[i] - col_mean[j] + grand);
    });
    Ok(out)
}

pub fn l2_norm<T: FloatOps, S: Data<Elem = T>>(v: &ArrayBase<S, Ix1>) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc.hypot(x))
}

/// Scales `v` to unit length in place and returns its former norm.
/// A zero vector is left untouched.
pub fn unit_normalize<T: FloatOps, S: DataMut<Elem = T>>(v: &mut ArrayBase<S, Ix1>) -> T {
    let norm = l2_norm(v);
    if norm > T::zero() {
        v.mapv_inplace(|x| x / norm);
    }
    norm
}

/// Flips `v` so its largest-magnitude component is positive; returns whether it flipped.
pub fn canonical_sign<T: FloatOps, S: DataMut<Elem = T>>(v: &mut ArrayBase<S, Ix1>) -> bool {
    let mut pivot = T::zero();
    for &x in v.iter() {
        if num_traits::Float::abs(x) > num_traits::Float::abs(pivot) {
            pivot = x;
        }
    }
    if pivot < T::zero() {
        v.mapv_inplace(|x| -x);
        true
    } else {
        false
    }
}

/// Squared Euclidean distance between the rows of a coordinate matrix.
pub(crate) fn squared_row_distance<T: FloatOps>(m: &ArrayView2<T>, i: usize, j: usize) -> T {
    m.row(i)
        .iter()
        .zip(m.row(j).iter())
        .fold(T::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b))
}

//! Householder tridiagonalization followed by implicit-shift QL iteration.

use log::trace;
use ndarray::{Array1, Array2, ArrayView2};

use crate::error::AlgebraError;
use crate::utils::FloatOps;

/// Eigen-decomposes a symmetric matrix; only the lower triangle is trusted.
///
/// Returns the unsorted eigenvalues and the orthogonal matrix whose columns
/// are the corresponding eigenvectors.
pub(crate) fn decompose<T: FloatOps>(
    a: ArrayView2<T>,
    max_iterations: usize,
) -> anyhow::Result<(Array1<T>, Array2<T>)> {
    let n = a.nrows();
    let mut v = a.to_owned();
    let mut d = Array1::zeros(n);
    let mut e = Array1::zeros(n);
    tridiagonalize(&mut v, &mut d, &mut e);
    ql_implicit(&mut v, &mut d, &mut e, max_iterations)?;
    Ok((d, v))
}

/// Reduces `v` in place to the orthogonal factor of `Qᵀ A Q = T`, leaving the
/// diagonal of `T` in `d` and its sub-diagonal in `e[1..]`.
fn tridiagonalize<T: FloatOps>(v: &mut Array2<T>, d: &mut Array1<T>, e: &mut Array1<T>) {
    let n = v.nrows();
    let zero = T::zero();

    for j in 0..n {
        d[j] = v[[n - 1, j]];
    }

    for i in (1..n).rev() {
        let mut scale = zero;
        let mut h = zero;
        for k in 0..i {
            scale += num_traits::Float::abs(d[k]);
        }

        if scale == zero {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[[i - 1, j]];
                v[[i, j]] = zero;
                v[[j, i]] = zero;
            }
        } else {
            for k in 0..i {
                d[k] /= scale;
                h += d[k] * d[k];
            }
            let mut f = d[i - 1];
            let mut g = h.sqrt();
            if f > zero {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            for j in 0..i {
                e[j] = zero;
            }

            for j in 0..i {
                f = d[j];
                v[[j, i]] = f;
                g = e[j] + v[[j, j]] * f;
                for k in (j + 1)..i {
                    g += v[[k, j]] * d[k];
                    e[k] += v[[k, j]] * f;
                }
                e[j] = g;
            }

            f = zero;
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    let delta = f * e[k] + g * d[k];
                    v[[k, j]] -= delta;
                }
                d[j] = v[[i - 1, j]];
                v[[i, j]] = zero;
            }
        }
        d[i] = h;
    }

    // accumulate transformations
    for i in 0..n.saturating_sub(1) {
        v[[n - 1, i]] = v[[i, i]];
        v[[i, i]] = T::one();
        let h = d[i + 1];
        if h != zero {
            for k in 0..=i {
                d[k] = v[[k, i + 1]] / h;
            }
            for j in 0..=i {
                let mut g = zero;
                for k in 0..=i {
                    g += v[[k, i + 1]] * v[[k, j]];
                }
                for k in 0..=i {
                    let delta = g * d[k];
                    v[[k, j]] -= delta;
                }
            }
        }
        for k in 0..=i {
            v[[k, i + 1]] = zero;
        }
    }
    for j in 0..n {
        d[j] = v[[n - 1, j]];
        v[[n - 1, j]] = zero;
    }
    v[[n - 1, n - 1]] = T::one();
    e[0] = zero;
}

/// Diagonalizes the tridiagonal matrix `(d, e)`, rotating the columns of `v` along.
fn ql_implicit<T: FloatOps>(
    v: &mut Array2<T>,
    d: &mut Array1<T>,
    e: &mut Array1<T>,
    max_iterations: usize,
) -> anyhow::Result<()> {
    let n = d.len();
    let zero = T::zero();
    let one = T::one();
    let two = T::constant(2.0);
    let eps = <T as num_traits::Float>::epsilon();

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = zero;

    let mut f = zero;
    let mut tst1 = zero;

    for l in 0..n {
        tst1 = num_traits::Float::max(tst1, num_traits::Float::abs(d[l]) + num_traits::Float::abs(e[l]));
        let mut m = l;
        while m < n - 1 && num_traits::Float::abs(e[m]) > eps * tst1 {
            m += 1;
        }

        if m > l {
            let mut iter = 0;
            loop {
                if iter >= max_iterations {
                    return Err(AlgebraError::convergence("symmetric QL", max_iterations).into());
                }
                iter += 1;

                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (two * e[l]);
                let mut r = p.hypot(one);
                if p < zero {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for i in (l + 2)..n {
                    d[i] -= h;
                }
                f += h;

                p = d[m];
                let mut c = one;
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = zero;
                let mut s2 = zero;
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    r = p.hypot(e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);

                    for k in 0..n {
                        let vk1 = v[[k, i + 1]];
                        let vk = v[[k, i]];
                        v[[k, i + 1]] = s * vk + c * vk1;
                        v[[k, i]] = c * vk - s * vk1;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if num_traits::Float::abs(e[l]) <= eps * tst1 {
                    break;
                }
            }
            trace!("QL deflated eigenvalue {} after {} sweeps", l, iter);
        }
        d[l] += f;
        e[l] = zero;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_decompose_reconstructs() {
        let a = array![
            [4.0, 1.0, -2.0, 2.0],
            [1.0, 2.0, 0.0, 1.0],
            [-2.0, 0.0, 3.0, -2.0],
            [2.0, 1.0, -2.0, -1.0]
        ];
        let (d, v) = decompose(a.view(), 64).unwrap();
        let rebuilt = v.dot(&Array2::from_diag(&d)).dot(&v.t());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-10);
        }
        let gram = v.t().dot(&v);
        for ((i, j), x) in gram.indexed_iter() {
            assert_abs_diff_eq!(*x, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_single_element() {
        let (d, v) = decompose(array![[-3.5f64]].view(), 64).unwrap();
        assert_eq!(d[0], -3.5);
        assert_eq!(v[[0, 0]], 1.0);
    }

    #[test]
    fn test_budget_exhausted() {
        let err = decompose(array![[2.0, 1.0], [1.0, 2.0]].view(), 0).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Convergence { .. })
        ));
    }
}

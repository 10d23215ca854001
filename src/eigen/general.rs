//! Orthogonal Hessenberg reduction and shifted double QR for real
//! non-symmetric matrices.

use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView2};

use crate::error::AlgebraError;
use crate::utils::FloatOps;

/// Eigen-decomposes a real square matrix whose spectrum is real.
///
/// Complex conjugate pairs are detected after the Schur iteration and
/// reported through [`AlgebraError::ComplexEigenvalues`].
pub(crate) fn decompose<T: FloatOps>(
    a: ArrayView2<T>,
    max_iterations: usize,
) -> anyhow::Result<(Array1<T>, Array2<T>)> {
    let n = a.nrows();
    let mut h = a.to_owned();
    let mut v = Array2::eye(n);
    hessenberg(&mut h, &mut v);

    let mut d = Array1::zeros(n);
    let mut e = Array1::zeros(n);
    let norm = schur(&mut h, &mut v, &mut d, &mut e, max_iterations)?;

    if e.iter().any(|&im| im != T::zero()) {
        let eigenvalues: Vec<(f64, f64)> = d
            .iter()
            .zip(e.iter())
            .map(|(&re, &im)| (re.as_f64(), im.as_f64()))
            .collect();
        debug!("general eigen solve found complex spectrum {:?}", eigenvalues);
        return Err(AlgebraError::ComplexEigenvalues { eigenvalues }.into());
    }

    back_substitute(&mut h, &mut v, &d, norm);
    Ok((d, v))
}

/// Householder similarity reduction `Vᵀ A V = H` to upper Hessenberg form.
fn hessenberg<T: FloatOps>(h: &mut Array2<T>, v: &mut Array2<T>) {
    let n = h.nrows();
    let high = n - 1;
    let zero = T::zero();
    let mut ort = Array1::<T>::zeros(n);

    for m in 1..high {
        let mut scale = zero;
        for i in m..=high {
            scale += num_traits::Float::abs(h[[i, m - 1]]);
        }
        if scale == zero {
            continue;
        }

        let mut hh = zero;
        for i in (m..=high).rev() {
            ort[i] = h[[i, m - 1]] / scale;
            hh += ort[i] * ort[i];
        }
        let mut g = hh.sqrt();
        if ort[m] > zero {
            g = -g;
        }
        hh -= ort[m] * g;
        ort[m] -= g;

        for j in m..n {
            let mut f = zero;
            for i in (m..=high).rev() {
                f += ort[i] * h[[i, j]];
            }
            f /= hh;
            for i in m..=high {
                h[[i, j]] -= f * ort[i];
            }
        }
        for i in 0..=high {
            let mut f = zero;
            for j in (m..=high).rev() {
                f += ort[j] * h[[i, j]];
            }
            f /= hh;
            for j in m..=high {
                h[[i, j]] -= f * ort[j];
            }
        }
        ort[m] = scale * ort[m];
        h[[m, m - 1]] = scale * g;
    }

    for m in (1..high).rev() {
        if h[[m, m - 1]] == zero {
            continue;
        }
        for i in (m + 1)..=high {
            ort[i] = h[[i, m - 1]];
        }
        for j in m..=high {
            let mut g = zero;
            for i in m..=high {
                g += ort[i] * v[[i, j]];
            }
            // two divisions avoid underflow
            g = (g / ort[m]) / h[[m, m - 1]];
            for i in m..=high {
                v[[i, j]] += g * ort[i];
            }
        }
    }
}

/// Reduces the Hessenberg matrix to real Schur form, storing eigenvalues as
/// `d + i e`. Returns the matrix norm used by back-substitution.
fn schur<T: FloatOps>(
    h: &mut Array2<T>,
    v: &mut Array2<T>,
    d: &mut Array1<T>,
    e: &mut Array1<T>,
    max_iterations: usize,
) -> anyhow::Result<T> {
    let nn = h.nrows();
    let high = nn - 1;
    let zero = T::zero();
    let eps = <T as num_traits::Float>::epsilon();
    let half = T::constant(0.5);
    let mut exshift = zero;
    // written before any read within one pass
    let mut p: T;
    let mut q: T;
    let mut r: T;
    let mut s: T;
    let mut z: T;

    let mut norm = zero;
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += num_traits::Float::abs(h[[i, j]]);
        }
    }

    let mut n = high;
    let mut iter = 0usize;
    loop {
        // look for a single small sub-diagonal element
        let mut l = n;
        while l > 0 {
            let mut scale = num_traits::Float::abs(h[[l - 1, l - 1]]) + num_traits::Float::abs(h[[l, l]]);
            if scale == zero {
                scale = norm;
            }
            if num_traits::Float::abs(h[[l, l - 1]]) < eps * scale {
                break;
            }
            l -= 1;
        }

        if l == n {
            h[[n, n]] += exshift;
            d[n] = h[[n, n]];
            e[n] = zero;
            trace!("Schur iteration isolated root {} after {} sweeps", n, iter);
            iter = 0;
            if n == 0 {
                break;
            }
            n -= 1;
        } else if l + 1 == n {
            let w = h[[n, n - 1]] * h[[n - 1, n]];
            p = (h[[n - 1, n - 1]] - h[[n, n]]) * half;
            q = p * p + w;
            z = num_traits::Float::abs(q).sqrt();
            h[[n, n]] += exshift;
            h[[n - 1, n - 1]] += exshift;
            let x = h[[n, n]];

            if q >= zero {
                z = if p >= zero { p + z } else { p - z };
                d[n - 1] = x + z;
                d[n] = d[n - 1];
                if z != zero {
                    d[n] = x - w / z;
                }
                e[n - 1] = zero;
                e[n] = zero;

                let x = h[[n, n - 1]];
                s = num_traits::Float::abs(x) + num_traits::Float::abs(z);
                p = x / s;
                q = z / s;
                r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;

                for j in (n - 1)..nn {
                    z = h[[n - 1, j]];
                    h[[n - 1, j]] = q * z + p * h[[n, j]];
                    h[[n, j]] = q * h[[n, j]] - p * z;
                }
                for i in 0..=n {
                    z = h[[i, n - 1]];
                    h[[i, n - 1]] = q * z + p * h[[i, n]];
                    h[[i, n]] = q * h[[i, n]] - p * z;
                }
                for i in 0..=high {
                    z = v[[i, n - 1]];
                    v[[i, n - 1]] = q * z + p * v[[i, n]];
                    v[[i, n]] = q * v[[i, n]] - p * z;
                }
            } else {
                d[n - 1] = x + p;
                d[n] = x + p;
                e[n - 1] = z;
                e[n] = -z;
            }
            trace!("Schur iteration isolated pair {} after {} sweeps", n, iter);
            iter = 0;
            if n < 2 {
                break;
            }
            n -= 2;
        } else {
            if iter >= max_iterations {
                return Err(AlgebraError::convergence("Hessenberg QR", max_iterations).into());
            }

            let mut x = h[[n, n]];
            let mut y = zero;
            let mut w = zero;
            if l < n {
                y = h[[n - 1, n - 1]];
                w = h[[n, n - 1]] * h[[n - 1, n]];
            }

            // exceptional shifts
            if iter == 10 {
                exshift += x;
                for i in 0..=n {
                    h[[i, i]] -= x;
                }
                s = num_traits::Float::abs(h[[n, n - 1]]) + num_traits::Float::abs(h[[n - 1, n - 2]]);
                x = T::constant(0.75) * s;
                y = x;
                w = T::constant(-0.4375) * s * s;
            }
            if iter == 30 {
                s = (y - x) * half;
                s = s * s + w;
                if s > zero {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) * half + s);
                    for i in 0..=n {
                        h[[i, i]] -= s;
                    }
                    exshift += s;
                    x = T::constant(0.964);
                    y = x;
                    w = x;
                }
            }
            iter += 1;

            // look for two consecutive small sub-diagonal elements
            let mut m = n - 2;
            loop {
                z = h[[m, m]];
                r = x - z;
                s = y - z;
                p = (r * s - w) / h[[m + 1, m]] + h[[m, m + 1]];
                q = h[[m + 1, m + 1]] - z - r - s;
                r = h[[m + 2, m + 1]];
                s = num_traits::Float::abs(p) + num_traits::Float::abs(q) + num_traits::Float::abs(r);
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                let lhs = num_traits::Float::abs(h[[m, m - 1]]) * (num_traits::Float::abs(q) + num_traits::Float::abs(r));
                let rhs = eps * (num_traits::Float::abs(p) * (num_traits::Float::abs(h[[m - 1, m - 1]]) + num_traits::Float::abs(z) + num_traits::Float::abs(h[[m + 1, m + 1]])));
                if lhs < rhs {
                    break;
                }
                m -= 1;
            }

            for i in (m + 2)..=n {
                h[[i, i - 2]] = zero;
                if i > m + 2 {
                    h[[i, i - 3]] = zero;
                }
            }

            // double QR step on rows l..=n and columns m..=n
            for k in m..n {
                let notlast = k != n - 1;
                if k != m {
                    p = h[[k, k - 1]];
                    q = h[[k + 1, k - 1]];
                    r = if notlast { h[[k + 2, k - 1]] } else { zero };
                    x = num_traits::Float::abs(p) + num_traits::Float::abs(q) + num_traits::Float::abs(r);
                    if x == zero {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }

                s = (p * p + q * q + r * r).sqrt();
                if p < zero {
                    s = -s;
                }
                if s == zero {
                    continue;
                }

                if k != m {
                    h[[k, k - 1]] = -s * x;
                } else if l != m {
                    h[[k, k - 1]] = -h[[k, k - 1]];
                }
                p += s;
                x = p / s;
                y = q / s;
                z = r / s;
                q /= p;
                r /= p;

                for j in k..nn {
                    p = h[[k, j]] + q * h[[k + 1, j]];
                    if notlast {
                        p += r * h[[k + 2, j]];
                        h[[k + 2, j]] -= p * z;
                    }
                    h[[k, j]] -= p * x;
                    h[[k + 1, j]] -= p * y;
                }
                for i in 0..=n.min(k + 3) {
                    p = x * h[[i, k]] + y * h[[i, k + 1]];
                    if notlast {
                        p += z * h[[i, k + 2]];
                        h[[i, k + 2]] -= p * r;
                    }
                    h[[i, k]] -= p;
                    h[[i, k + 1]] -= p * q;
                }
                for i in 0..=high {
                    p = x * v[[i, k]] + y * v[[i, k + 1]];
                    if notlast {
                        p += z * v[[i, k + 2]];
                        v[[i, k + 2]] -= p * r;
                    }
                    v[[i, k]] -= p;
                    v[[i, k + 1]] -= p * q;
                }
            }
        }
    }
    Ok(norm)
}

/// Solves the upper triangular Schur form for eigenvectors and maps them back
/// through `v`. Requires a real spectrum.
fn back_substitute<T: FloatOps>(h: &mut Array2<T>, v: &mut Array2<T>, d: &Array1<T>, norm: T) {
    let nn = h.nrows();
    let zero = T::zero();
    let eps = <T as num_traits::Float>::epsilon();
    if norm == zero {
        return;
    }

    for n in (0..nn).rev() {
        let p = d[n];
        h[[n, n]] = T::one();
        for i in (0..n).rev() {
            let w = h[[i, i]] - p;
            let mut r = zero;
            for j in (i + 1)..=n {
                r += h[[i, j]] * h[[j, n]];
            }
            h[[i, n]] = if w != zero { -r / w } else { -r / (eps * norm) };

            let t = num_traits::Float::abs(h[[i, n]]);
            if (eps * t) * t > T::one() {
                for j in i..=n {
                    h[[j, n]] /= t;
                }
            }
        }
    }

    for j in (0..nn).rev() {
        for i in 0..nn {
            let mut z = zero;
            for k in 0..=j {
                z += v[[i, k]] * h[[k, j]];
            }
            v[[i, j]] = z;
        }
    }
}

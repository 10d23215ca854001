//! Householder bidiagonalization and implicit-shift Golub-Kahan QR sweeps.

use log::trace;
use ndarray::{Array1, Array2, ArrayView2};

use crate::error::AlgebraError;
use crate::utils::FloatOps;

/// Thin decomposition of a tall matrix (`m >= n`).
///
/// Returns `u` (`m×n`), the singular values in descending order and `v`
/// (`n×n`) with `a = u · diag(s) · vᵀ`.
pub(crate) fn decompose<T: FloatOps>(
    a: ArrayView2<T>,
    max_iterations: usize,
) -> anyhow::Result<(Array2<T>, Array1<T>, Array2<T>)> {
    let (m, n) = a.dim();
    debug_assert!(m >= n);
    let zero = T::zero();
    let one = T::one();

    let mut a = a.to_owned();
    let mut s = Array1::<T>::zeros(n);
    let mut e = Array1::<T>::zeros(n);
    let mut work = Array1::<T>::zeros(m);
    let mut u = Array2::<T>::zeros((m, n));
    let mut v = Array2::<T>::zeros((n, n));

    let nct = (m - 1).min(n);
    let nrt = (n as isize - 2).min(m as isize).max(0) as usize;

    // bidiagonalize: diagonal in s, super-diagonal in e
    for k in 0..nct.max(nrt) {
        if k < nct {
            s[k] = zero;
            for i in k..m {
                s[k] = s[k].hypot(a[[i, k]]);
            }
            if s[k] != zero {
                if a[[k, k]] < zero {
                    s[k] = -s[k];
                }
                for i in k..m {
                    a[[i, k]] /= s[k];
                }
                a[[k, k]] += one;
            }
            s[k] = -s[k];
        }
        for j in (k + 1)..n {
            if k < nct && s[k] != zero {
                let mut t = zero;
                for i in k..m {
                    t += a[[i, k]] * a[[i, j]];
                }
                t = -t / a[[k, k]];
                for i in k..m {
                    let delta = t * a[[i, k]];
                    a[[i, j]] += delta;
                }
            }
            e[j] = a[[k, j]];
        }
        if k < nct {
            for i in k..m {
                u[[i, k]] = a[[i, k]];
            }
        }
        if k < nrt {
            e[k] = zero;
            for i in (k + 1)..n {
                e[k] = e[k].hypot(e[i]);
            }
            if e[k] != zero {
                if e[k + 1] < zero {
                    e[k] = -e[k];
                }
                let ek = e[k];
                for i in (k + 1)..n {
                    e[i] /= ek;
                }
                e[k + 1] += one;
            }
            e[k] = -e[k];
            if k + 1 < m && e[k] != zero {
                for i in (k + 1)..m {
                    work[i] = zero;
                }
                for j in (k + 1)..n {
                    for i in (k + 1)..m {
                        work[i] += e[j] * a[[i, j]];
                    }
                }
                for j in (k + 1)..n {
                    let t = -e[j] / e[k + 1];
                    for i in (k + 1)..m {
                        a[[i, j]] += t * work[i];
                    }
                }
            }
            for i in (k + 1)..n {
                v[[i, k]] = e[i];
            }
        }
    }

    let mut p = n;
    if nct < n {
        s[nct] = a[[nct, nct]];
    }
    if nrt + 1 < p {
        e[nrt] = a[[nrt, p - 1]];
    }
    e[p - 1] = zero;

    // accumulate left reflectors
    for j in nct..n {
        for i in 0..m {
            u[[i, j]] = zero;
        }
        u[[j, j]] = one;
    }
    for k in (0..nct).rev() {
        if s[k] != zero {
            for j in (k + 1)..n {
                let mut t = zero;
                for i in k..m {
                    t += u[[i, k]] * u[[i, j]];
                }
                t = -t / u[[k, k]];
                for i in k..m {
                    let delta = t * u[[i, k]];
                    u[[i, j]] += delta;
                }
            }
            for i in k..m {
                u[[i, k]] = -u[[i, k]];
            }
            u[[k, k]] += one;
            for i in 0..k {
                u[[i, k]] = zero;
            }
        } else {
            for i in 0..m {
                u[[i, k]] = zero;
            }
            u[[k, k]] = one;
        }
    }

    // accumulate right reflectors
    for k in (0..n).rev() {
        if k < nrt && e[k] != zero {
            for j in (k + 1)..n {
                let mut t = zero;
                for i in (k + 1)..n {
                    t += v[[i, k]] * v[[i, j]];
                }
                t = -t / v[[k + 1, k]];
                for i in (k + 1)..n {
                    let delta = t * v[[i, k]];
                    v[[i, j]] += delta;
                }
            }
        }
        for i in 0..n {
            v[[i, k]] = zero;
        }
        v[[k, k]] = one;
    }

    let pp = p - 1;
    let eps = <T as num_traits::Float>::epsilon();
    let tiny = <T as num_traits::Float>::min_positive_value() / eps;
    let mut iter = 0usize;

    while p > 0 {
        // find the largest k with a negligible super-diagonal element
        let mut k = p as isize - 2;
        while k >= 0 {
            let ku = k as usize;
            if num_traits::Float::abs(e[ku]) <= tiny + eps * (num_traits::Float::abs(s[ku]) + num_traits::Float::abs(s[ku + 1])) {
                e[ku] = zero;
                break;
            }
            k -= 1;
        }

        let kase;
        if k == p as isize - 2 {
            kase = Sweep::Converged;
        } else {
            let mut ks = p as isize - 1;
            while ks > k {
                let ksu = ks as usize;
                let mut t = num_traits::Float::abs(e[ksu]);
                if ks != k + 1 {
                    t += num_traits::Float::abs(e[ksu - 1]);
                }
                if num_traits::Float::abs(s[ksu]) <= tiny + eps * t {
                    s[ksu] = zero;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                kase = Sweep::QrStep;
            } else if ks == p as isize - 1 {
                kase = Sweep::DeflateLast;
            } else {
                kase = Sweep::Split;
                k = ks;
            }
        }
        let k = (k + 1) as usize;

        match kase {
            Sweep::DeflateLast => {
                let mut f = e[p - 2];
                e[p - 2] = zero;
                for j in (k..=p - 2).rev() {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] = cs * e[j - 1];
                    }
                    rotate_columns(&mut v, j, p - 1, cs, sn);
                }
            }
            Sweep::Split => {
                let mut f = e[k - 1];
                e[k - 1] = zero;
                for j in k..p {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] = cs * e[j];
                    rotate_columns(&mut u, j, k - 1, cs, sn);
                }
            }
            Sweep::QrStep => {
                if iter >= max_iterations {
                    return Err(AlgebraError::convergence("Golub-Kahan SVD", max_iterations).into());
                }

                let scale = num_traits::Float::max(num_traits::Float::max(num_traits::Float::max(num_traits::Float::max(num_traits::Float::abs(s[p - 1]), num_traits::Float::abs(s[p - 2])), num_traits::Float::abs(e[p - 2])), num_traits::Float::abs(s[k])), num_traits::Float::abs(e[k]));
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) * T::constant(0.5);
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = zero;
                if b != zero || c != zero {
                    shift = (b * b + c).sqrt();
                    if b < zero {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                // chase the bulge
                for j in k..(p - 1) {
                    let t = f.hypot(g);
                    let cs = f / t;
                    let sn = g / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    g = sn * s[j + 1];
                    s[j + 1] = cs * s[j + 1];
                    rotate_columns(&mut v, j, j + 1, cs, sn);

                    let t = f.hypot(g);
                    let cs = f / t;
                    let sn = g / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    g = sn * e[j + 1];
                    e[j + 1] = cs * e[j + 1];
                    if j < m - 1 {
                        rotate_columns(&mut u, j, j + 1, cs, sn);
                    }
                }
                e[p - 2] = f;
                iter += 1;
            }
            Sweep::Converged => {
                let mut k = k;
                if s[k] <= zero {
                    s[k] = if s[k] < zero { -s[k] } else { zero };
                    for i in 0..=pp {
                        v[[i, k]] = -v[[i, k]];
                    }
                }
                while k < pp && s[k] < s[k + 1] {
                    s.swap(k, k + 1);
                    swap_columns(&mut v, k, k + 1);
                    swap_columns(&mut u, k, k + 1);
                    k += 1;
                }
                trace!("singular value {} converged after {} sweeps", p - 1, iter);
                iter = 0;
                p -= 1;
            }
        }
    }

    Ok((u, s, v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    DeflateLast,
    Split,
    QrStep,
    Converged,
}

/// Applies the plane rotation `(cs, sn)` to columns `a` and `b`:
/// `col_a ← cs·col_a + sn·col_b`, `col_b ← cs·col_b − sn·col_a`.
fn rotate_columns<T: FloatOps>(x: &mut Array2<T>, a: usize, b: usize, cs: T, sn: T) {
    for i in 0..x.nrows() {
        let xa = x[[i, a]];
        let xb = x[[i, b]];
        x[[i, a]] = cs * xa + sn * xb;
        x[[i, b]] = cs * xb - sn * xa;
    }
}

fn swap_columns<T: FloatOps>(x: &mut Array2<T>, a: usize, b: usize) {
    for i in 0..x.nrows() {
        x.swap([i, a], [i, b]);
    }
}

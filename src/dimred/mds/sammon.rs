//! Sammon mapping by batch pseudo-Newton steps with step halving.

use log::trace;
use ndarray::{Array2, ArrayView2, Axis, Zip};
use rayon::prelude::*;

use super::{embedding_distances, Refinement};
use crate::utils::FloatOps;

/// Sammon stress `Σ_{i<j} (δ − d)² / δ` normalized by `Σ_{i<j} δ`.
///
/// Pairs with zero dissimilarity carry no weight.
pub(crate) fn stress<T: FloatOps>(delta: ArrayView2<T>, distances: ArrayView2<T>) -> T {
    let n = delta.nrows();
    let mut total = T::zero();
    let mut scale = T::zero();
    for i in 0..n {
        for j in (i + 1)..n {
            let dij = delta[[i, j]];
            if dij > T::zero() {
                let diff = dij - distances[[i, j]];
                total += diff * diff / dij;
                scale += dij;
            }
        }
    }
    if scale > T::zero() {
        total / scale
    } else {
        T::zero()
    }
}

/// Newton direction `−g / |H|` per coordinate, using the diagonal of the Hessian.
fn newton_direction<T: FloatOps>(
    delta: ArrayView2<T>,
    y: &Array2<T>,
    distances: &Array2<T>,
    floor: T,
) -> Array2<T> {
    let n = y.nrows();
    let mut direction = Array2::zeros(y.dim());
    direction
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut out)| {
            for q in 0..y.ncols() {
                let mut gradient = T::zero();
                let mut hessian = T::zero();
                for j in 0..n {
                    let dij = delta[[i, j]];
                    if j == i || dij <= T::zero() {
                        continue;
                    }
                    let d = num_traits::Float::max(distances[[i, j]], floor);
                    let w = T::one() / d - T::one() / dij;
                    let diff = y[[j, q]] - y[[i, q]];
                    gradient += w * diff;
                    hessian += diff * diff / (d * d * d) - w;
                }
                let h = num_traits::Float::abs(hessian);
                out[q] = if h > T::zero() { -gradient / h } else { T::zero() };
            }
        });
    direction
}

/// Improves `y` in place; every accepted step lowers the stress.
pub(crate) fn refine<T: FloatOps>(
    delta: ArrayView2<T>,
    y: &mut Array2<T>,
    iterations: usize,
    halvings: usize,
    rate: T,
    tolerance: T,
) -> Refinement<T> {
    let n = delta.nrows();
    let pairs = T::from_count(n * n.saturating_sub(1) / 2);
    let mean_delta = if pairs > T::zero() {
        delta.sum() / (pairs + pairs)
    } else {
        T::zero()
    };
    let floor = num_traits::Float::max(<T as num_traits::Float>::epsilon() * mean_delta, <T as num_traits::Float>::min_positive_value());

    let mut distances = embedding_distances(y.view());
    let mut current = stress(delta, distances.view());
    let mut done = 0;

    while done < iterations && current > T::zero() {
        let direction = newton_direction(delta, y, &distances, floor);
        let mut scale = rate;
        let mut accepted = None;
        for _ in 0..=halvings {
            let mut candidate = y.clone();
            Zip::from(&mut candidate)
                .and(&direction)
                .for_each(|c, &s| *c += scale * s);
            let candidate_distances = embedding_distances(candidate.view());
            let candidate_stress = stress(delta, candidate_distances.view());
            if candidate_stress < current {
                accepted = Some((candidate, candidate_distances, candidate_stress));
                break;
            }
            scale = scale * T::constant(0.5);
        }

        done += 1;
        let Some((candidate, candidate_distances, candidate_stress)) = accepted else {
            trace!("sammon: no descent after {} halvings", halvings);
            break;
        };
        let improvement = current - candidate_stress;
        *y = candidate;
        distances = candidate_distances;
        trace!("sammon iteration {}: stress {}", done, candidate_stress);
        let relative = improvement / current;
        current = candidate_stress;
        if relative < tolerance {
            break;
        }
    }

    Refinement {
        iterations: done,
        objective: current,
    }
}

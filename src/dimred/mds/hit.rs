//! High-throughput (HiT) heuristic: gradient ascent on the correlation
//! between input dissimilarities and embedding distances.

use log::trace;
use ndarray::{Array2, ArrayView2, Axis, Zip};
use rayon::prelude::*;

use super::{embedding_distances, Refinement};
use crate::utils::FloatOps;

/// Pearson correlation over the upper-triangle pairs.
pub(crate) fn correlation<T: FloatOps>(delta: ArrayView2<T>, distances: ArrayView2<T>) -> T {
    let n = delta.nrows();
    let pairs = T::from_count(n * n.saturating_sub(1) / 2);
    if pairs == T::zero() {
        return T::zero();
    }
    let (mut sum_a, mut sum_b) = (T::zero(), T::zero());
    for i in 0..n {
        for j in (i + 1)..n {
            sum_a += delta[[i, j]];
            sum_b += distances[[i, j]];
        }
    }
    let (mean_a, mean_b) = (sum_a / pairs, sum_b / pairs);
    let (mut cov, mut var_a, mut var_b) = (T::zero(), T::zero(), T::zero());
    for i in 0..n {
        for j in (i + 1)..n {
            let a = delta[[i, j]] - mean_a;
            let b = distances[[i, j]] - mean_b;
            cov += a * b;
            var_a += a * a;
            var_b += b * b;
        }
    }
    let denominator = (var_a * var_b).sqrt();
    if denominator > T::zero() {
        cov / denominator
    } else {
        T::zero()
    }
}

/// Gradient of the correlation with respect to every coordinate.
fn ascent_direction<T: FloatOps>(
    delta: ArrayView2<T>,
    y: &Array2<T>,
    distances: &Array2<T>,
    r: T,
) -> Array2<T> {
    let n = y.nrows();
    let pairs = T::from_count(n * (n - 1) / 2);
    let (mut sum_a, mut sum_b) = (T::zero(), T::zero());
    for i in 0..n {
        for j in (i + 1)..n {
            sum_a += delta[[i, j]];
            sum_b += distances[[i, j]];
        }
    }
    let (mean_a, mean_b) = (sum_a / pairs, sum_b / pairs);
    let (mut var_a, mut var_b) = (T::zero(), T::zero());
    for i in 0..n {
        for j in (i + 1)..n {
            var_a += num_traits::Float::powi(delta[[i, j]] - mean_a, 2);
            var_b += num_traits::Float::powi(distances[[i, j]] - mean_b, 2);
        }
    }
    let norm_a = var_a.sqrt();
    let norm_b = var_b.sqrt();

    let mut gradient = Array2::zeros(y.dim());
    if norm_a == T::zero() || norm_b == T::zero() {
        return gradient;
    }
    gradient
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut out)| {
            for j in 0..n {
                let d = distances[[i, j]];
                if j == i || d <= T::zero() {
                    continue;
                }
                // dr/dd for this pair
                let w = (delta[[i, j]] - mean_a) / (norm_a * norm_b)
                    - r * (d - mean_b) / var_b;
                for q in 0..y.ncols() {
                    out[q] += w * (y[[i, q]] - y[[j, q]]) / d;
                }
            }
        });
    gradient
}

/// Raises the correlation of `y` in place, then rescales `y` by the
/// least-squares factor onto the dissimilarities.
pub(crate) fn refine<T: FloatOps>(
    delta: ArrayView2<T>,
    y: &mut Array2<T>,
    iterations: usize,
    halvings: usize,
    rate: T,
    tolerance: T,
) -> Refinement<T> {
    let mut distances = embedding_distances(y.view());
    let mut current = correlation(delta, distances.view());
    let mut done = 0;
    let mut step = None;

    while done < iterations && y.nrows() > 2 {
        let gradient = ascent_direction(delta, y, &distances, current);
        let largest = gradient.iter().fold(T::zero(), |acc, &g| num_traits::Float::max(acc, num_traits::Float::abs(g)));
        if largest == T::zero() {
            break;
        }
        let mean_distance = distances.sum() / T::from_count(y.nrows() * (y.nrows() - 1));
        // first step moves the largest coordinate by a tenth of the mean distance
        let mut alpha = step.unwrap_or(rate * T::constant(0.1) * mean_distance / largest);
        let mut accepted = None;
        for _ in 0..=halvings {
            let mut candidate = y.clone();
            Zip::from(&mut candidate)
                .and(&gradient)
                .for_each(|c, &g| *c += alpha * g);
            let candidate_distances = embedding_distances(candidate.view());
            let candidate_r = correlation(delta, candidate_distances.view());
            if candidate_r > current {
                accepted = Some((candidate, candidate_distances, candidate_r));
                break;
            }
            alpha = alpha * T::constant(0.5);
        }

        done += 1;
        let Some((candidate, candidate_distances, candidate_r)) = accepted else {
            trace!("hit: no ascent after {} halvings", halvings);
            break;
        };
        let gain = candidate_r - current;
        *y = candidate;
        distances = candidate_distances;
        current = candidate_r;
        step = Some(alpha + alpha);
        trace!("hit iteration {}: correlation {}", done, current);
        if gain < tolerance {
            break;
        }
    }

    let mut cross = T::zero();
    let mut squares = T::zero();
    Zip::from(&delta).and(&distances).for_each(|&a, &d| {
        cross += a * d;
        squares += d * d;
    });
    if squares > T::zero() {
        let scale = cross / squares;
        y.mapv_inplace(|x| x * scale);
    }

    Refinement {
        iterations: done,
        objective: current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_correlation_invariant_to_scale() {
        let delta = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.5], [2.0, 1.5, 0.0]];
        let doubled = delta.mapv(|x| 2.0 * x + 1.0);
        assert_abs_diff_eq!(correlation(delta.view(), doubled.view()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_refine_raises_correlation_and_rescales() {
        let delta = array![
            [0.0, 1.0, 4.0, 3.0, 2.0],
            [1.0, 0.0, 2.0, 4.0, 3.0],
            [4.0, 2.0, 0.0, 1.0, 2.5],
            [3.0, 4.0, 1.0, 0.0, 1.0],
            [2.0, 3.0, 2.5, 1.0, 0.0]
        ];
        let mut y = array![[0.0, 0.0], [0.3, 0.1], [0.2, 0.9], [0.8, 0.5], [0.5, 0.2]];
        let before = correlation(delta.view(), embedding_distances(y.view()).view());
        let outcome = refine(delta.view(), &mut y, 200, 20, 1.0, 0.0);
        assert!(outcome.objective > before);

        let d = embedding_distances(y.view());
        assert_abs_diff_eq!(
            outcome.objective,
            correlation(delta.view(), d.view()),
            epsilon = 1e-10
        );
        // least-squares scale: Σ δ·d == Σ d²
        let cross: f64 = delta.iter().zip(d.iter()).map(|(a, b)| a * b).sum();
        let squares: f64 = d.iter().map(|b| b * b).sum();
        assert_abs_diff_eq!(cross, squares, epsilon = 1e-8);
    }
}

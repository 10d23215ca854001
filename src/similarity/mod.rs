//! Pairwise dissimilarities between observation vectors.
//!
//! Used to turn raw coordinates into the dissimilarity matrices consumed by
//! MDS and relational neural gas.

use std::str::FromStr;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::dense::Matrix;
use crate::error::AlgebraError;
use crate::utils::FloatOps;

pub trait DistanceMeasure {
    /// Non-negative dissimilarity of two equally long vectors.
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T;
}

pub struct Euclidean;

impl DistanceMeasure for Euclidean {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        SquaredEuclidean.distance(a, b).sqrt()
    }
}

pub struct SquaredEuclidean;

impl DistanceMeasure for SquaredEuclidean {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        let mut squared_dist = T::zero();
        for (&x, &y) in a.iter().zip(b.iter()) {
            let diff = x - y;
            squared_dist += diff * diff;
        }
        squared_dist
    }
}

pub struct Manhattan;

impl DistanceMeasure for Manhattan {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        a.iter()
            .zip(b.iter())
            .fold(T::zero(), |acc, (&x, &y)| acc + num_traits::Float::abs(x - y))
    }
}

/// `1 − cos(a, b)`; zero vectors are at distance 1 from everything.
pub struct Cosine;

impl DistanceMeasure for Cosine {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        let mut dot_product = T::zero();
        let mut norm_a = T::zero();
        let mut norm_b = T::zero();

        for (&x, &y) in a.iter().zip(b.iter()) {
            dot_product += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }

        let norm_product = (norm_a * norm_b).sqrt();
        let similarity = if norm_product > <T as num_traits::Float>::epsilon() {
            dot_product / norm_product
        } else {
            T::zero()
        };
        num_traits::Float::max(T::one() - similarity, T::zero())
    }
}

/// `1 − r` with `r` the Pearson correlation of the two vectors.
pub struct Correlation;

impl DistanceMeasure for Correlation {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        num_traits::Float::max(T::one() - pearson(a, b), T::zero())
    }
}

/// Pearson correlation; returns zero when either vector is constant.
pub fn pearson<T: FloatOps>(a: ArrayView1<T>, b: ArrayView1<T>) -> T {
    let n = T::from_count(a.len());
    let mut sum_a = T::zero();
    let mut sum_b = T::zero();
    let mut sum_ab = T::zero();
    let mut sum_a_sq = T::zero();
    let mut sum_b_sq = T::zero();

    for (&x, &y) in a.iter().zip(b.iter()) {
        sum_a += x;
        sum_b += y;
        sum_ab += x * y;
        sum_a_sq += x * x;
        sum_b_sq += y * y;
    }

    let numerator = sum_ab - (sum_a * sum_b) / n;
    let denominator =
        ((sum_a_sq - (sum_a * sum_a) / n) * (sum_b_sq - (sum_b * sum_b) / n)).sqrt();

    if denominator > <T as num_traits::Float>::epsilon() {
        numerator / denominator
    } else {
        T::zero()
    }
}

/// Named measure, for configuration by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    SquaredEuclidean,
    Manhattan,
    Cosine,
    Correlation,
}

impl DistanceMeasure for Metric {
    fn distance<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> T {
        match self {
            Metric::Euclidean => Euclidean.distance(a, b),
            Metric::SquaredEuclidean => SquaredEuclidean.distance(a, b),
            Metric::Manhattan => Manhattan.distance(a, b),
            Metric::Cosine => Cosine.distance(a, b),
            Metric::Correlation => Correlation.distance(a, b),
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "sqeuclidean" | "squared_euclidean" => Ok(Metric::SquaredEuclidean),
            "manhattan" | "cityblock" => Ok(Metric::Manhattan),
            "cosine" => Ok(Metric::Cosine),
            "correlation" | "pearson" => Ok(Metric::Correlation),
            other => Err(AlgebraError::unsupported(format!("unknown metric '{}'", other)).into()),
        }
    }
}

/// Symmetric `n×n` dissimilarity matrix between the rows of `x`.
pub fn pairwise_distances<T, M>(x: ArrayView2<T>, measure: &M) -> anyhow::Result<Matrix<T>>
where
    T: FloatOps,
    M: DistanceMeasure + Sync,
{
    crate::dense::ensure_non_empty(&x)?;
    let n = x.nrows();
    let mut out = Matrix::zeros((n, n));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            for j in 0..n {
                if j != i {
                    row[j] = measure.distance(x.row(i), x.row(j));
                }
            }
        });
    Ok(out)
}

/// `m×n` dissimilarities from each row of `queries` to each row of `reference`.
pub fn cross_distances<T, M>(
    queries: ArrayView2<T>,
    reference: ArrayView2<T>,
    measure: &M,
) -> anyhow::Result<Matrix<T>>
where
    T: FloatOps,
    M: DistanceMeasure + Sync,
{
    crate::dense::ensure_non_empty(&queries)?;
    crate::dense::ensure_non_empty(&reference)?;
    if queries.ncols() != reference.ncols() {
        return Err(AlgebraError::dimension(format!(
            "query vectors have {} features, reference vectors {}",
            queries.ncols(),
            reference.ncols()
        ))
        .into());
    }
    let mut out = Matrix::zeros((queries.nrows(), reference.nrows()));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = measure.distance(queries.row(i), reference.row(j));
            }
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_measures() {
        let a = Array1::from(vec![1.0, 2.0, 3.0]);
        let b = Array1::from(vec![4.0, 5.0, 6.0]);

        assert_abs_diff_eq!(Euclidean.distance(a.view(), b.view()), 27.0f64.sqrt());
        assert_abs_diff_eq!(SquaredEuclidean.distance(a.view(), b.view()), 27.0);
        assert_abs_diff_eq!(Manhattan.distance(a.view(), b.view()), 9.0);
        // parallel after shifting, so perfectly correlated
        assert_abs_diff_eq!(Correlation.distance(a.view(), b.view()), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            Cosine.distance(a.view(), b.view()),
            1.0 - 32.0 / (14.0f64 * 77.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pearson() {
        let a = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        let b = Array1::from(vec![8.0, 6.0, 4.0, 2.0]);
        assert_abs_diff_eq!(pearson(a.view(), b.view()), -1.0, epsilon = 1e-12);
        let flat = Array1::from(vec![5.0, 5.0, 5.0, 5.0]);
        assert_eq!(pearson(a.view(), flat.view()), 0.0);
    }

    #[test]
    fn test_zero_vector_cosine() {
        let z = Array1::<f32>::zeros(3);
        let a = Array1::from(vec![1.0f32, 0.0, 0.0]);
        assert_eq!(Cosine.distance(z.view(), a.view()), 1.0);
    }

    #[test]
    fn test_pairwise_and_cross() {
        let x = array![[0.0, 0.0], [3.0, 4.0], [6.0, 8.0]];
        let d = pairwise_distances(x.view(), &Metric::Euclidean).unwrap();
        assert_eq!(d.dim(), (3, 3));
        assert_abs_diff_eq!(d[[0, 1]], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[[0, 2]], 10.0, epsilon = 1e-12);
        for i in 0..3 {
            assert_eq!(d[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }

        let q = array![[0.0, 4.0]];
        let c = cross_distances(q.view(), x.view(), &Manhattan).unwrap();
        assert_eq!(c.dim(), (1, 3));
        assert_abs_diff_eq!(c[[0, 1]], 3.0, epsilon = 1e-12);

        let err = cross_distances(array![[1.0]].view(), x.view(), &Euclidean).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("cityblock".parse::<Metric>().unwrap(), Metric::Manhattan);
        let err = "jaccard".parse::<Metric>().unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::UnsupportedConfiguration(_))
        ));
    }
}

//! Classical (Torgerson) scaling.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView2, Zip};

use super::Centering;
use crate::dense;
use crate::eigen::EigenSolver;
use crate::utils::FloatOps;

/// Inner-product matrix implied by the squared dissimilarities.
pub(crate) fn gram<T: FloatOps>(
    delta: ArrayView2<T>,
    centering: Centering,
) -> anyhow::Result<Array2<T>> {
    let squared = delta.mapv(|x| x * x);
    let half = T::constant(-0.5);
    match centering {
        Centering::Double => dense::double_center(&squared.view()),
        Centering::Single => {
            // origin at the first object
            let mut b = Array2::zeros(squared.dim());
            Zip::indexed(&mut b).and(&squared).for_each(|(i, j), o, &d2| {
                *o = half * (d2 - squared[[i, 0]] - squared[[0, j]]);
            });
            Ok(b)
        }
        Centering::None => Ok(squared.mapv(|x| half * x)),
    }
}

/// Returns the `n×k` coordinates and the `k` eigenvalues they were scaled with.
///
/// Eigenpairs are taken by descending value; negative eigenvalues contribute
/// a zero coordinate.
pub(crate) fn embed<T: FloatOps>(
    delta: ArrayView2<T>,
    n_components: usize,
    centering: Centering,
    solver: &EigenSolver,
) -> anyhow::Result<(Array2<T>, Array1<T>)> {
    let b = gram(delta, centering)?;
    let eig = solver.solve(b.view())?;
    let values = eig.eigenvalues();

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let n = delta.nrows();
    let mut coords = Array2::zeros((n, n_components));
    let mut kept = Array1::zeros(n_components);
    for (dst, &src) in order.iter().take(n_components).enumerate() {
        let lambda = values[src];
        kept[dst] = lambda;
        let scale = num_traits::Float::max(lambda, T::zero()).sqrt();
        let mut col = coords.column_mut(dst);
        col.assign(&eig.eigenvector(src));
        col.mapv_inplace(|x| x * scale);
    }
    Ok((coords, kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{pairwise_distances, Euclidean};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_single_centering_is_shifted_gram() {
        let x = array![[1.0f64, 1.0], [4.0, 5.0], [1.0, 3.0]];
        let d = pairwise_distances(x.view(), &Euclidean).unwrap();
        let b = gram(d.view(), Centering::Single).unwrap();
        let shifted = &x - &x.row(0);
        let expected = shifted.dot(&shifted.t());
        for (p, q) in b.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(p, q, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_eigenvalues_by_value() {
        let x = array![[0.0f64, 0.0], [4.0, 0.0], [0.0, 1.0], [4.0, 1.0]];
        let d = pairwise_distances(x.view(), &Euclidean).unwrap();
        let (coords, values) = embed(d.view(), 2, Centering::Double, &EigenSolver::default()).unwrap();
        // centered coordinates have variances 16 and 1 over 4 points
        assert_abs_diff_eq!(values[0], 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(values[1], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coords[[0, 0]].abs(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coords[[0, 1]].abs(), 0.5, epsilon = 1e-9);
    }
}

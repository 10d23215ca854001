//! # Principal Component Analysis
//!
//! Dense PCA over observations stored in rows. The data are centered (and
//! optionally scaled to unit variance), then either the sample covariance is
//! eigen-decomposed or the centered data are decomposed with a thin SVD. Both
//! paths yield the same basis up to rounding; each basis vector has its
//! largest-magnitude loading positive.

use std::str::FromStr;

use anyhow::anyhow;
use log::debug;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::dense;
use crate::eigen::{EigenSolver, Symmetry};
use crate::error::AlgebraError;
use crate::svd::{SvdMode, SvdSolver};
use crate::utils::{Direction, FloatOps};

/// How the principal axes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcaMethod {
    /// Eigen-decomposition of the `d×d` sample covariance.
    #[default]
    Covariance,
    /// Thin SVD of the centered `n×d` data.
    Svd,
}

impl FromStr for PcaMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "covariance" | "eigen" => Ok(PcaMethod::Covariance),
            "svd" => Ok(PcaMethod::Svd),
            other => Err(AlgebraError::unsupported(format!("unknown PCA method '{}'", other)).into()),
        }
    }
}

pub struct PCABuilder {
    n_components: Option<usize>,
    scale: bool,
    method: PcaMethod,
    eigen_solver: EigenSolver,
    svd_solver: SvdSolver,
}

impl Default for PCABuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PCABuilder {
    pub fn new() -> Self {
        PCABuilder {
            n_components: None,
            scale: false,
            method: PcaMethod::Covariance,
            eigen_solver: EigenSolver::builder().symmetry(Symmetry::Symmetric).build(),
            svd_solver: SvdSolver::default(),
        }
    }

    /// Target dimension `k`; defaults to the number of features.
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    /// Divide every centered feature by its sample standard deviation.
    pub fn scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    pub fn method(mut self, method: PcaMethod) -> Self {
        self.method = method;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.eigen_solver = EigenSolver::builder()
            .symmetry(Symmetry::Symmetric)
            .max_iterations(max_iterations)
            .build();
        self.svd_solver = SvdSolver::builder().max_iterations(max_iterations).build();
        self
    }

    pub fn build<T: FloatOps>(self) -> Pca<T> {
        Pca {
            n_components: self.n_components,
            scale: self.scale,
            method: self.method,
            eigen_solver: self.eigen_solver,
            svd_solver: self.svd_solver,
            components: None,
            mean: None,
            std_dev: None,
            explained_variance_ratio: None,
            total_variance: None,
            eigenvalues: None,
        }
    }
}

pub struct Pca<T: FloatOps> {
    n_components: Option<usize>,
    scale: bool,
    method: PcaMethod,
    eigen_solver: EigenSolver,
    svd_solver: SvdSolver,
    components: Option<Array2<T>>,
    mean: Option<Array1<T>>,
    std_dev: Option<Array1<T>>,
    explained_variance_ratio: Option<Array1<T>>,
    total_variance: Option<T>,
    eigenvalues: Option<Array1<T>>,
}

impl<T: FloatOps> Pca<T> {
    /// Learns the mean and the `d×k` principal basis from `x` (`n×d`).
    ///
    /// # Errors
    /// - [`AlgebraError::Dimension`] if `x` has fewer than two rows or `k > d`
    /// - [`AlgebraError::UnsupportedConfiguration`] if `k == 0`
    /// - any error of the underlying eigen or SVD solver
    pub fn fit(&mut self, x: ArrayView2<T>) -> anyhow::Result<&mut Self> {
        dense::ensure_non_empty(&x)?;
        let (n_samples, n_features) = x.dim();
        let n_components = self.n_components.unwrap_or(n_features);
        if n_components == 0 {
            return Err(AlgebraError::unsupported("PCA needs at least one component").into());
        }
        if n_components > n_features {
            return Err(AlgebraError::dimension(format!(
                "cannot extract {} components from {} features",
                n_components, n_features
            ))
            .into());
        }
        if n_samples < 2 {
            return Err(AlgebraError::dimension(format!(
                "PCA needs at least two samples, got {}",
                n_samples
            ))
            .into());
        }

        let (mut centered, mean) = dense::center(&x, Direction::COLUMN)?;
        let std_dev = if self.scale {
            let sd = x
                .std_axis(Axis(0), T::one())
                .mapv(|v| if v > T::zero() { v } else { T::one() });
            centered
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .for_each(|mut row| {
                    row /= &sd;
                });
            Some(sd)
        } else {
            None
        };

        let denom = T::from_count(n_samples - 1);
        let (mut components, variances) = match self.method {
            PcaMethod::Covariance => {
                let cov = dense::covariance(&centered.view())?;
                let eig = self.eigen_solver.solve(cov.view())?;
                let (values, vectors) = eig.into_parts();
                // covariance is PSD; rounding may leave tiny negatives
                (vectors, values.mapv(|v| num_traits::Float::max(v, T::zero())))
            }
            PcaMethod::Svd => {
                let mode = if n_components > n_samples.min(n_features) {
                    SvdMode::Full
                } else {
                    SvdMode::Economy
                };
                let svd = SvdSolver::builder()
                    .mode(mode)
                    .max_iterations(self.svd_solver.max_iterations())
                    .build()
                    .solve(centered.view())?;
                let (_u, s, v) = svd.into_parts();
                let mut variances = Array1::zeros(v.ncols());
                for (slot, sigma) in variances.iter_mut().zip(s.iter()) {
                    *slot = *sigma * *sigma / denom;
                }
                (v, variances)
            }
        };

        let total_variance = variances.sum();
        components = components.slice(s![.., ..n_components]).to_owned();
        for mut col in components.axis_iter_mut(Axis(1)) {
            dense::canonical_sign(&mut col);
        }
        let eigenvalues = variances.slice(s![..n_components]).to_owned();
        let explained_variance_ratio = if total_variance > T::zero() {
            eigenvalues.mapv(|v| v / total_variance)
        } else {
            Array1::zeros(n_components)
        };
        debug!(
            "PCA fit: {} samples, {} features -> {} components ({:?})",
            n_samples, n_features, n_components, self.method
        );

        self.components = Some(components);
        self.mean = Some(mean);
        self.std_dev = std_dev;
        self.explained_variance_ratio = Some(explained_variance_ratio);
        self.total_variance = Some(total_variance);
        self.eigenvalues = Some(eigenvalues);
        Ok(self)
    }

    fn preprocess(&self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| anyhow!(AlgebraError::unsupported("PCA has not been fitted yet")))?;
        if x.ncols() != mean.len() {
            return Err(AlgebraError::dimension(format!(
                "PCA was fitted on {} features, got {}",
                mean.len(),
                x.ncols()
            ))
            .into());
        }
        let mut x_preprocessed = x.to_owned();
        x_preprocessed
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                row -= mean;
                if let Some(sd) = &self.std_dev {
                    row /= sd;
                }
            });
        Ok(x_preprocessed)
    }

    /// Projects `x` (`m×d`) onto the fitted basis, giving `m×k` scores.
    pub fn transform(&self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| anyhow!(AlgebraError::unsupported("PCA has not been fitted yet")))?;
        let x_preprocessed = self.preprocess(x)?;
        Ok(x_preprocessed.dot(components))
    }

    pub fn fit_transform(&mut self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Maps `m×k` scores back into the original feature space.
    pub fn inverse_transform(&self, scores: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        let (components, mean) = match (&self.components, &self.mean) {
            (Some(c), Some(m)) => (c, m),
            _ => return Err(AlgebraError::unsupported("PCA has not been fitted yet").into()),
        };
        if scores.ncols() != components.ncols() {
            return Err(AlgebraError::dimension(format!(
                "expected {} score columns, got {}",
                components.ncols(),
                scores.ncols()
            ))
            .into());
        }
        let mut restored = scores.dot(&components.t());
        restored
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                if let Some(sd) = &self.std_dev {
                    row *= sd;
                }
                row += mean;
            });
        Ok(restored)
    }

    /// Principal axes as the columns of a `d×k` matrix.
    pub fn components(&self) -> Option<&Array2<T>> {
        self.components.as_ref()
    }

    pub fn mean(&self) -> Option<&Array1<T>> {
        self.mean.as_ref()
    }

    pub fn explained_variance_ratio(&self) -> Option<&Array1<T>> {
        self.explained_variance_ratio.as_ref()
    }

    pub fn cumulative_explained_variance(&self) -> Option<Array1<T>> {
        self.explained_variance_ratio.as_ref().map(|ratios| {
            let mut acc = T::zero();
            ratios.mapv(|r| {
                acc += r;
                acc
            })
        })
    }

    pub fn total_variance(&self) -> Option<T> {
        self.total_variance
    }

    /// Variance captured by each retained component.
    pub fn eigenvalues(&self) -> Option<&Array1<T>> {
        self.eigenvalues.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{Distribution, Sampler};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn correlated_data() -> Array2<f64> {
        let mut sampler = Sampler::seed_from_u64(17);
        let noise = Distribution::normal(0.0, 0.05).unwrap();
        let t = sampler.sample_n(&Distribution::normal(0.0, 2.0).unwrap(), 200);
        Array2::from_shape_fn((200, 3), |(i, j)| match j {
            0 => t[i],
            1 => 0.5 * t[i],
            _ => -t[i],
        })
        .mapv(|v| v + sampler.sample(&noise))
    }

    #[test]
    fn test_pca_with_different_n_components() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0], [2.0, 1.0, 0.0]];

        let mut pca_1 = PCABuilder::new().n_components(1).build();
        let transformed_1 = pca_1.fit_transform(x.view()).unwrap();
        assert_eq!(transformed_1.shape(), &[4, 1]);

        let mut pca_3 = PCABuilder::new().n_components(3).build();
        let transformed_3 = pca_3.fit_transform(x.view()).unwrap();
        assert_eq!(transformed_3.shape(), &[4, 3]);

        let restored = pca_3.inverse_transform(transformed_3.view()).unwrap();
        for (a, b) in restored.iter().zip(x.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dominant_axis_and_variance() {
        let x = correlated_data();
        let mut pca = PCABuilder::new().n_components(2).build();
        pca.fit(x.view()).unwrap();

        let axis = pca.components().unwrap().column(0).to_owned();
        let expected = array![1.0f64, 0.5, -1.0] / 1.5;
        for (a, b) in axis.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.abs(), b.abs(), epsilon = 1e-2);
        }
        let ratio = pca.explained_variance_ratio().unwrap();
        assert!(ratio[0] > 0.99);
        assert!(ratio[0] >= ratio[1]);

        let basis = pca.components().unwrap();
        let gram = basis.t().dot(basis);
        assert_abs_diff_eq!(gram[[0, 0]], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(gram[[0, 1]], 0.0, epsilon = 1e-10);

        let cumulative = pca.cumulative_explained_variance().unwrap();
        assert_abs_diff_eq!(cumulative[1], ratio[0] + ratio[1], epsilon = 1e-12);
    }

    #[test]
    fn test_svd_method_agrees_with_covariance() {
        let x = correlated_data();
        let mut cov = PCABuilder::new().n_components(2).build();
        let mut svd = PCABuilder::new()
            .n_components(2)
            .method(PcaMethod::Svd)
            .build();
        let a = cov.fit_transform(x.view()).unwrap();
        let b = svd.fit_transform(x.view()).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(p, q, epsilon = 1e-8);
        }
        for (p, q) in cov
            .eigenvalues()
            .unwrap()
            .iter()
            .zip(svd.eigenvalues().unwrap().iter())
        {
            assert_abs_diff_eq!(p, q, epsilon = 1e-8);
        }
        assert_abs_diff_eq!(
            cov.total_variance().unwrap(),
            svd.total_variance().unwrap(),
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_score_variance_matches_eigenvalues() {
        let x = correlated_data();
        for method in [PcaMethod::Covariance, PcaMethod::Svd] {
            let mut pca = PCABuilder::new().n_components(2).method(method).build::<f64>();
            let scores = pca.fit_transform(x.view()).unwrap();
            let eigenvalues = pca.eigenvalues().unwrap().clone();
            for (column, &lambda) in scores.columns().into_iter().zip(eigenvalues.iter()) {
                assert_abs_diff_eq!(column.var(1.0), lambda, epsilon = 1e-9 * lambda.max(1.0));
            }
            let captured: f64 = scores.columns().into_iter().map(|c| c.var(1.0)).sum();
            assert_abs_diff_eq!(captured, eigenvalues.sum(), epsilon = 1e-9 * captured);
        }
    }

    #[test]
    fn test_scaled_pca_unit_total_variance() {
        let x = correlated_data();
        let mut pca = PCABuilder::new().scale(true).build();
        pca.fit(x.view()).unwrap();
        assert_abs_diff_eq!(pca.total_variance().unwrap(), 3.0, epsilon = 1e-9);
        let restored = pca
            .inverse_transform(pca.transform(x.view()).unwrap().view())
            .unwrap();
        for (a, b) in restored.iter().zip(x.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_precision() {
        let x = array![[1.0f32, 2.0], [2.0, 4.1], [3.0, 5.9], [4.0, 8.0]];
        let mut pca = PCABuilder::new().n_components(1).build();
        let scores = pca.fit_transform(x.view()).unwrap();
        assert_eq!(scores.dim(), (4, 1));
        assert!(pca.explained_variance_ratio().unwrap()[0] > 0.99);
    }

    #[test]
    fn test_pca_errors() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 7.0]];

        let unfitted = PCABuilder::new().n_components(1).build::<f64>();
        let err = unfitted.transform(x.view()).unwrap_err();
        assert!(err.to_string().contains("PCA has not been fitted yet"));

        let err = PCABuilder::new()
            .n_components(3)
            .build::<f64>()
            .fit(x.view())
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));

        let err = PCABuilder::new()
            .n_components(0)
            .build::<f64>()
            .fit(x.view())
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::UnsupportedConfiguration(_))
        ));

        let err = PCABuilder::new()
            .build::<f64>()
            .fit(array![[1.0, 2.0]].view())
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));

        let mut pca = PCABuilder::new().n_components(1).build::<f64>();
        pca.fit(x.view()).unwrap();
        let err = pca.transform(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
        assert_eq!("SVD".parse::<PcaMethod>().unwrap(), PcaMethod::Svd);
    }
}

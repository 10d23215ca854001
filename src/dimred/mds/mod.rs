//! # Multidimensional Scaling
//!
//! Embeds `n` objects in `k` dimensions so that embedding distances follow a
//! given `n×n` dissimilarity matrix. Three projections are available:
//!
//! - **Metric**: classical scaling, an eigen-decomposition of the centered
//!   inner-product matrix.
//! - **Sammon**: iterative minimization of Sammon's stress, started from the
//!   metric embedding.
//! - **HiT**: iterative maximization of the correlation between
//!   dissimilarities and embedding distances, started from the metric
//!   embedding and rescaled to the dissimilarities at the end.
//!
//! The iterative projections are best-effort: running out of iterations is
//! not an error. Raw coordinates are accepted too and turned into Euclidean
//! (or any other [`Metric`]) distances first.
//!
//! ## Example
//! ```
//! use ml_algebra::dimred::mds::{MdsBuilder, Projection};
//! use ndarray::array;
//!
//! let points = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
//! let mut mds = MdsBuilder::new()
//!     .n_components(2)
//!     .projection(Projection::Sammon)
//!     .build::<f64>();
//! let embedding = mds.fit_transform(points.view()).unwrap();
//! assert_eq!(embedding.dim(), (4, 2));
//! ```

mod hit;
mod metric;
mod sammon;

use std::str::FromStr;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::dense;
use crate::eigen::{EigenSolver, Symmetry};
use crate::error::AlgebraError;
use crate::similarity::{pairwise_distances, Metric};
use crate::utils::FloatOps;

pub const DEFAULT_ITERATIONS: usize = 100;
pub const DEFAULT_STEP: usize = 20;
pub const DEFAULT_RATE: f64 = 0.3;
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Metric,
    Sammon,
    Hit,
}

impl FromStr for Projection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" | "classical" => Ok(Projection::Metric),
            "sammon" => Ok(Projection::Sammon),
            "hit" => Ok(Projection::Hit),
            other => Err(AlgebraError::unsupported(format!("unknown MDS projection '{}'", other)).into()),
        }
    }
}

/// Centering applied to the squared dissimilarities before the eigen step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Centering {
    /// `-½ D²` as is.
    None,
    /// Inner products relative to the first object.
    Single,
    /// `-½ J D² J` with `J = I − 11ᵀ/n`.
    #[default]
    Double,
}

impl FromStr for Centering {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Centering::None),
            "single" => Ok(Centering::Single),
            "double" => Ok(Centering::Double),
            other => Err(AlgebraError::unsupported(format!("unknown centering '{}'", other)).into()),
        }
    }
}

/// How the input matrix is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MdsInput {
    /// Dissimilarities if square, symmetric, non-negative and zero on the diagonal.
    #[default]
    Auto,
    Dissimilarity,
    Coordinates,
}

/// Outcome of an iterative refinement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Refinement<T> {
    pub iterations: usize,
    /// Final stress (Sammon) or correlation (HiT).
    pub objective: T,
}

/// Euclidean distances between the rows of an embedding.
pub(crate) fn embedding_distances<T: FloatOps>(y: ArrayView2<T>) -> Array2<T> {
    let n = y.nrows();
    let mut out = Array2::zeros((n, n));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            for j in 0..n {
                if j != i {
                    row[j] = dense::squared_row_distance(&y, i, j).sqrt();
                }
            }
        });
    out
}

fn ensure_pair_shapes<T>(delta: &ArrayView2<T>, embedding: &ArrayView2<T>) -> anyhow::Result<()> {
    dense::ensure_square(delta, "MDS dissimilarities")?;
    if embedding.nrows() != delta.nrows() {
        return Err(AlgebraError::dimension(format!(
            "embedding has {} points, dissimilarities describe {}",
            embedding.nrows(),
            delta.nrows()
        ))
        .into());
    }
    Ok(())
}

/// Sammon stress of an embedding with respect to `delta`.
pub fn sammon_stress<T: FloatOps>(
    delta: ArrayView2<T>,
    embedding: ArrayView2<T>,
) -> anyhow::Result<T> {
    ensure_pair_shapes(&delta, &embedding)?;
    let distances = embedding_distances(embedding);
    Ok(sammon::stress(delta, distances.view()))
}

/// Pearson correlation between `delta` and the embedding distances, over all pairs.
pub fn distance_correlation<T: FloatOps>(
    delta: ArrayView2<T>,
    embedding: ArrayView2<T>,
) -> anyhow::Result<T> {
    ensure_pair_shapes(&delta, &embedding)?;
    let distances = embedding_distances(embedding);
    Ok(hit::correlation(delta, distances.view()))
}

fn looks_like_dissimilarity<T: FloatOps>(x: &ArrayView2<T>) -> bool {
    x.nrows() == x.ncols()
        && x.diag().iter().all(|&v| v == T::zero())
        && x.iter().all(|&v| v >= T::zero())
        && dense::is_symmetric(x, <T as num_traits::Float>::epsilon() * T::constant(1024.0))
}

pub struct MdsBuilder {
    n_components: Option<usize>,
    projection: Projection,
    centering: Centering,
    input: MdsInput,
    metric: Metric,
    iterations: usize,
    step: usize,
    rate: f64,
    tolerance: f64,
    max_eigen_iterations: Option<usize>,
}

impl Default for MdsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MdsBuilder {
    pub fn new() -> Self {
        MdsBuilder {
            n_components: None,
            projection: Projection::Metric,
            centering: Centering::Double,
            input: MdsInput::Auto,
            metric: Metric::Euclidean,
            iterations: DEFAULT_ITERATIONS,
            step: DEFAULT_STEP,
            rate: DEFAULT_RATE,
            tolerance: DEFAULT_TOLERANCE,
            max_eigen_iterations: None,
        }
    }

    /// Embedding dimension; required.
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn centering(mut self, centering: Centering) -> Self {
        self.centering = centering;
        self
    }

    pub fn input(mut self, input: MdsInput) -> Self {
        self.input = input;
        self
    }

    /// Distance used when the input holds coordinates.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Iteration budget of the Sammon and HiT refinements.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Step halvings tried per iteration before giving up.
    pub fn step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// Initial step multiplier of the iterative refinements.
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Relative objective change below which the refinement stops early.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn max_eigen_iterations(mut self, max_iterations: usize) -> Self {
        self.max_eigen_iterations = Some(max_iterations);
        self
    }

    pub fn build<T: FloatOps>(self) -> Mds<T> {
        let mut eigen = EigenSolver::builder().symmetry(Symmetry::Symmetric);
        if let Some(max_iterations) = self.max_eigen_iterations {
            eigen = eigen.max_iterations(max_iterations);
        }
        Mds {
            n_components: self.n_components,
            projection: self.projection,
            centering: self.centering,
            input: self.input,
            metric: self.metric,
            iterations: self.iterations,
            step: self.step,
            rate: self.rate,
            tolerance: self.tolerance,
            eigen_solver: eigen.build(),
            embedding: None,
            eigenvalues: None,
            stress: None,
            correlation: None,
            iterations_run: 0,
        }
    }
}

pub struct Mds<T: FloatOps> {
    n_components: Option<usize>,
    projection: Projection,
    centering: Centering,
    input: MdsInput,
    metric: Metric,
    iterations: usize,
    step: usize,
    rate: f64,
    tolerance: f64,
    eigen_solver: EigenSolver,
    embedding: Option<Array2<T>>,
    eigenvalues: Option<Array1<T>>,
    stress: Option<T>,
    correlation: Option<T>,
    iterations_run: usize,
}

impl<T: FloatOps> Mds<T> {
    /// Resolves the input to an `n×n` dissimilarity matrix.
    pub fn dissimilarities(&self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        dense::ensure_non_empty(&x)?;
        dense::ensure_finite(&x)?;
        let as_dissimilarity = match self.input {
            MdsInput::Dissimilarity => {
                dense::ensure_square(&x, "MDS dissimilarities")?;
                true
            }
            MdsInput::Coordinates => false,
            MdsInput::Auto => looks_like_dissimilarity(&x),
        };
        if as_dissimilarity {
            Ok(x.to_owned())
        } else {
            debug!(
                "MDS: converting {}x{} coordinates with {:?} distance",
                x.nrows(),
                x.ncols(),
                self.metric
            );
            pairwise_distances(x, &self.metric)
        }
    }

    /// Computes the `n×k` embedding of `x` (dissimilarities or coordinates).
    ///
    /// # Errors
    /// - [`AlgebraError::UnsupportedConfiguration`] if no dimension was set, or it is zero
    /// - [`AlgebraError::Dimension`] if `k` exceeds the number of objects, or a
    ///   dissimilarity matrix is not square
    /// - eigen solver errors from the metric step
    pub fn fit_transform(&mut self, x: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        let k = match self.n_components {
            Some(k) if k > 0 => k,
            _ => {
                return Err(AlgebraError::unsupported("MDS needs a positive target dimension").into())
            }
        };
        let delta = self.dissimilarities(x)?;
        let n = delta.nrows();
        if k > n {
            return Err(AlgebraError::dimension(format!(
                "cannot embed {} objects in {} dimensions",
                n, k
            ))
            .into());
        }

        let (mut y, eigenvalues) =
            metric::embed(delta.view(), k, self.centering, &self.eigen_solver)?;
        let rate = T::constant(self.rate);
        let tolerance = T::constant(self.tolerance);
        let iterations_run = match self.projection {
            Projection::Metric => 0,
            Projection::Sammon => {
                let outcome =
                    sammon::refine(delta.view(), &mut y, self.iterations, self.step, rate, tolerance);
                info!(
                    "Sammon mapping: stress {} after {} iterations",
                    outcome.objective, outcome.iterations
                );
                outcome.iterations
            }
            Projection::Hit => {
                let outcome =
                    hit::refine(delta.view(), &mut y, self.iterations, self.step, rate, tolerance);
                info!(
                    "HiT mapping: correlation {} after {} iterations",
                    outcome.objective, outcome.iterations
                );
                outcome.iterations
            }
        };

        let distances = embedding_distances(y.view());
        self.stress = Some(sammon::stress(delta.view(), distances.view()));
        self.correlation = Some(hit::correlation(delta.view(), distances.view()));
        self.eigenvalues = Some(eigenvalues);
        self.iterations_run = iterations_run;
        self.embedding = Some(y.clone());
        Ok(y)
    }

    pub fn embedding(&self) -> Option<&Array2<T>> {
        self.embedding.as_ref()
    }

    /// Eigenvalues of the centered inner-product matrix behind the metric start.
    pub fn eigenvalues(&self) -> Option<&Array1<T>> {
        self.eigenvalues.as_ref()
    }

    pub fn stress(&self) -> Option<T> {
        self.stress
    }

    pub fn correlation(&self) -> Option<T> {
        self.correlation
    }

    /// Refinement iterations performed by the last fit; zero for metric MDS.
    pub fn iterations(&self) -> usize {
        self.iterations_run
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn centering(&self) -> Centering {
        self.centering
    }
}

//! Batch relational neural gas.
//!
//! Prototypes live in the span of the training objects: prototype `i` is a
//! weighting `α_i` over the `n` objects (non-negative, summing to one), stored
//! as row `i` of a `k×n` matrix. Distances to a prototype only need the
//! dissimilarity matrix `D`:
//!
//! ```text
//! d(j, α) = (D α)_j − ½ αᵀ D α
//! ```
//!
//! which equals the squared Euclidean distance to `Σ α_m x_m` whenever `D`
//! holds squared Euclidean distances.

use std::cmp::Ordering;

use log::{debug, info, trace};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::dense;
use crate::error::AlgebraError;
use crate::utils::FloatOps;

pub const DEFAULT_ITERATIONS: usize = 100;
pub const DEFAULT_LAMBDA_FINAL: f64 = 0.01;
pub const DEFAULT_LEARNING_RATE_INITIAL: f64 = 1.0;
pub const DEFAULT_LEARNING_RATE_FINAL: f64 = 0.5;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Initialized,
    Training,
    /// The largest weighting change fell below the configured tolerance.
    Converged,
    IterationBudgetExhausted,
}

/// Per-iteration snapshots, recorded when logging is enabled.
#[derive(Debug, Clone, Default)]
pub struct TrainingLog<T> {
    pub prototypes: Vec<Array2<T>>,
    /// Sum over the objects of the distance to their nearest prototype.
    pub quantization_error: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct RelationalNeuralGasBuilder {
    prototypes: usize,
    iterations: usize,
    lambda_initial: Option<f64>,
    lambda_final: f64,
    learning_rate_initial: f64,
    learning_rate_final: f64,
    tolerance: Option<f64>,
    seed: u64,
    logging: bool,
}

impl RelationalNeuralGasBuilder {
    /// Configuration for `prototypes` prototypes with the default schedules.
    pub fn new(prototypes: usize) -> Self {
        RelationalNeuralGasBuilder {
            prototypes,
            iterations: DEFAULT_ITERATIONS,
            lambda_initial: None,
            lambda_final: DEFAULT_LAMBDA_FINAL,
            learning_rate_initial: DEFAULT_LEARNING_RATE_INITIAL,
            learning_rate_final: DEFAULT_LEARNING_RATE_FINAL,
            tolerance: None,
            seed: DEFAULT_SEED,
            logging: false,
        }
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Initial neighborhood range; defaults to half the number of prototypes.
    pub fn lambda_initial(mut self, lambda: f64) -> Self {
        self.lambda_initial = Some(lambda);
        self
    }

    pub fn lambda_final(mut self, lambda: f64) -> Self {
        self.lambda_final = lambda;
        self
    }

    pub fn learning_rate(mut self, initial: f64, last: f64) -> Self {
        self.learning_rate_initial = initial;
        self.learning_rate_final = last;
        self
    }

    /// Stop once no weighting moves by more than `tolerance` in one iteration.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Creates a model for `n_points` objects, each prototype starting on a
    /// distinct random object.
    ///
    /// # Errors
    /// - [`AlgebraError::Dimension`] for more prototypes than objects
    /// - [`AlgebraError::UnsupportedConfiguration`] for zero prototypes, a zero
    ///   iteration budget or non-positive schedule values
    pub fn build<T: FloatOps>(self, n_points: usize) -> anyhow::Result<RelationalNeuralGas<T>> {
        let k = self.prototypes;
        if k == 0 {
            return Err(AlgebraError::unsupported("neural gas needs at least one prototype").into());
        }
        if k > n_points {
            return Err(AlgebraError::dimension(format!(
                "{} prototypes requested for {} objects",
                k, n_points
            ))
            .into());
        }
        if self.iterations == 0 {
            return Err(AlgebraError::unsupported("iteration budget must be positive").into());
        }
        let lambda_initial = self.lambda_initial.unwrap_or(k as f64 * 0.5);
        if lambda_initial <= 0.0 || self.lambda_final <= 0.0 {
            return Err(AlgebraError::unsupported("neighborhood range must be positive").into());
        }
        let rates = [self.learning_rate_initial, self.learning_rate_final];
        if rates.iter().any(|&r| r <= 0.0 || r > 1.0) {
            return Err(AlgebraError::unsupported("learning rates must lie in (0, 1]").into());
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut weights = Array2::zeros((k, n_points));
        for (i, object) in index::sample(&mut rng, n_points, k).into_iter().enumerate() {
            weights[[i, object]] = T::one();
        }
        debug!("relational neural gas: {} prototypes over {} objects", k, n_points);

        Ok(RelationalNeuralGas {
            n_points,
            iterations: self.iterations,
            lambda_initial,
            lambda_final: self.lambda_final,
            learning_rate_initial: self.learning_rate_initial,
            learning_rate_final: self.learning_rate_final,
            tolerance: self.tolerance,
            weights,
            self_terms: None,
            state: TrainingState::Initialized,
            iterations_run: 0,
            log: if self.logging { Some(TrainingLog::default()) } else { None },
        })
    }
}

#[derive(Debug, Clone)]
pub struct RelationalNeuralGas<T: FloatOps> {
    n_points: usize,
    iterations: usize,
    lambda_initial: f64,
    lambda_final: f64,
    learning_rate_initial: f64,
    learning_rate_final: f64,
    tolerance: Option<f64>,
    weights: Array2<T>,
    /// `½ α_iᵀ D α_i` of the trained prototypes, for out-of-sample queries.
    self_terms: Option<Array1<T>>,
    state: TrainingState,
    iterations_run: usize,
    log: Option<TrainingLog<T>>,
}

/// Exponential interpolation from `initial` to `last` at progress `t / total`.
fn schedule(initial: f64, last: f64, t: usize, total: usize) -> f64 {
    initial * (last / initial).powf(t as f64 / total as f64)
}

/// `½ α_iᵀ D α_i` for every prototype, given `Dαᵀ` (`n×k`).
fn self_terms<T: FloatOps>(weights: &Array2<T>, d_alpha: &Array2<T>) -> Array1<T> {
    let half = T::constant(0.5);
    Array1::from_iter(
        weights
            .axis_iter(Axis(0))
            .zip(d_alpha.axis_iter(Axis(1)))
            .map(|(alpha, column)| half * alpha.dot(&column)),
    )
}

fn argmin<T: FloatOps>(row: ArrayView1<T>) -> usize {
    row.iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl<T: FloatOps> RelationalNeuralGas<T> {
    fn check_dissimilarities(&self, d: &ArrayView2<T>) -> anyhow::Result<()> {
        let n = dense::ensure_square(d, "relational neural gas")?;
        if n != self.n_points {
            return Err(AlgebraError::dimension(format!(
                "model was built for {} objects, dissimilarities describe {}",
                self.n_points, n
            ))
            .into());
        }
        Ok(())
    }

    /// `n×k` distances of every object to every prototype.
    fn distances(&self, d: &ArrayView2<T>) -> (Array2<T>, Array1<T>) {
        let mut d_alpha = d.dot(&self.weights.t());
        let terms = self_terms(&self.weights, &d_alpha);
        for mut row in d_alpha.axis_iter_mut(Axis(0)) {
            row -= &terms;
        }
        (d_alpha, terms)
    }

    /// Runs the full iteration budget (or until the tolerance is met) on the
    /// `n×n` dissimilarity matrix `d`, starting from the current prototypes.
    ///
    /// # Errors
    /// [`AlgebraError::Dimension`] if `d` is not square or does not match the
    /// number of objects the model was built for.
    pub fn train(&mut self, d: ArrayView2<T>) -> anyhow::Result<TrainingState> {
        self.check_dissimilarities(&d)?;
        dense::ensure_finite(&d)?;
        self.state = TrainingState::Training;
        self.iterations_run = 0;
        if let Some(log) = self.log.as_mut() {
            log.prototypes.clear();
            log.quantization_error.clear();
        }

        let k = self.weights.nrows();
        let total = self.iterations;
        for t in 0..total {
            let lambda = T::constant(schedule(self.lambda_initial, self.lambda_final, t, total));
            let rate = T::constant(schedule(
                self.learning_rate_initial,
                self.learning_rate_final,
                t,
                total,
            ));

            let (dist, _) = self.distances(&d);
            // neighborhood cooperation h = exp(-rank / λ), object-major
            let mut h = Array2::<T>::zeros((self.n_points, k));
            h.axis_iter_mut(Axis(0))
                .into_par_iter()
                .zip(dist.axis_iter(Axis(0)).into_par_iter())
                .for_each(|(mut h_row, d_row)| {
                    let mut order: Vec<usize> = (0..k).collect();
                    order.sort_by(|&a, &b| d_row[a].partial_cmp(&d_row[b]).unwrap_or(Ordering::Equal));
                    for (rank, &i) in order.iter().enumerate() {
                        h_row[i] = (-T::from_count(rank) / lambda).exp();
                    }
                });

            let mut target = h.reversed_axes();
            for mut row in target.axis_iter_mut(Axis(0)) {
                let total_weight = row.sum();
                if total_weight > T::zero() {
                    row.mapv_inplace(|x| x / total_weight);
                }
            }

            let mut change = T::zero();
            let keep = T::one() - rate;
            Zip::from(&mut self.weights)
                .and(&target)
                .for_each(|w, &goal| {
                    let next = keep * *w + rate * goal;
                    change = num_traits::Float::max(change, num_traits::Float::abs(next - *w));
                    *w = next;
                });
            self.iterations_run = t + 1;

            if self.log.is_some() {
                let error = self.quantization_error(d)?;
                if let Some(log) = self.log.as_mut() {
                    log.prototypes.push(self.weights.clone());
                    log.quantization_error.push(error);
                }
                trace!("iteration {}: quantization error {}", t + 1, error);
            }

            if let Some(tolerance) = self.tolerance {
                if change < T::constant(tolerance) {
                    self.state = TrainingState::Converged;
                    break;
                }
            }
        }

        if self.state == TrainingState::Training {
            self.state = TrainingState::IterationBudgetExhausted;
        }
        let (_, terms) = self.distances(&d);
        self.self_terms = Some(terms);
        info!(
            "relational neural gas: {:?} after {} iterations",
            self.state, self.iterations_run
        );
        Ok(self.state)
    }

    /// Index of the nearest prototype for every training object.
    pub fn assign(&self, d: ArrayView2<T>) -> anyhow::Result<Vec<usize>> {
        self.check_dissimilarities(&d)?;
        let (dist, _) = self.distances(&d);
        Ok(dist.axis_iter(Axis(0)).map(argmin).collect())
    }

    /// Distances from new objects to every prototype, given their `m×n`
    /// dissimilarities to the training objects.
    ///
    /// # Errors
    /// [`AlgebraError::UnsupportedConfiguration`] before training,
    /// [`AlgebraError::Dimension`] if `cross` does not have `n` columns.
    pub fn distances_to(&self, cross: ArrayView2<T>) -> anyhow::Result<Array2<T>> {
        let terms = self.self_terms.as_ref().ok_or_else(|| {
            AlgebraError::unsupported("relational neural gas has not been trained yet")
        })?;
        dense::ensure_non_empty(&cross)?;
        if cross.ncols() != self.n_points {
            return Err(AlgebraError::dimension(format!(
                "expected dissimilarities to {} training objects, got {}",
                self.n_points,
                cross.ncols()
            ))
            .into());
        }
        let mut dist = cross.dot(&self.weights.t());
        for mut row in dist.axis_iter_mut(Axis(0)) {
            row -= terms;
        }
        Ok(dist)
    }

    /// Nearest prototype for each new object; see [`Self::distances_to`].
    pub fn assign_new(&self, cross: ArrayView2<T>) -> anyhow::Result<Vec<usize>> {
        let dist = self.distances_to(cross)?;
        Ok(dist.axis_iter(Axis(0)).map(argmin).collect())
    }

    /// Sum over the objects of the absolute distance to the prototype
    /// [`Self::assign`] picks for them.
    pub fn quantization_error(&self, d: ArrayView2<T>) -> anyhow::Result<T> {
        self.check_dissimilarities(&d)?;
        let (dist, _) = self.distances(&d);
        Ok(dist
            .axis_iter(Axis(0))
            .map(|row| num_traits::Float::abs(row[argmin(row)]))
            .fold(T::zero(), |acc, x| acc + x))
    }

    /// Prototype weightings as the rows of a `k×n` matrix.
    pub fn prototypes(&self) -> &Array2<T> {
        &self.weights
    }

    pub fn prototype(&self, index: usize) -> ArrayView1<'_, T> {
        self.weights.row(index)
    }

    pub fn n_prototypes(&self) -> usize {
        self.weights.nrows()
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Iterations performed by the last call to [`Self::train`].
    pub fn iterations(&self) -> usize {
        self.iterations_run
    }

    /// Turns per-iteration snapshots on or off; takes effect on the next training run.
    pub fn set_logging(&mut self, enabled: bool) {
        self.log = if enabled { Some(TrainingLog::default()) } else { None };
    }

    pub fn log(&self) -> Option<&TrainingLog<T>> {
        self.log.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{cross_distances, pairwise_distances, SquaredEuclidean};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn two_clusters() -> Array2<f64> {
        Array2::from_shape_fn((20, 2), |(i, j)| {
            let offset = if i < 10 { 0.0 } else { 10.0 };
            let jitter = ((i * 7 + j * 3) % 5) as f64 * 0.2 - 0.4;
            offset + jitter
        })
    }

    #[test]
    fn test_separates_two_clusters() {
        let x = two_clusters();
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        for seed in [1, 7, 42] {
            let mut gas = RelationalNeuralGasBuilder::new(2)
                .iterations(50)
                .seed(seed)
                .build(20)
                .unwrap();
            assert_eq!(gas.state(), TrainingState::Initialized);
            let state = gas.train(d.view()).unwrap();
            assert_eq!(state, TrainingState::IterationBudgetExhausted);
            assert_eq!(gas.iterations(), 50);

            let labels = gas.assign(d.view()).unwrap();
            assert!(labels[..10].iter().all(|&l| l == labels[0]));
            assert!(labels[10..].iter().all(|&l| l == labels[10]));
            assert_ne!(labels[0], labels[10]);
        }
    }

    #[test]
    fn test_weightings_stay_convex() {
        let x = two_clusters();
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        let mut gas = RelationalNeuralGasBuilder::new(3)
            .iterations(20)
            .build(20)
            .unwrap();
        gas.train(d.view()).unwrap();
        for row in gas.prototypes().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
            assert!(row.iter().all(|&w| w >= 0.0));
        }
    }

    #[test]
    fn test_relational_distance_matches_euclidean() {
        let x = array![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        let mut gas = RelationalNeuralGasBuilder::new(1)
            .iterations(1)
            .learning_rate(1.0, 1.0)
            .lambda_initial(1.0)
            .build(3)
            .unwrap();
        gas.train(d.view()).unwrap();
        // a single prototype moves to the centroid in one full step
        let centroid = gas.prototypes().dot(&x);
        assert_abs_diff_eq!(centroid[[0, 0]], 2.0 / 3.0, epsilon = 1e-12);
        let (dist, _) = gas.distances(&d.view());
        for j in 0..3 {
            let dx = x[[j, 0]] - centroid[[0, 0]];
            let dy = x[[j, 1]] - centroid[[0, 1]];
            assert_abs_diff_eq!(dist[[j, 0]], dx * dx + dy * dy, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_logging_and_quantization_error() {
        let x = two_clusters();
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        let mut gas = RelationalNeuralGasBuilder::new(2)
            .iterations(30)
            .logging(true)
            .build(20)
            .unwrap();
        gas.train(d.view()).unwrap();
        let log = gas.log().unwrap();
        assert_eq!(log.prototypes.len(), 30);
        assert_eq!(log.quantization_error.len(), 30);
        assert_eq!(log.prototypes[29], gas.prototypes().clone());
        let last = *log.quantization_error.last().unwrap();
        assert_abs_diff_eq!(last, gas.quantization_error(d.view()).unwrap(), epsilon = 1e-12);
        assert!(last < log.quantization_error[0]);

        gas.set_logging(false);
        gas.train(d.view()).unwrap();
        assert!(gas.log().is_none());
    }

    #[test]
    fn test_quantization_error_follows_assignment() {
        // violates the triangle inequality, so relational distances can turn negative
        let d = array![
            [0.0, 1.0, 1.0, 9.0, 4.0],
            [1.0, 0.0, 9.0, 1.0, 4.0],
            [1.0, 9.0, 0.0, 1.0, 4.0],
            [9.0, 1.0, 1.0, 0.0, 4.0],
            [4.0, 4.0, 4.0, 4.0, 0.0]
        ];
        let mut gas = RelationalNeuralGasBuilder::new(2)
            .iterations(10)
            .build::<f64>(5)
            .unwrap();
        gas.train(d.view()).unwrap();
        let labels = gas.assign(d.view()).unwrap();
        let (dist, _) = gas.distances(&d.view());
        let expected: f64 = labels
            .iter()
            .enumerate()
            .map(|(j, &l)| dist[[j, l]].abs())
            .sum();
        assert_abs_diff_eq!(gas.quantization_error(d.view()).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_tolerance_converges() {
        let x = two_clusters();
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        let mut gas = RelationalNeuralGasBuilder::new(2)
            .iterations(1000)
            .tolerance(1e-9)
            .build(20)
            .unwrap();
        assert_eq!(gas.train(d.view()).unwrap(), TrainingState::Converged);
        assert!(gas.iterations() < 1000);
    }

    #[test]
    fn test_out_of_sample_assignment() {
        let x = two_clusters();
        let d = pairwise_distances(x.view(), &SquaredEuclidean).unwrap();
        let mut gas = RelationalNeuralGasBuilder::new(2)
            .iterations(50)
            .build(20)
            .unwrap();

        let queries = array![[0.1, -0.2], [9.8, 10.1]];
        let cross = cross_distances(queries.view(), x.view(), &SquaredEuclidean).unwrap();
        let err = gas.assign_new(cross.view()).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::UnsupportedConfiguration(_))
        ));

        gas.train(d.view()).unwrap();
        let labels = gas.assign(d.view()).unwrap();
        let new_labels = gas.assign_new(cross.view()).unwrap();
        assert_eq!(new_labels, vec![labels[0], labels[10]]);

        // training rows fed back as queries reproduce their own distances
        let own = gas.distances_to(d.view()).unwrap();
        let (dist, _) = gas.distances(&d.view());
        for (a, b) in own.iter().zip(dist.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }

        let err = gas.assign_new(Array2::<f64>::zeros((1, 5)).view()).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
    }

    #[test]
    fn test_configuration_errors() {
        let unsupported = |r: anyhow::Result<RelationalNeuralGas<f64>>| {
            matches!(
                r.as_ref().map_err(AlgebraError::kind_of),
                Err(Some(AlgebraError::UnsupportedConfiguration(_)))
            )
        };
        assert!(unsupported(RelationalNeuralGasBuilder::new(0).build(5)));
        let err = RelationalNeuralGasBuilder::new(6).build::<f64>(5).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
        assert!(unsupported(RelationalNeuralGasBuilder::new(2).iterations(0).build(5)));
        assert!(unsupported(RelationalNeuralGasBuilder::new(2).lambda_initial(0.0).build(5)));
        assert!(unsupported(RelationalNeuralGasBuilder::new(2).learning_rate(1.5, 0.5).build(5)));

        let mut gas = RelationalNeuralGasBuilder::new(2).build::<f64>(4).unwrap();
        let err = gas.train(Array2::zeros((3, 3)).view()).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
        let err = gas.train(Array2::zeros((4, 3)).view()).unwrap_err();
        assert!(matches!(
            AlgebraError::kind_of(&err),
            Some(AlgebraError::Dimension(_))
        ));
        assert_eq!(gas.state(), TrainingState::Initialized);
    }
}

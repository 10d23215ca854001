//! # Random distribution sampling
//!
//! A [`Sampler`] owns one seeded generator and draws scalars, vectors or
//! matrices from any [`Distribution`]. Distributions are a family tag plus up
//! to three parameters; omitted parameters take the family defaults.
//!
//! | family        | parameters (defaults)              |
//! |---------------|------------------------------------|
//! | `uniform`     | min (0), max (1)                   |
//! | `bernoulli`   | p (0.5)                            |
//! | `binomial`    | trials (1), p (0.5)                |
//! | `cauchy`      | location (0), scale (1)            |
//! | `gamma`       | shape (1), scale (1)               |
//! | `poisson`     | lambda (1)                         |
//! | `exponential` | rate (1)                           |
//! | `normal`      | mean (0), standard deviation (1)   |
//! | `student`     | degrees of freedom (1)             |
//! | `weibull`     | shape (1), scale (1)               |
//! | `rayleigh`    | sigma (1)                          |
//! | `chisquared`  | degrees of freedom (1)             |
//! | `pareto`      | scale (1), shape (1)               |
//! | `triangular`  | min (0), mode (0.5), max (1)       |
//! | `beta`        | alpha (1), beta (1)                |
//!
//! Draws come from the matching `rand_distr` family in `f64` and are then
//! rounded to the requested scalar type. Rayleigh is a Weibull with shape 2.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;
use parking_lot::Mutex;
use rand::distr::{Bernoulli, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{
    Beta, Binomial, Cauchy, ChiSquared, Distribution as RandDistribution, Exp, Gamma, Normal,
    Pareto, Poisson, StudentT, Triangular, Weibull,
};

use crate::dense::{Matrix, Vector};
use crate::error::AlgebraError;
use crate::utils::FloatOps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Uniform,
    Bernoulli,
    Binomial,
    Cauchy,
    Gamma,
    Poisson,
    Exponential,
    Normal,
    Student,
    Weibull,
    Rayleigh,
    ChiSquared,
    Pareto,
    Triangular,
    Beta,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 15] = [
        DistributionKind::Uniform,
        DistributionKind::Bernoulli,
        DistributionKind::Binomial,
        DistributionKind::Cauchy,
        DistributionKind::Gamma,
        DistributionKind::Poisson,
        DistributionKind::Exponential,
        DistributionKind::Normal,
        DistributionKind::Student,
        DistributionKind::Weibull,
        DistributionKind::Rayleigh,
        DistributionKind::ChiSquared,
        DistributionKind::Pareto,
        DistributionKind::Triangular,
        DistributionKind::Beta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::Uniform => "uniform",
            DistributionKind::Bernoulli => "bernoulli",
            DistributionKind::Binomial => "binomial",
            DistributionKind::Cauchy => "cauchy",
            DistributionKind::Gamma => "gamma",
            DistributionKind::Poisson => "poisson",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Normal => "normal",
            DistributionKind::Student => "student",
            DistributionKind::Weibull => "weibull",
            DistributionKind::Rayleigh => "rayleigh",
            DistributionKind::ChiSquared => "chisquared",
            DistributionKind::Pareto => "pareto",
            DistributionKind::Triangular => "triangular",
            DistributionKind::Beta => "beta",
        }
    }

    /// Default parameter values; the slice length is the family's arity.
    pub fn defaults(&self) -> &'static [f64] {
        match self {
            DistributionKind::Uniform => &[0.0, 1.0],
            DistributionKind::Bernoulli => &[0.5],
            DistributionKind::Binomial => &[1.0, 0.5],
            DistributionKind::Cauchy => &[0.0, 1.0],
            DistributionKind::Gamma => &[1.0, 1.0],
            DistributionKind::Poisson => &[1.0],
            DistributionKind::Exponential => &[1.0],
            DistributionKind::Normal => &[0.0, 1.0],
            DistributionKind::Student => &[1.0],
            DistributionKind::Weibull => &[1.0, 1.0],
            DistributionKind::Rayleigh => &[1.0],
            DistributionKind::ChiSquared => &[1.0],
            DistributionKind::Pareto => &[1.0, 1.0],
            DistributionKind::Triangular => &[0.0, 0.5, 1.0],
            DistributionKind::Beta => &[1.0, 1.0],
        }
    }

    pub fn arity(&self) -> usize {
        self.defaults().len()
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        DistributionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == tag)
            .ok_or_else(|| {
                AlgebraError::unsupported(format!("unknown distribution '{}'", s)).into()
            })
    }
}

/// The `rand_distr` object behind a validated [`Distribution`], in `f64`.
#[derive(Debug, Clone)]
enum Family {
    Uniform(Uniform<f64>),
    Bernoulli(Bernoulli),
    Binomial(Binomial),
    Cauchy(Cauchy<f64>),
    Gamma(Gamma<f64>),
    Poisson(Poisson<f64>),
    Exponential(Exp<f64>),
    Normal(Normal<f64>),
    Student(StudentT<f64>),
    /// Also carries Rayleigh, a Weibull with shape 2.
    Weibull(Weibull<f64>),
    ChiSquared(ChiSquared<f64>),
    Pareto(Pareto<f64>),
    Triangular(Triangular<f64>),
    Beta(Beta<f64>),
}

impl Family {
    fn build(kind: DistributionKind, [a, b, c]: [f64; 3]) -> anyhow::Result<Self> {
        let reject = |err: &dyn fmt::Display| -> anyhow::Error {
            AlgebraError::unsupported(format!("invalid {} parameters: {}", kind, err)).into()
        };
        let family = match kind {
            DistributionKind::Uniform => {
                Family::Uniform(Uniform::new(a, b).map_err(|e| reject(&e))?)
            }
            DistributionKind::Bernoulli => {
                Family::Bernoulli(Bernoulli::new(a).map_err(|e| reject(&e))?)
            }
            DistributionKind::Binomial => {
                Family::Binomial(Binomial::new(a as u64, b).map_err(|e| reject(&e))?)
            }
            DistributionKind::Cauchy => Family::Cauchy(Cauchy::new(a, b).map_err(|e| reject(&e))?),
            DistributionKind::Gamma => Family::Gamma(Gamma::new(a, b).map_err(|e| reject(&e))?),
            DistributionKind::Poisson => Family::Poisson(Poisson::new(a).map_err(|e| reject(&e))?),
            DistributionKind::Exponential => {
                Family::Exponential(Exp::new(a).map_err(|e| reject(&e))?)
            }
            DistributionKind::Normal => Family::Normal(Normal::new(a, b).map_err(|e| reject(&e))?),
            DistributionKind::Student => {
                Family::Student(StudentT::new(a).map_err(|e| reject(&e))?)
            }
            DistributionKind::Weibull => {
                Family::Weibull(Weibull::new(b, a).map_err(|e| reject(&e))?)
            }
            DistributionKind::Rayleigh => Family::Weibull(
                Weibull::new(a * std::f64::consts::SQRT_2, 2.0).map_err(|e| reject(&e))?,
            ),
            DistributionKind::ChiSquared => {
                Family::ChiSquared(ChiSquared::new(a).map_err(|e| reject(&e))?)
            }
            DistributionKind::Pareto => Family::Pareto(Pareto::new(a, b).map_err(|e| reject(&e))?),
            DistributionKind::Triangular => {
                Family::Triangular(Triangular::new(a, c, b).map_err(|e| reject(&e))?)
            }
            DistributionKind::Beta => Family::Beta(Beta::new(a, b).map_err(|e| reject(&e))?),
        };
        Ok(family)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Family::Uniform(d) => d.sample(rng),
            Family::Bernoulli(d) => {
                if d.sample(rng) {
                    1.0
                } else {
                    0.0
                }
            }
            Family::Binomial(d) => d.sample(rng) as f64,
            Family::Cauchy(d) => d.sample(rng),
            Family::Gamma(d) => d.sample(rng),
            Family::Poisson(d) => d.sample(rng),
            Family::Exponential(d) => d.sample(rng),
            Family::Normal(d) => d.sample(rng),
            Family::Student(d) => d.sample(rng),
            Family::Weibull(d) => d.sample(rng),
            Family::ChiSquared(d) => d.sample(rng),
            Family::Pareto(d) => d.sample(rng),
            Family::Triangular(d) => d.sample(rng),
            Family::Beta(d) => d.sample(rng),
        }
    }
}

/// A distribution family with validated parameters.
#[derive(Debug, Clone)]
pub struct Distribution<T: FloatOps> {
    kind: DistributionKind,
    params: [T; 3],
    family: Family,
}

impl<T: FloatOps> Distribution<T> {
    /// The family with all default parameters.
    pub fn new(kind: DistributionKind) -> anyhow::Result<Self> {
        Self::with_parameters(kind, &[])
    }

    /// Overrides the leading parameters; the rest keep their defaults.
    ///
    /// # Errors
    /// [`AlgebraError::UnsupportedConfiguration`] for too many parameters or
    /// values outside the family's domain.
    pub fn with_parameters(kind: DistributionKind, values: &[T]) -> anyhow::Result<Self> {
        if values.len() > kind.arity() {
            bail!(AlgebraError::unsupported(format!(
                "{} takes at most {} parameters, got {}",
                kind,
                kind.arity(),
                values.len()
            )));
        }
        let mut params = [T::zero(); 3];
        for (slot, &d) in params.iter_mut().zip(kind.defaults()) {
            *slot = T::constant(d);
        }
        params[..values.len()].copy_from_slice(values);
        validate(kind, &params)?;
        let family = Family::build(kind, params.map(|p| p.as_f64()))?;
        Ok(Distribution {
            kind,
            params,
            family,
        })
    }

    /// Parses a family tag such as `"normal"` and applies the given parameters.
    pub fn parse(name: &str, values: &[T]) -> anyhow::Result<Self> {
        Self::with_parameters(name.parse()?, values)
    }

    pub fn uniform(min: T, max: T) -> anyhow::Result<Self> {
        Self::with_parameters(DistributionKind::Uniform, &[min, max])
    }

    pub fn normal(mean: T, sd: T) -> anyhow::Result<Self> {
        Self::with_parameters(DistributionKind::Normal, &[mean, sd])
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    pub fn parameters(&self) -> &[T] {
        &self.params[..self.kind.arity()]
    }
}

/// Domain checks run before the `rand_distr` object is built.
fn validate<T: FloatOps>(kind: DistributionKind, params: &[T; 3]) -> anyhow::Result<()> {
    let arity = kind.arity();
    if params[..arity].iter().any(|p| !num_traits::Float::is_finite(*p)) {
        bail!(AlgebraError::unsupported(format!(
            "{} parameters must be finite",
            kind
        )));
    }
    let [a, b, c] = params.map(|p| p.as_f64());
    let positive = |x: f64| x > 0.0;
    let probability = |x: f64| (0.0..=1.0).contains(&x);
    let ok = match kind {
        DistributionKind::Uniform => a < b,
        DistributionKind::Bernoulli => probability(a),
        DistributionKind::Binomial => a >= 0.0 && a.fract() == 0.0 && probability(b),
        DistributionKind::Cauchy => positive(b),
        DistributionKind::Gamma => positive(a) && positive(b),
        DistributionKind::Poisson => positive(a),
        DistributionKind::Exponential => positive(a),
        DistributionKind::Normal => positive(b),
        DistributionKind::Student => positive(a),
        DistributionKind::Weibull => positive(a) && positive(b),
        DistributionKind::Rayleigh => positive(a),
        DistributionKind::ChiSquared => positive(a),
        DistributionKind::Pareto => positive(a) && positive(b),
        DistributionKind::Triangular => a <= b && b <= c && a < c,
        DistributionKind::Beta => positive(a) && positive(b),
    };
    if !ok {
        bail!(AlgebraError::unsupported(format!(
            "invalid {} parameters {:?}",
            kind,
            &params[..arity]
        )));
    }
    Ok(())
}

/// Draws samples from [`Distribution`]s with a single owned generator.
///
/// Two samplers built from the same seed produce the same sequence.
#[derive(Debug, Clone)]
pub struct Sampler<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl Sampler<ChaCha8Rng> {
    pub fn seed_from_u64(seed: u64) -> Self {
        Sampler {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Sampler {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl Default for Sampler<ChaCha8Rng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> Sampler<R> {
    pub fn from_rng(rng: R) -> Self {
        Sampler { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn sample<T: FloatOps>(&mut self, dist: &Distribution<T>) -> T {
        let x = T::constant(dist.family.draw(&mut self.rng));
        if dist.kind == DistributionKind::Uniform {
            // f32 rounding can land on the open upper bound
            let [min, max, _] = dist.params;
            if x >= max {
                return max - (max - min) * <T as num_traits::Float>::epsilon();
            }
        }
        x
    }

    pub fn sample_n<T: FloatOps>(&mut self, dist: &Distribution<T>, n: usize) -> Vector<T> {
        Vector::from_shape_simple_fn(n, || self.sample(dist))
    }

    /// A `rows×cols` matrix of independent draws.
    pub fn sample_matrix<T: FloatOps>(
        &mut self,
        dist: &Distribution<T>,
        rows: usize,
        cols: usize,
    ) -> anyhow::Result<Matrix<T>> {
        if rows == 0 || cols == 0 {
            bail!(AlgebraError::dimension(format!(
                "random matrix must be non-empty, got {}x{}",
                rows, cols
            )));
        }
        Ok(Matrix::from_shape_simple_fn((rows, cols), || self.sample(dist)))
    }
}

/// A [`Sampler`] behind a mutex, for drawing from several threads.
#[derive(Debug, Clone)]
pub struct SharedSampler {
    inner: Arc<Mutex<Sampler<ChaCha8Rng>>>,
}

impl SharedSampler {
    pub fn new(sampler: Sampler<ChaCha8Rng>) -> Self {
        SharedSampler {
            inner: Arc::new(Mutex::new(sampler)),
        }
    }

    pub fn seed_from_u64(seed: u64) -> Self {
        Self::new(Sampler::seed_from_u64(seed))
    }

    pub fn sample<T: FloatOps>(&self, dist: &Distribution<T>) -> T {
        self.inner.lock().sample(dist)
    }

    pub fn sample_n<T: FloatOps>(&self, dist: &Distribution<T>, n: usize) -> Vector<T> {
        self.inner.lock().sample_n(dist, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rayon::prelude::*;
    use std::f64::consts::PI;
    use statrs::distribution as sd;
    use statrs::statistics::Distribution as Moments;

    fn moments(xs: &Vector<f64>) -> (f64, f64) {
        let n = xs.len() as f64;
        let mean = xs.sum() / n;
        let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    fn check(kind: DistributionKind, params: &[f64], expected: (f64, f64), tol: f64) {
        let dist = Distribution::with_parameters(kind, params).unwrap();
        let mut sampler = Sampler::seed_from_u64(0x5eed ^ kind as u64);
        let xs = sampler.sample_n(&dist, 200_000);
        let (mean, var) = moments(&xs);
        assert!(
            (mean - expected.0).abs() <= tol * expected.0.abs().max(1.0),
            "{} mean {} vs {}",
            kind,
            mean,
            expected.0
        );
        assert!(
            (var - expected.1).abs() <= 3.0 * tol * expected.1.abs().max(1.0),
            "{} variance {} vs {}",
            kind,
            var,
            expected.1
        );
    }

    #[test]
    fn test_uniform_range_and_mean() {
        let dist = Distribution::<f64>::new(DistributionKind::Uniform).unwrap();
        let mut sampler = Sampler::seed_from_u64(42);
        let xs = sampler.sample_n(&dist, 100_000);
        assert!(xs.iter().all(|&x| (0.0..1.0).contains(&x)));
        assert_abs_diff_eq!(xs.mean().unwrap(), 0.5, epsilon = 0.005);

        let narrow = Distribution::<f32>::uniform(0.0, 1.0).unwrap();
        let ys = sampler.sample_n(&narrow, 100_000);
        assert!(ys.iter().all(|&y| (0.0..1.0).contains(&y)));
    }

    #[test]
    fn test_normal_moments() {
        let standard = Distribution::<f64>::new(DistributionKind::Normal).unwrap();
        let mut sampler = Sampler::seed_from_u64(42);
        let xs = sampler.sample_n(&standard, 400_000);
        let (mean, var) = moments(&xs);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.01);
        assert!((var - 1.0).abs() < 0.01, "variance {}", var);

        let dist = Distribution::normal(2.0, 3.0).unwrap();
        let mut sampler = Sampler::seed_from_u64(7);
        let xs = sampler.sample_n(&dist, 250_000);
        let (mean, var) = moments(&xs);
        assert_abs_diff_eq!(mean, 2.0, epsilon = 0.05);
        assert_abs_diff_eq!(var, 9.0, epsilon = 0.15);
    }

    #[test]
    fn test_large_counts_sample_in_constant_time() {
        let mut sampler = Sampler::seed_from_u64(3);
        let binomial =
            Distribution::<f64>::with_parameters(DistributionKind::Binomial, &[1e12, 0.5]).unwrap();
        let xs = sampler.sample_n(&binomial, 1000);
        assert!(xs.iter().all(|&x| x.fract() == 0.0 && (0.0..=1e12).contains(&x)));
        assert!((xs.mean().unwrap() / 5e11 - 1.0).abs() < 1e-4);

        let poisson = Distribution::<f64>::with_parameters(DistributionKind::Poisson, &[1e9]).unwrap();
        let ys = sampler.sample_n(&poisson, 1000);
        assert!((ys.mean().unwrap() / 1e9 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_families_match_reference_moments() {
        let tol = 0.02;
        let gamma = sd::Gamma::new(2.5, 1.0 / 1.5).unwrap();
        check(
            DistributionKind::Gamma,
            &[2.5, 1.5],
            (gamma.mean().unwrap(), gamma.variance().unwrap()),
            tol,
        );
        let small_gamma = sd::Gamma::new(0.4, 1.0).unwrap();
        check(
            DistributionKind::Gamma,
            &[0.4],
            (small_gamma.mean().unwrap(), small_gamma.variance().unwrap()),
            tol,
        );
        let poisson = sd::Poisson::new(45.0).unwrap();
        check(
            DistributionKind::Poisson,
            &[45.0],
            (poisson.mean().unwrap(), poisson.variance().unwrap()),
            tol,
        );
        let exp = sd::Exp::new(2.0).unwrap();
        check(
            DistributionKind::Exponential,
            &[2.0],
            (exp.mean().unwrap(), exp.variance().unwrap()),
            tol,
        );
        let t = sd::StudentsT::new(0.0, 1.0, 6.0).unwrap();
        check(
            DistributionKind::Student,
            &[6.0],
            (t.mean().unwrap(), t.variance().unwrap()),
            tol,
        );
        let weibull = sd::Weibull::new(2.0, 3.0).unwrap();
        check(
            DistributionKind::Weibull,
            &[2.0, 3.0],
            (weibull.mean().unwrap(), weibull.variance().unwrap()),
            tol,
        );
        let chi = sd::ChiSquared::new(4.0).unwrap();
        check(
            DistributionKind::ChiSquared,
            &[4.0],
            (chi.mean().unwrap(), chi.variance().unwrap()),
            tol,
        );
        let pareto = sd::Pareto::new(1.0, 5.0).unwrap();
        check(
            DistributionKind::Pareto,
            &[1.0, 5.0],
            (pareto.mean().unwrap(), pareto.variance().unwrap()),
            tol,
        );
        let tri = sd::Triangular::new(0.0, 4.0, 1.0).unwrap();
        check(
            DistributionKind::Triangular,
            &[0.0, 1.0, 4.0],
            (tri.mean().unwrap(), tri.variance().unwrap()),
            tol,
        );
        let beta = sd::Beta::new(2.0, 5.0).unwrap();
        check(
            DistributionKind::Beta,
            &[2.0, 5.0],
            (beta.mean().unwrap(), beta.variance().unwrap()),
            tol,
        );
        let binomial = sd::Binomial::new(0.3, 20).unwrap();
        check(
            DistributionKind::Binomial,
            &[20.0, 0.3],
            (binomial.mean().unwrap(), binomial.variance().unwrap()),
            tol,
        );
        check(DistributionKind::Bernoulli, &[0.2], (0.2, 0.16), tol);
        let sigma: f64 = 2.0;
        check(
            DistributionKind::Rayleigh,
            &[sigma],
            (
                sigma * (PI / 2.0).sqrt(),
                (4.0 - PI) / 2.0 * sigma * sigma,
            ),
            tol,
        );
    }

    #[test]
    fn test_cauchy_median() {
        let dist = Distribution::with_parameters(DistributionKind::Cauchy, &[3.0, 0.5]).unwrap();
        let mut sampler = Sampler::seed_from_u64(99);
        let mut xs = sampler.sample_n(&dist, 50_001).to_vec();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(xs[25_000], 3.0, epsilon = 0.03);
    }

    #[test]
    fn test_seed_reproducibility() {
        let dist = Distribution::<f64>::new(DistributionKind::Gamma).unwrap();
        let a = Sampler::seed_from_u64(5).sample_n(&dist, 32);
        let b = Sampler::seed_from_u64(5).sample_n(&dist, 32);
        let c = Sampler::seed_from_u64(6).sample_n(&dist, 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_and_validation() {
        let dist = Distribution::<f64>::parse("Triangular", &[-1.0]).unwrap();
        assert_eq!(dist.kind(), DistributionKind::Triangular);
        assert_eq!(dist.parameters(), &[-1.0, 0.5, 1.0][..]);
        assert!(Distribution::<f64>::parse("triangular", &[1.0]).is_err());

        for (name, params) in [
            ("gaussian", vec![]),
            ("uniform", vec![2.0, 1.0]),
            ("bernoulli", vec![1.5]),
            ("poisson", vec![0.0]),
            ("normal", vec![0.0, 1.0, 2.0]),
            ("binomial", vec![2.5]),
        ] {
            let err = Distribution::<f64>::parse(name, &params).unwrap_err();
            assert!(
                matches!(
                    AlgebraError::kind_of(&err),
                    Some(AlgebraError::UnsupportedConfiguration(_))
                ),
                "{} {:?}",
                name,
                params
            );
        }
        for kind in DistributionKind::ALL {
            assert_eq!(kind.name().parse::<DistributionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_sample_matrix() {
        let mut sampler = Sampler::seed_from_u64(1);
        let dist = Distribution::<f32>::new(DistributionKind::Normal).unwrap();
        let m = sampler.sample_matrix(&dist, 3, 4).unwrap();
        assert_eq!(m.dim(), (3, 4));
        assert!(sampler.sample_matrix(&dist, 0, 4).is_err());
    }

    #[test]
    fn test_shared_sampler_across_threads() {
        let shared = SharedSampler::seed_from_u64(11);
        let dist = Distribution::<f64>::new(DistributionKind::Exponential).unwrap();
        let draws: Vec<f64> = (0..1000)
            .into_par_iter()
            .map(|_| shared.sample(&dist))
            .collect();
        assert_eq!(draws.len(), 1000);
        assert!(draws.iter().all(|&x| x >= 0.0));
        assert_eq!(shared.sample_n(&dist, 5).len(), 5);
    }
}

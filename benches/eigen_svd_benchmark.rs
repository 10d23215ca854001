use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use ml_algebra::dimred::mds::{MdsBuilder, Projection};
use ml_algebra::dimred::pca::PCABuilder;
use ml_algebra::random::{Distribution, Sampler};
use ml_algebra::{EigenSolver, Matrix, SvdSolver};
use std::time::Duration;

#[derive(Clone)]
pub struct DenseMatrixConfig {
    seed: u64,
    matrix_sizes: Vec<usize>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for DenseMatrixConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            matrix_sizes: vec![16, 64, 128, 256],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_matrix(rows: usize, cols: usize, seed: u64) -> Matrix<f64> {
    let mut sampler = Sampler::seed_from_u64(seed);
    let dist = Distribution::uniform(-1.0, 1.0).unwrap();
    sampler.sample_matrix(&dist, rows, cols).unwrap()
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &DenseMatrixConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_eigen(c: &mut Criterion) {
    let config = DenseMatrixConfig::default();
    let mut group = configure_group(c, "Eigen_Decomposition", &config);

    for &n in config.matrix_sizes.iter() {
        let a = create_test_matrix(n, n, config.seed + n as u64);
        let symmetric = &a + &a.t();
        let solver = EigenSolver::default();

        group.bench_with_input(BenchmarkId::new("symmetric", n), &n, |b, _| {
            b.iter(|| solver.solve(symmetric.view()).unwrap());
        });

        // random non-symmetric input usually has complex pairs
        group.bench_with_input(BenchmarkId::new("general", n), &n, |b, _| {
            b.iter(|| solver.solve(a.view()).is_ok());
        });
    }
    group.finish();
}

pub fn bench_svd(c: &mut Criterion) {
    let config = DenseMatrixConfig::default();
    let mut group = configure_group(c, "SVD", &config);

    for &n in config.matrix_sizes.iter() {
        let tall = create_test_matrix(2 * n, n, config.seed + n as u64);
        let solver = SvdSolver::default();
        group.bench_with_input(
            BenchmarkId::new("economy", format!("{}x{}", 2 * n, n)),
            &n,
            |b, _| {
                b.iter(|| solver.solve(tall.view()).unwrap());
            },
        );
    }
    group.finish();
}

pub fn bench_reducers(c: &mut Criterion) {
    let config = DenseMatrixConfig::default();
    let mut group = configure_group(c, "Dimensionality_Reduction", &config);

    for &n in config.matrix_sizes.iter() {
        let data = create_test_matrix(n, 10, config.seed + n as u64);

        group.bench_with_input(BenchmarkId::new("pca", n), &n, |b, _| {
            b.iter(|| {
                PCABuilder::new()
                    .n_components(3)
                    .build::<f64>()
                    .fit_transform(data.view())
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("sammon", n), &n, |b, _| {
            b.iter(|| {
                MdsBuilder::new()
                    .n_components(2)
                    .projection(Projection::Sammon)
                    .iterations(20)
                    .build::<f64>()
                    .fit_transform(data.view())
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(dense_benches, bench_eigen, bench_svd, bench_reducers);
criterion_main!(dense_benches);

//! Clusters three Gaussian blobs with relational neural gas.
//!
//! Usage: `cargo run --example rng -- [prototypes] [iterations]`

use ml_algebra::clustering::RelationalNeuralGasBuilder;
use ml_algebra::random::{Distribution, Sampler};
use ml_algebra::similarity::{pairwise_distances, SquaredEuclidean};
use ndarray::{concatenate, Array2, Axis};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let prototypes: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(3);
    let iterations: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100);

    let mut sampler = Sampler::seed_from_u64(3);
    let noise = Distribution::normal(0.0, 0.5)?;
    let blobs: Vec<Array2<f64>> = [(0.0, 0.0), (6.0, 0.0), (3.0, 5.0)]
        .iter()
        .map(|&(cx, cy)| -> anyhow::Result<Array2<f64>> {
            let mut blob = sampler.sample_matrix(&noise, 20, 2)?;
            blob.column_mut(0).mapv_inplace(|x| x + cx);
            blob.column_mut(1).mapv_inplace(|y| y + cy);
            Ok(blob)
        })
        .collect::<anyhow::Result<_>>()?;
    let views: Vec<_> = blobs.iter().map(|b| b.view()).collect();
    let points = concatenate(Axis(0), &views)?;
    let dissimilarities = pairwise_distances(points.view(), &SquaredEuclidean)?;

    let mut gas = RelationalNeuralGasBuilder::new(prototypes)
        .iterations(iterations)
        .logging(true)
        .build::<f64>(points.nrows())?;
    let state = gas.train(dissimilarities.view())?;
    let labels = gas.assign(dissimilarities.view())?;

    println!("state: {:?} after {} iterations", state, gas.iterations());
    println!("prototype positions:\n{:.4}", gas.prototypes().dot(&points));
    println!("labels: {:?}", labels);
    if let Some(log) = gas.log() {
        if let (Some(first), Some(last)) = (log.quantization_error.first(), log.quantization_error.last()) {
            println!("quantization error: {:.4} -> {:.4}", first, last);
        }
    }
    Ok(())
}

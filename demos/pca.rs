//! Projects noisy points from a 3-D line onto their principal axes.
//!
//! Usage: `cargo run --example pca -- [points] [components] [covariance|svd]`

use ml_algebra::dimred::pca::{PCABuilder, PcaMethod};
use ml_algebra::random::{Distribution, Sampler};
use ndarray::Array2;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let points: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(100);
    let components: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2);
    let method: PcaMethod = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();

    let mut sampler = Sampler::seed_from_u64(7);
    let t = sampler.sample_n(&Distribution::uniform(-5.0, 5.0)?, points);
    let noise = Distribution::normal(0.0, 0.2)?;
    let mut data = Array2::from_shape_fn((points, 3), |(i, j)| t[i] * [1.0, 2.0, -0.5][j]);
    data.mapv_inplace(|x| x + sampler.sample(&noise));

    let mut pca = PCABuilder::new()
        .n_components(components)
        .method(method)
        .build::<f64>();
    let scores = pca.fit_transform(data.view())?;

    if let Some(basis) = pca.components() {
        println!("principal axes (columns):\n{:.4}", basis);
    }
    if let Some(ratio) = pca.explained_variance_ratio() {
        println!("explained variance ratio: {:.4}", ratio);
    }
    println!("first projected points:\n{:.4}", scores.slice(ndarray::s![..points.min(5), ..]));
    Ok(())
}

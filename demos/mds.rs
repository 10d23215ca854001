//! Embeds random points with metric MDS, Sammon mapping or HiT.
//!
//! Usage: `cargo run --example mds -- [metric|sammon|hit] [dimension] [none|single|double]`

use ml_algebra::dimred::mds::{Centering, MdsBuilder, Projection};
use ml_algebra::random::{Distribution, Sampler};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let projection: Projection = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();
    let dimension: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2);
    let centering: Centering = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();

    let mut sampler = Sampler::seed_from_u64(11);
    let points = sampler.sample_matrix(&Distribution::uniform(0.0, 10.0)?, 30, 5)?;

    let mut mds = MdsBuilder::new()
        .n_components(dimension)
        .projection(projection)
        .centering(centering)
        .build::<f64>();
    let embedding = mds.fit_transform(points.view())?;

    println!("embedding:\n{:.4}", embedding);
    if let (Some(stress), Some(r)) = (mds.stress(), mds.correlation()) {
        println!(
            "{:?}: stress = {:.6}, correlation = {:.6}, iterations = {}",
            projection,
            stress,
            r,
            mds.iterations()
        );
    }
    Ok(())
}

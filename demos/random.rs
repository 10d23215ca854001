//! Draws samples from a named distribution and reports their moments.
//!
//! Usage: `cargo run --example random -- [distribution] [count] [param...]`

use ml_algebra::random::{Distribution, Sampler};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "normal".to_string());
    let count: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(10_000);
    let params = args.map(|s| s.parse::<f64>()).collect::<Result<Vec<_>, _>>()?;

    let dist = Distribution::parse(&name, &params)?;
    let mut sampler = Sampler::from_entropy();
    let samples = sampler.sample_n(&dist, count);

    let mean = samples.mean().unwrap_or(f64::NAN);
    let variance = if count > 1 { samples.var(1.0) } else { 0.0 };
    println!("{} {:?}", dist.kind(), dist.parameters());
    println!("first samples: {:.4}", samples.slice(ndarray::s![..count.min(8)]));
    println!("mean = {:.6}, variance = {:.6}", mean, variance);
    Ok(())
}

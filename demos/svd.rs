//! Singular value decomposition of a random matrix.
//!
//! Usage: `cargo run --example svd -- [rows] [cols] [economy|full]`

use ml_algebra::random::{Distribution, Sampler};
use ml_algebra::svd::{SvdMode, SvdSolver};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let rows: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(6);
    let cols: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(4);
    let mode: SvdMode = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();

    let mut sampler = Sampler::seed_from_u64(42);
    let matrix = sampler.sample_matrix(&Distribution::<f64>::normal(0.0, 1.0)?, rows, cols)?;
    println!("matrix:\n{:.4}", matrix);

    let svd = SvdSolver::builder().mode(mode).build().solve(matrix.view())?;
    println!("singular values:\n{:.6}", svd.s());
    println!("U:\n{:.6}", svd.u());
    println!("V:\n{:.6}", svd.v());

    let residual = (&svd.reconstruct() - &matrix)
        .iter()
        .fold(0.0f64, |acc, x| acc.max(x.abs()));
    println!("max reconstruction error: {:e}", residual);
    Ok(())
}

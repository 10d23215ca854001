//! Eigen-decomposition of a random symmetric matrix.
//!
//! Usage: `cargo run --example eigen -- [size] [symmetry]`

use ml_algebra::eigen::{EigenSolver, Symmetry};
use ml_algebra::random::{Distribution, Sampler};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let size: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);
    let symmetry: Symmetry = args.next().map(|s| s.parse()).transpose()?.unwrap_or_default();

    let mut sampler = Sampler::seed_from_u64(42);
    let a = sampler.sample_matrix(&Distribution::uniform(0.0, 1.0)?, size, size)?;
    let matrix = match symmetry {
        Symmetry::General => a,
        _ => &a + &a.t(),
    };
    println!("matrix:\n{:.4}", matrix);

    let eig = EigenSolver::builder()
        .symmetry(symmetry)
        .build()
        .solve(matrix.view())?;
    println!("eigenvalues:\n{:.6}", eig.eigenvalues());
    println!("eigenvectors (columns):\n{:.6}", eig.eigenvectors());
    Ok(())
}

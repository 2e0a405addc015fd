//! Assemble a 2-D Laplacian from triplets and multiply it on every backend

use crs::{BackendRegistry, Result, SparseMatrix, Triplet, Vector};
use std::io;
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let grid = 300;
    let n = grid * grid;
    let start = Instant::now();
    let laplacian = SparseMatrix::from_triplets(n, n, &laplacian_triplets(grid))?;
    println!(
        "Assembled {}x{} Laplacian with {} non-zeros in {:?}",
        laplacian.rows(),
        laplacian.cols(),
        laplacian.non_zeros(),
        start.elapsed()
    );

    let x = Vector::from(vec![1.0; n]);
    let registry = BackendRegistry::global();
    for name in registry.names() {
        let backend = registry.find(&name)?;
        let mut y = Vector::new(n);
        let start = Instant::now();
        backend.spmv(&laplacian, &x, &mut y)?;
        // Interior rows sum to zero, boundary rows do not
        let boundary: f64 = y.iter().sum();
        println!("{name:>8}: spmv in {:?}, sum(y) = {boundary}", start.elapsed());
    }
    Ok(())
}

/// Five-point stencil on a `grid` x `grid` mesh
fn laplacian_triplets(grid: usize) -> Vec<Triplet> {
    let mut triplets = Vec::with_capacity(5 * grid * grid);
    for i in 0..grid {
        for j in 0..grid {
            let row = (i * grid + j) as i32;
            triplets.push(Triplet::new(row, row, 4.0));
            if i > 0 {
                triplets.push(Triplet::new(row, row - grid as i32, -1.0));
            }
            if i + 1 < grid {
                triplets.push(Triplet::new(row, row + grid as i32, -1.0));
            }
            if j > 0 {
                triplets.push(Triplet::new(row, row - 1, -1.0));
            }
            if j + 1 < grid {
                triplets.push(Triplet::new(row, row + 1, -1.0));
            }
        }
    }
    triplets
}

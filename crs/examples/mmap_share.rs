//! Save a matrix, map it back read-only and modify a private copy

use crs::{Result, SparseMatrix, Vector};
use std::io;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_writer(io::stderr)
        .init();

    let path = std::env::temp_dir().join("identity.crs");
    SparseMatrix::identity(1_000, 800)?.save(&path)?;

    let mapped = SparseMatrix::open_mmap(&path)?;
    println!("{mapped}");
    println!(
        "in shared memory: {}, footprint: {} bytes",
        mapped.in_shared_memory(),
        mapped.footprint()
    );

    // The first mutation copies the mapped arrays to the heap
    let mut scaled = SparseMatrix::open_mmap(&path)?;
    scaled.data_mut().iter_mut().for_each(|v| *v *= 2.0);
    scaled.prune(0.0);
    println!("{scaled}");
    println!("in shared memory: {}", scaled.in_shared_memory());

    let x = Vector::from(vec![1.0; scaled.cols()]);
    let mut y = Vector::new(scaled.rows());
    crs::linalg::backend()?.spmv(&scaled, &x, &mut y)?;
    println!("sum(y) = {}", y.iter().sum::<f64>());

    std::fs::remove_file(&path)?;
    Ok(())
}

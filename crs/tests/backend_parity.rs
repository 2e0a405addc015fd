//! Every registered backend must agree with the serial reference

use crs::linalg::GENERIC;
use crs::{BackendRegistry, Error, LinearAlgebra, Matrix, SparseMatrix, Triplet, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const TOLERANCE: f64 = 1e-9;

fn assert_close(op: &str, backend: &str, actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{backend} {op}: length");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let scale = e.abs().max(1.0);
        assert!(
            (a - e).abs() <= TOLERANCE * scale,
            "{backend} {op}: element {i} is {a}, expected {e}"
        );
    }
}

fn random_sparse(rng: &mut StdRng, rows: usize, cols: usize, count: usize) -> SparseMatrix {
    let triplets: Vec<Triplet> = (0..count)
        .map(|_| {
            Triplet::new(
                rng.gen_range(0..rows) as i32,
                rng.gen_range(0..cols) as i32,
                rng.gen_range(-5.0..5.0),
            )
        })
        .collect();
    SparseMatrix::from_triplets(rows, cols, &triplets).unwrap()
}

fn random_values(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-5.0..5.0)).collect()
}

fn others(registry: &BackendRegistry) -> Vec<Arc<dyn LinearAlgebra>> {
    registry
        .names()
        .iter()
        .filter(|name| name.as_str() != GENERIC)
        .map(|name| registry.find(name).unwrap())
        .collect()
}

#[test]
fn dense_kernels_agree() {
    let registry = BackendRegistry::with_defaults();
    let reference = registry.find(GENERIC).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for &(m, k, n) in &[(1, 1, 1), (7, 5, 3), (67, 130, 9), (200, 33, 70)] {
        let a = Matrix::from_col_major(m, k, random_values(&mut rng, m * k)).unwrap();
        let b = Matrix::from_col_major(k, n, random_values(&mut rng, k * n)).unwrap();
        let x = Vector::from(random_values(&mut rng, k));
        let z = Vector::from(random_values(&mut rng, k));

        let expected_dot = reference.dot(&x, &z).unwrap();
        let mut expected_gemv = Vector::new(m);
        reference.gemv(&a, &x, &mut expected_gemv).unwrap();
        let mut expected_gemm = Matrix::new(m, n);
        reference.gemm(&a, &b, &mut expected_gemm).unwrap();

        for backend in others(&registry) {
            let dot = backend.dot(&x, &z).unwrap();
            assert_close("dot", backend.name(), &[dot], &[expected_dot]);

            let mut y = Vector::from(vec![f64::NAN; m]);
            backend.gemv(&a, &x, &mut y).unwrap();
            assert_close("gemv", backend.name(), y.as_slice(), expected_gemv.as_slice());

            let mut c = Matrix::new(m, n);
            c.fill(123.0);
            backend.gemm(&a, &b, &mut c).unwrap();
            assert_close("gemm", backend.name(), c.as_slice(), expected_gemm.as_slice());
        }
    }
}

#[test]
fn sparse_kernels_agree() {
    let registry = BackendRegistry::with_defaults();
    let reference = registry.find(GENERIC).unwrap();
    let mut rng = StdRng::seed_from_u64(1234);

    for &(rows, cols, count) in &[(1, 1, 1), (10, 10, 30), (150, 40, 600), (40, 150, 600)] {
        let a = random_sparse(&mut rng, rows, cols, count);
        let x = Vector::from(random_values(&mut rng, cols));
        let y_diag = Vector::from(random_values(&mut rng, rows));
        let b = Matrix::from_col_major(cols, 6, random_values(&mut rng, cols * 6)).unwrap();

        let mut expected_spmv = Vector::new(rows);
        reference.spmv(&a, &x, &mut expected_spmv).unwrap();
        let mut expected_spmm = Matrix::new(rows, 6);
        reference.spmm(&a, &b, &mut expected_spmm).unwrap();
        let mut expected_dsptd = SparseMatrix::default();
        reference.dsptd(&x, &a, &y_diag, &mut expected_dsptd).unwrap();

        for backend in others(&registry) {
            let mut y = Vector::new(rows);
            backend.spmv(&a, &x, &mut y).unwrap();
            assert_close("spmv", backend.name(), y.as_slice(), expected_spmv.as_slice());

            let mut c = Matrix::new(rows, 6);
            backend.spmm(&a, &b, &mut c).unwrap();
            assert_close("spmm", backend.name(), c.as_slice(), expected_spmm.as_slice());

            let mut t = SparseMatrix::default();
            backend.dsptd(&x, &a, &y_diag, &mut t).unwrap();
            assert_eq!(t.shape(), expected_dsptd.shape(), "{} dsptd shape", backend.name());
            assert_eq!(t.outer(), expected_dsptd.outer());
            assert_eq!(t.inner(), expected_dsptd.inner());
            assert_close("dsptd", backend.name(), t.data(), expected_dsptd.data());
        }
    }
}

#[test]
fn size_mismatch_from_every_backend() {
    let registry = BackendRegistry::with_defaults();
    let a = SparseMatrix::identity(3, 4).unwrap();
    let x = Vector::new(3);

    for name in registry.names() {
        let backend = registry.find(&name).unwrap();
        let mut y = Vector::from(vec![5.0; 3]);
        let err = backend.spmv(&a, &x, &mut y).unwrap_err();
        assert!(
            matches!(err, Error::SizeMismatch { op: "spmv", .. }),
            "{name}: {err}"
        );
        assert_eq!(y.as_slice(), &[5.0; 3], "{name} touched the output");

        let err = backend
            .gemm(&Matrix::new(2, 3), &Matrix::new(2, 3), &mut Matrix::new(2, 3))
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { op: "gemm", .. }), "{name}: {err}");
    }
}

#[test]
fn transpose_twice_round_trips() {
    let mut rng = StdRng::seed_from_u64(9);
    let a = random_sparse(&mut rng, 30, 17, 120);
    let mut b = a.clone();
    b.transpose().transpose();
    assert_eq!(a, b);
}

//! Helpers shared by the unit tests.

use approx::abs_diff_eq;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub(crate) fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// `n` points drawn uniformly from `[-1, 1]^d`.
pub(crate) fn random_points(n: usize, d: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n, d), |_| rng.random_range(-1.0..1.0))
}

pub(crate) fn assert_all_close(actual: &Array2<f64>, expected: &Array2<f64>, tol: f64) {
    assert_eq!(actual.dim(), expected.dim(), "shape mismatch");
    for ((i, j), &a) in actual.indexed_iter() {
        let e = expected[[i, j]];
        assert!(
            abs_diff_eq!(a, e, epsilon = tol),
            "mismatch at ({}, {}): {} vs {}",
            i,
            j,
            a,
            e
        );
    }
}

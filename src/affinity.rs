//! Gaussian affinities from distances.
//!
//! `A[i, j] = exp(-(D[i, j] / radius)^2)`, applied to every dense cell or to
//! every stored sparse entry. The representation of the input is kept: a
//! sparse distance matrix yields a sparse affinity matrix with the same
//! pattern, except that entries whose affinity underflows to exactly `0.0`
//! are dropped (see [`crate::sparse`]).
//!
//! Note the asymmetry between the two forms. A dense distance matrix built
//! with a radius has `0` in its out-of-radius cells, which the kernel maps to
//! affinity `1`; the sparse form simply has no entry there.

use crate::matrix::GraphMatrix;
use crate::{ensure_positive, ensure_square, Result};

/// The kernel itself: `exp(-(distance / radius)^2)`.
#[inline]
pub fn gaussian_kernel(distance: f64, radius: f64) -> f64 {
    let t = distance / radius;
    (-(t * t)).exp()
}

/// Affinity matrix of a distance matrix.
///
/// With `symmetrize`, the result is `(A + Aᵀ) / 2`. Distances from
/// [`crate::distance_matrix`] are already symmetric; neighbor graphs built
/// one row at a time often are not.
///
/// # Errors
///
/// - [`crate::Error::InvalidParameter`] if `radius` is not strictly positive.
/// - [`crate::Error::NotSquare`] if `distances` is not square.
///
/// # Example
///
/// ```rust
/// use geolap::{affinity_matrix, GraphMatrix};
/// use ndarray::array;
///
/// let d = array![[0.0, 1.0], [1.0, 0.0]];
/// let a = affinity_matrix(&d, 1.0, true).unwrap();
/// assert_eq!(a[[0, 0]], 1.0);
/// assert!((a[[0, 1]] - (-1.0f64).exp()).abs() < 1e-15);
/// ```
pub fn affinity_matrix<M: GraphMatrix>(distances: &M, radius: f64, symmetrize: bool) -> Result<M> {
    ensure_positive("radius", radius)?;
    let n = ensure_square(distances)?;

    let affinity = distances.map_stored(|d| gaussian_kernel(d, radius));
    let affinity = if symmetrize {
        affinity.symmetrize()
    } else {
        affinity
    };

    log::debug!(
        "affinity matrix: n={}, radius={}, symmetrize={}",
        n,
        radius,
        symmetrize
    );
    Ok(affinity)
}

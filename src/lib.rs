//! # geolap
//!
//! Distance, affinity and graph Laplacian matrices of point clouds, the
//! front half of manifold-learning pipelines (Laplacian eigenmaps, diffusion
//! maps, spectral clustering).
//!
//! ## The Pipeline
//!
//! ```text
//! points ──distance_matrix──▶ D ──affinity_matrix──▶ A ──graph_laplacian──▶ L (+ diag)
//! ```
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`distance_matrix`] | Pairwise Euclidean distances, dense or radius-truncated sparse |
//! | [`affinity_matrix`] | Gaussian kernel `exp(-(d / r)²)` |
//! | [`graph_laplacian`] | One of five normalized Laplacians |
//! | [`Geometry`] | A point set plus all of the above parameters |
//!
//! Every stage works on dense `ndarray::Array2<f64>`, on sparse
//! `sprs::CsMat<f64>`, or on the runtime-tagged [`Matrix`], through the
//! [`GraphMatrix`] trait. Sparse in, sparse out.
//!
//! ## Quick Start
//!
//! ```rust
//! use geolap::{affinity_matrix, distance_matrix, graph_laplacian, LaplacianConfig, Normalization};
//! use ndarray::array;
//!
//! let points = array![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
//! let dist = distance_matrix(&points, Some(1.5)).unwrap();
//! let affinity = affinity_matrix(&dist, 1.0, true).unwrap();
//!
//! let cfg = LaplacianConfig::new(Normalization::RandomWalk).with_return_diag(true);
//! let lap = graph_laplacian(&affinity, &cfg).unwrap();
//! assert!(lap.matrix.is_sparse());
//! ```
//!
//! ## The Laplacian Zoo
//!
//! ```text
//! unnormalized:          L = D - A
//!   - row sums are 0, PSD for symmetric A
//!
//! symmetricnormalized:   L = I - D^{-1/2} A D^{-1/2}
//!   - symmetric, eigenvalues in [0, 2]
//!
//! randomwalk:            L = I - D^{-1} A
//!   - row sums are 0; D^{-1} A is the transition matrix
//!
//! geometric:             L = I - D'^{-1} A',  A' = D^{-1} A D^{-1}
//!   - diffusion maps with α = 1: removes the sampling density, so L
//!     approximates the Laplace-Beltrami operator (times 4/ε² with scaling)
//!
//! renormalized:          L = I - D'^{-1/2} A' D'^{-1/2},  A' = D^{-α} A D^{-α}
//!   - symmetric; α interpolates between graph (0) and density-free (1) limits
//! ```
//!
//! ## Sparse Zeros
//!
//! In a sparse matrix a missing entry means "no edge". No sparse result of
//! this crate ever stores an exact `0.0` affinity or Laplacian value (sparse
//! distances are the one exception: a stored `0.0` there is a coincident
//! neighbor). Because a zero Laplacian diagonal cannot be stored, the
//! diagonal is returned separately by [`graph_laplacian`] on request.
//!
//! ## What Can Go Wrong
//!
//! 1. **Isolated points**: zero-degree rows become zero rows of `L` (logged
//!    as a warning), never NaN.
//! 2. **Asymmetric affinities**: set [`LaplacianConfig::symmetrize`]; degrees
//!    are then computed from the symmetrized matrix.
//! 3. **Bandwidth too small**: sparse affinities that underflow to zero are
//!    dropped, which can disconnect the graph.
//!
//! ## References
//!
//! - Belkin & Niyogi (2003). "Laplacian Eigenmaps for Dimensionality Reduction"
//! - Coifman & Lafon (2006). "Diffusion maps"
//! - von Luxburg (2007). "A Tutorial on Spectral Clustering"

use thiserror::Error;

pub mod affinity;
pub mod distance;
pub mod geometry;
pub mod laplacian;
pub mod matrix;
pub mod sparse;

#[cfg(test)]
mod test_util;

pub use affinity::{affinity_matrix, gaussian_kernel};
pub use distance::{distance_matrix, points_from_rows};
pub use geometry::Geometry;
pub use laplacian::{graph_laplacian, GraphLaplacian, LaplacianConfig, Normalization};
pub use matrix::{GraphMatrix, Matrix};
pub use sparse::csr_from_dense;

#[derive(Debug, Error)]
pub enum Error {
    #[error("matrix is not square: {0} x {1}")]
    NotSquare(usize, usize),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

fn ensure_square<M: GraphMatrix>(m: &M) -> Result<usize> {
    let (n, k) = m.shape();
    if n != k {
        return Err(Error::NotSquare(n, k));
    }
    Ok(n)
}

fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("must be finite and > 0, got {}", value),
        })
    }
}

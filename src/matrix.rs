//! Representation layer shared by the pipeline stages.
//!
//! Every stage is written once against [`GraphMatrix`]. Two concrete
//! representations implement it:
//!
//! - `Array2<f64>`: every cell is stored, zeros included.
//! - `CsMat<f64>` (see [`crate::sparse`]): only stored entries exist, and an
//!   operation that would produce an exact `0.0` drops the entry instead.
//!
//! [`Matrix`] wraps both for callers that only learn the representation at
//! runtime (e.g. [`crate::distance_matrix`] with or without a radius).
//!
//! ## Floating-point order
//!
//! The dense and sparse implementations perform the same arithmetic in the
//! same order on every stored value (row sums fold left to right, rescaling is
//! `v * left[i] * right[j]`). Adding an unstored `0.0` is exact, so both
//! representations produce bit-identical results on their common entries.

use ndarray::{Array1, Array2, Axis};
use sprs::CsMat;

/// Capability set the distance/affinity/Laplacian algorithms rely on.
pub trait GraphMatrix: Sized {
    /// `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    /// Materialize as a dense array. Unstored sparse entries become `0.0`.
    fn to_dense(&self) -> Array2<f64>;

    /// Apply `f` to every stored entry.
    ///
    /// Sparse implementations drop entries whose image is exactly `0.0`.
    fn map_stored<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64;

    /// Row sums, accumulated left to right.
    fn row_sums(&self) -> Array1<f64>;

    /// Main diagonal. Unstored sparse diagonal entries read as `0.0`.
    fn diagonal(&self) -> Array1<f64>;

    fn transpose(&self) -> Self;

    /// Elementwise sum of two matrices of the same shape.
    ///
    /// # Panics
    ///
    /// Implementations panic if the shapes differ.
    fn add(&self, other: &Self) -> Self;

    fn scalar_mul(&self, factor: f64) -> Self;

    /// `diag(left) · self · diag(right)`, or `diag(left) · self` when `right` is `None`.
    fn rescale(&self, left: &Array1<f64>, right: Option<&Array1<f64>>) -> Self;

    /// `diag(diag) − self`.
    fn diag_minus(&self, diag: &Array1<f64>) -> Self;

    /// `(A + Aᵀ) / 2`.
    fn symmetrize(&self) -> Self {
        self.add(&self.transpose()).scalar_mul(0.5)
    }
}

/// Left-to-right accumulation shared by both representations.
pub(crate) fn fold_sum<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.fold(0.0, |acc, &v| acc + v)
}

impl GraphMatrix for Array2<f64> {
    fn shape(&self) -> (usize, usize) {
        self.dim()
    }

    fn to_dense(&self) -> Array2<f64> {
        self.clone()
    }

    fn map_stored<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        self.mapv(f)
    }

    fn row_sums(&self) -> Array1<f64> {
        self.axis_iter(Axis(0)).map(|row| fold_sum(row.iter())).collect()
    }

    fn diagonal(&self) -> Array1<f64> {
        self.diag().to_owned()
    }

    fn transpose(&self) -> Self {
        self.t().to_owned()
    }

    fn add(&self, other: &Self) -> Self {
        assert_eq!(self.dim(), other.dim(), "dense add: shape mismatch");
        self + other
    }

    fn scalar_mul(&self, factor: f64) -> Self {
        self.mapv(|v| v * factor)
    }

    fn rescale(&self, left: &Array1<f64>, right: Option<&Array1<f64>>) -> Self {
        let mut out = self.clone();
        for ((i, j), v) in out.indexed_iter_mut() {
            // Zero cells are "no edge" and stay zero whatever the weights.
            if *v == 0.0 {
                continue;
            }
            let mut scaled = *v * left[i];
            if let Some(right) = right {
                scaled *= right[j];
            }
            *v = scaled;
        }
        out
    }

    fn diag_minus(&self, diag: &Array1<f64>) -> Self {
        let mut out = self.mapv(|v| -v);
        for i in 0..self.nrows().min(self.ncols()) {
            out[[i, i]] = diag[i] - self[[i, i]];
        }
        out
    }
}

/// A matrix whose representation is chosen at runtime.
#[derive(Debug, Clone)]
pub enum Matrix {
    Dense(Array2<f64>),
    Sparse(CsMat<f64>),
}

impl Matrix {
    pub fn is_sparse(&self) -> bool {
        matches!(self, Matrix::Sparse(_))
    }

    pub fn as_dense(&self) -> Option<&Array2<f64>> {
        match self {
            Matrix::Dense(m) => Some(m),
            Matrix::Sparse(_) => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&CsMat<f64>> {
        match self {
            Matrix::Dense(_) => None,
            Matrix::Sparse(m) => Some(m),
        }
    }

    /// Number of stored entries (`rows * cols` for dense).
    pub fn nnz(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.len(),
            Matrix::Sparse(m) => m.nnz(),
        }
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(m: Array2<f64>) -> Self {
        Matrix::Dense(m)
    }
}

impl From<CsMat<f64>> for Matrix {
    fn from(m: CsMat<f64>) -> Self {
        Matrix::Sparse(m)
    }
}

impl GraphMatrix for Matrix {
    fn shape(&self) -> (usize, usize) {
        match self {
            Matrix::Dense(m) => GraphMatrix::shape(m),
            Matrix::Sparse(m) => GraphMatrix::shape(m),
        }
    }

    fn to_dense(&self) -> Array2<f64> {
        match self {
            Matrix::Dense(m) => m.clone(),
            Matrix::Sparse(m) => GraphMatrix::to_dense(m),
        }
    }

    fn map_stored<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.map_stored(f)),
            Matrix::Sparse(m) => Matrix::Sparse(m.map_stored(f)),
        }
    }

    fn row_sums(&self) -> Array1<f64> {
        match self {
            Matrix::Dense(m) => m.row_sums(),
            Matrix::Sparse(m) => m.row_sums(),
        }
    }

    fn diagonal(&self) -> Array1<f64> {
        match self {
            Matrix::Dense(m) => GraphMatrix::diagonal(m),
            Matrix::Sparse(m) => GraphMatrix::diagonal(m),
        }
    }

    fn transpose(&self) -> Self {
        match self {
            Matrix::Dense(m) => Matrix::Dense(GraphMatrix::transpose(m)),
            Matrix::Sparse(m) => Matrix::Sparse(GraphMatrix::transpose(m)),
        }
    }

    fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Matrix::Dense(a), Matrix::Dense(b)) => Matrix::Dense(GraphMatrix::add(a, b)),
            (Matrix::Sparse(a), Matrix::Sparse(b)) => Matrix::Sparse(GraphMatrix::add(a, b)),
            // Mixed operands have no common sparsity pattern.
            (a, b) => Matrix::Dense(GraphMatrix::add(&a.to_dense(), &b.to_dense())),
        }
    }

    fn scalar_mul(&self, factor: f64) -> Self {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.scalar_mul(factor)),
            Matrix::Sparse(m) => Matrix::Sparse(m.scalar_mul(factor)),
        }
    }

    fn rescale(&self, left: &Array1<f64>, right: Option<&Array1<f64>>) -> Self {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.rescale(left, right)),
            Matrix::Sparse(m) => Matrix::Sparse(m.rescale(left, right)),
        }
    }

    fn diag_minus(&self, diag: &Array1<f64>) -> Self {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.diag_minus(diag)),
            Matrix::Sparse(m) => Matrix::Sparse(m.diag_minus(diag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::csr_from_dense;
    use ndarray::array;

    #[test]
    fn dense_rescale_is_row_then_column() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let left = array![2.0, 0.5];
        let right = array![10.0, 1.0];
        let out = a.rescale(&left, Some(&right));
        assert_eq!(out, array![[20.0, 4.0], [15.0, 2.0]]);

        let rows_only = a.rescale(&left, None);
        assert_eq!(rows_only, array![[2.0, 4.0], [1.5, 2.0]]);
    }

    #[test]
    fn dense_rescale_leaves_zero_cells_alone() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let out = a.rescale(&array![f64::INFINITY, 2.0], Some(&array![0.5, f64::INFINITY]));
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 1]], 0.0);
        assert_eq!(out[[1, 0]], 1.0);
    }

    #[test]
    fn dense_diag_minus() {
        let a = array![[1.0, 2.0], [2.0, 5.0]];
        let l = a.diag_minus(&array![3.0, 7.0]);
        assert_eq!(l, array![[2.0, -2.0], [-2.0, 2.0]]);
    }

    #[test]
    fn symmetrize_averages_with_transpose() {
        let a = array![[0.0, 1.0], [3.0, 0.0]];
        assert_eq!(a.symmetrize(), array![[0.0, 2.0], [2.0, 0.0]]);
    }

    #[test]
    fn matrix_enum_delegates() {
        let a = array![[1.0, 0.0], [0.5, 2.0]];
        let dense = Matrix::from(a.clone());
        let sparse = Matrix::from(csr_from_dense(&a));

        assert!(!dense.is_sparse());
        assert!(sparse.is_sparse());
        assert_eq!(dense.nnz(), 4);
        assert_eq!(sparse.nnz(), 3);
        assert_eq!(dense.row_sums(), sparse.row_sums());
        assert_eq!(dense.transpose().to_dense(), sparse.transpose().to_dense());

        // Mixed addition falls back to dense.
        let mixed = dense.add(&sparse);
        assert!(!mixed.is_sparse());
        assert_eq!(mixed.to_dense(), &a * 2.0);
    }
}

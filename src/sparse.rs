//! Sparse (CSR) representation of graph matrices.
//!
//! Built on `sprs::CsMat<f64>`. The one structural rule: no operation here
//! ever stores an exact `0.0`. A missing entry means "no edge", and a stored
//! zero would be indistinguishable from it once a downstream consumer
//! materializes the matrix. Results that land on zero are dropped instead;
//! values that must survive as zero (a Laplacian diagonal) are carried in a
//! separate vector by the caller.
//!
//! Storage, conversion and elementwise sums come from `sprs`; this module
//! only adds the degree scaling and diagonal insertion the Laplacians need,
//! plus the zero pruning above. Inputs may be CSR or CSC; outputs are CSR.

use crate::matrix::{fold_sum, GraphMatrix};
use ndarray::{Array1, Array2};
use sprs::{CsMat, TriMat};
use std::borrow::Cow;

/// One matrix row: `(col, value)` pairs with strictly increasing `col`.
pub(crate) type Row = Vec<(usize, f64)>;

/// `m` in CSR storage, converting only when it arrives as CSC.
fn as_csr(m: &CsMat<f64>) -> Cow<'_, CsMat<f64>> {
    if m.is_csr() {
        Cow::Borrowed(m)
    } else {
        Cow::Owned(m.to_csr())
    }
}

/// Assemble a CSR matrix from sorted rows, keeping every entry as given.
pub(crate) fn assemble(shape: (usize, usize), rows: Vec<Row>) -> CsMat<f64> {
    let nnz = rows.iter().map(Vec::len).sum();
    let mut indptr = Vec::with_capacity(shape.0 + 1);
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);

    indptr.push(0);
    for row in rows {
        for (j, v) in row {
            indices.push(j);
            data.push(v);
        }
        indptr.push(indices.len());
    }
    CsMat::new(shape, indptr, indices, data)
}

/// CSR copy of `m` without its exact zeros.
fn pruned(m: &CsMat<f64>) -> CsMat<f64> {
    let mut tri = TriMat::with_capacity((m.rows(), m.cols()), m.nnz());
    for (&v, (i, j)) in m.iter() {
        if v != 0.0 {
            tri.add_triplet(i, j, v);
        }
    }
    tri.to_csr()
}

/// Convert a dense matrix to CSR, storing only its non-zero cells.
///
/// Zero cells, the diagonal included, become "no entry".
pub fn csr_from_dense(dense: &Array2<f64>) -> CsMat<f64> {
    let mut tri = TriMat::new(dense.dim());
    for ((i, j), &v) in dense.indexed_iter() {
        if v != 0.0 {
            tri.add_triplet(i, j, v);
        }
    }
    tri.to_csr()
}

/// Rebuild `m` row by row through `f`, dropping exact zeros from the result.
fn map_rows<F>(m: &CsMat<f64>, mut f: F) -> CsMat<f64>
where
    F: FnMut(usize, Row) -> Row,
{
    let csr = as_csr(m);
    let rows = csr
        .outer_iterator()
        .enumerate()
        .map(|(i, row)| {
            let row: Row = row.iter().map(|(j, &v)| (j, v)).collect();
            f(i, row).into_iter().filter(|&(_, v)| v != 0.0).collect()
        })
        .collect();
    assemble((m.rows(), m.cols()), rows)
}

/// Sparse graph matrices.
///
/// Inputs may be CSR or CSC; every result is CSR with no stored exact zero.
impl GraphMatrix for CsMat<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    fn to_dense(&self) -> Array2<f64> {
        // Inherent `sprs` conversion.
        self.to_dense()
    }

    fn map_stored<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        pruned(&self.map(|&v| f(v)))
    }

    fn row_sums(&self) -> Array1<f64> {
        as_csr(self)
            .outer_iterator()
            .map(|row| fold_sum(row.data().iter()))
            .collect()
    }

    fn diagonal(&self) -> Array1<f64> {
        let n = self.rows().min(self.cols());
        (0..n)
            .map(|i| self.get(i, i).copied().unwrap_or(0.0))
            .collect()
    }

    fn transpose(&self) -> Self {
        self.transpose_view().to_csr()
    }

    /// # Panics
    ///
    /// Panics if the two shapes differ.
    fn add(&self, other: &Self) -> Self {
        let sum: CsMat<f64> = &*as_csr(self) + &*as_csr(other);
        pruned(&sum)
    }

    fn scalar_mul(&self, factor: f64) -> Self {
        self.map_stored(|v| v * factor)
    }

    fn rescale(&self, left: &Array1<f64>, right: Option<&Array1<f64>>) -> Self {
        map_rows(self, |i, row| {
            row.into_iter()
                .map(|(j, v)| {
                    let mut scaled = v * left[i];
                    if let Some(right) = right {
                        scaled *= right[j];
                    }
                    (j, scaled)
                })
                .collect()
        })
    }

    fn diag_minus(&self, diag: &Array1<f64>) -> Self {
        let n_diag = self.rows().min(self.cols());
        map_rows(self, |i, row| {
            if i >= n_diag {
                return row.into_iter().map(|(j, v)| (j, -v)).collect();
            }
            let stored = row
                .iter()
                .find(|&&(j, _)| j == i)
                .map_or(0.0, |&(_, v)| v);
            let mut out = Vec::with_capacity(row.len() + 1);
            let mut placed = false;
            for (j, v) in row {
                if j == i {
                    continue;
                }
                if !placed && j > i {
                    out.push((i, diag[i] - stored));
                    placed = true;
                }
                out.push((j, -v));
            }
            if !placed {
                out.push((i, diag[i] - stored));
            }
            out
        })
    }
}

//! Pairwise Euclidean distances of a point set.
//!
//! Distances come from the Gram expansion
//! `‖x − y‖² = ‖x‖² + ‖y‖² − 2⟨x, y⟩`, reusing the squared norms instead of
//! materializing every pairwise difference. The radius path evaluates one row
//! at a time and never allocates an `n × n` buffer. Cancellation can push the
//! expansion slightly below zero; those values are clamped to `0` before the
//! square root.

use crate::matrix::Matrix;
use crate::sparse::{assemble, Row};
use crate::{ensure_positive, Error, Result};
use ndarray::{Array1, Array2, ArrayViewMut1, Axis};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Build an `n × d` point array from rows, rejecting ragged input.
pub fn points_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let d = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != d) {
        return Err(Error::InvalidInput(format!(
            "point {} has dimension {}, expected {}",
            i,
            row.len(),
            d
        )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), d), flat).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn check_finite(points: &Array2<f64>) -> Result<()> {
    match points.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((i, k), v)) => Err(Error::InvalidInput(format!(
            "point {} has non-finite coordinate {} in dimension {}",
            i, v, k
        ))),
        None => Ok(()),
    }
}

/// Distance between points `i != j`.
///
/// The inner product is always taken as `⟨x_min, x_max⟩`, so `D[i, j]` and
/// `D[j, i]` are computed from the same operands and agree exactly.
fn pair_distance(points: &Array2<f64>, sq_norms: &Array1<f64>, i: usize, j: usize) -> f64 {
    let (a, b) = (i.min(j), i.max(j));
    let inner = points.row(a).dot(&points.row(b));
    (sq_norms[a] + sq_norms[b] - 2.0 * inner).max(0.0).sqrt()
}

fn squared_norms(points: &Array2<f64>) -> Array1<f64> {
    points.rows().into_iter().map(|r| r.dot(&r)).collect()
}

fn fill_row(i: usize, mut row: ArrayViewMut1<'_, f64>, points: &Array2<f64>, sq_norms: &Array1<f64>) {
    for (j, out) in row.iter_mut().enumerate() {
        *out = if i == j {
            0.0
        } else {
            pair_distance(points, sq_norms, i, j)
        };
    }
}

fn dense_distances(points: &Array2<f64>) -> Array2<f64> {
    let n = points.nrows();
    let sq_norms = squared_norms(points);
    let mut dist = Array2::<f64>::zeros((n, n));

    #[cfg(feature = "parallel")]
    {
        use ndarray::parallel::prelude::*;
        dist.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, row)| fill_row(i, row, points, &sq_norms));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, row) in dist.axis_iter_mut(Axis(0)).enumerate() {
            fill_row(i, row, points, &sq_norms);
        }
    }

    dist
}

/// Off-diagonal neighbors of point `i` within `radius` (inclusive).
///
/// Only the row's entries are kept, so the radius path stays O(nnz) in memory.
fn neighbors_within(points: &Array2<f64>, sq_norms: &Array1<f64>, i: usize, radius: f64) -> Row {
    (0..points.nrows())
        .filter(|&j| j != i)
        .map(|j| (j, pair_distance(points, sq_norms, i, j)))
        .filter(|&(_, d)| d <= radius)
        .collect()
}

/// Pairwise Euclidean distance matrix of the rows of `points`.
///
/// - `radius = None`: dense `n × n` matrix.
/// - `radius = Some(r)`: CSR matrix holding every off-diagonal pair with
///   distance `≤ r`. The diagonal is never stored. A stored entry means
///   "within radius" and is `0.0` for two coincident points; an absent entry
///   means "farther than `r`".
///
/// # Errors
///
/// - [`Error::InvalidInput`] if a coordinate is NaN or infinite.
/// - [`Error::InvalidParameter`] if `r` is not strictly positive.
///
/// # Example
///
/// ```rust
/// use geolap::{distance_matrix, GraphMatrix};
/// use ndarray::array;
///
/// let points = array![[0.0, 0.0], [3.0, 4.0], [10.0, 0.0]];
/// let full = distance_matrix(&points, None).unwrap();
/// assert!((full.to_dense()[[0, 1]] - 5.0).abs() < 1e-12);
///
/// let near = distance_matrix(&points, Some(6.0)).unwrap();
/// assert!(near.is_sparse());
/// assert_eq!(near.nnz(), 2);
/// ```
pub fn distance_matrix(points: &Array2<f64>, radius: Option<f64>) -> Result<Matrix> {
    check_finite(points)?;
    if let Some(r) = radius {
        ensure_positive("radius", r)?;
    }

    let n = points.nrows();
    let Some(r) = radius else {
        log::debug!("distance matrix: n={}, dim={}, dense", n, points.ncols());
        return Ok(Matrix::Dense(dense_distances(points)));
    };

    let sq_norms = squared_norms(points);

    #[cfg(feature = "parallel")]
    let rows: Vec<Row> = (0..n)
        .into_par_iter()
        .map(|i| neighbors_within(points, &sq_norms, i, r))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Row> = (0..n)
        .map(|i| neighbors_within(points, &sq_norms, i, r))
        .collect();

    let sparse = assemble((n, n), rows);
    log::debug!(
        "distance matrix: n={}, dim={}, radius={}, nnz={}",
        n,
        points.ncols(),
        r,
        sparse.nnz()
    );
    Ok(Matrix::Sparse(sparse))
}

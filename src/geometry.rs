//! A point set bundled with the parameters of the whole pipeline.

use crate::laplacian::{graph_laplacian, GraphLaplacian, LaplacianConfig};
use crate::matrix::Matrix;
use crate::{affinity_matrix, distance_matrix, Error, Result};
use ndarray::Array2;

/// Point set plus neighborhood radius, kernel bandwidth and Laplacian
/// parameters.
///
/// Nothing is cached: every accessor recomputes its stage (and the stages
/// before it) from the points.
///
/// - The affinity radius defaults to the neighborhood radius.
/// - `scaling_epps` of the Laplacian defaults to the affinity radius.
///
/// ```rust
/// use geolap::{Geometry, LaplacianConfig, Normalization};
/// use ndarray::array;
///
/// let points = array![[0.0, 0.0], [0.5, 0.0], [1.0, 0.0], [5.0, 5.0]];
/// let geom = Geometry::new(&points)
///     .with_neighborhood_radius(1.0)
///     .with_laplacian(LaplacianConfig::new(Normalization::RandomWalk));
///
/// let lap = geom.laplacian_matrix().unwrap();
/// assert!(lap.matrix.is_sparse());
/// assert_eq!(lap.degrees[3], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Geometry<'a> {
    points: &'a Array2<f64>,
    neighborhood_radius: Option<f64>,
    affinity_radius: Option<f64>,
    laplacian: LaplacianConfig,
}

impl<'a> Geometry<'a> {
    pub fn new(points: &'a Array2<f64>) -> Self {
        Self {
            points,
            neighborhood_radius: None,
            affinity_radius: None,
            laplacian: LaplacianConfig::default(),
        }
    }

    /// Truncate distances at `radius`, switching the pipeline to sparse.
    pub fn with_neighborhood_radius(mut self, radius: f64) -> Self {
        self.neighborhood_radius = Some(radius);
        self
    }

    pub fn with_affinity_radius(mut self, radius: f64) -> Self {
        self.affinity_radius = Some(radius);
        self
    }

    pub fn with_laplacian(mut self, cfg: LaplacianConfig) -> Self {
        self.laplacian = cfg;
        self
    }

    pub fn points(&self) -> &Array2<f64> {
        self.points
    }

    pub fn neighborhood_radius(&self) -> Option<f64> {
        self.neighborhood_radius
    }

    /// Kernel bandwidth in effect.
    pub fn affinity_radius(&self) -> Option<f64> {
        self.affinity_radius.or(self.neighborhood_radius)
    }

    pub fn distance_matrix(&self) -> Result<Matrix> {
        distance_matrix(self.points, self.neighborhood_radius)
    }

    /// Symmetrized Gaussian affinities.
    ///
    /// Fails with [`Error::InvalidParameter`] when neither an affinity nor a
    /// neighborhood radius was set.
    pub fn affinity_matrix(&self) -> Result<Matrix> {
        let radius = self.affinity_radius().ok_or_else(|| Error::InvalidParameter {
            name: "affinity_radius",
            reason: "neither an affinity radius nor a neighborhood radius is set".to_string(),
        })?;
        affinity_matrix(&self.distance_matrix()?, radius, true)
    }

    pub fn laplacian_matrix(&self) -> Result<GraphLaplacian<Matrix>> {
        let affinity = self.affinity_matrix()?;
        let mut cfg = self.laplacian.clone();
        if cfg.scaling_epps.is_none() {
            cfg.scaling_epps = self.affinity_radius();
        }
        graph_laplacian(&affinity, &cfg)
    }
}

//! Graph Laplacians of affinity matrices.
//!
//! Five normalizations, written once against [`GraphMatrix`] so the dense
//! and sparse paths share every arithmetic step:
//!
//! ```text
//! unnormalized          L = D − A
//! symmetricnormalized   L = I − D^{-1/2} A D^{-1/2}
//! randomwalk            L = I − D^{-1} A
//! geometric             A' = D^{-1} A D^{-1},  L = I − D'^{-1} A'
//! renormalized          A' = D^{-α} A D^{-α},  L = I − D'^{-1/2} A' D'^{-1/2}
//! ```
//!
//! `D` holds the row sums of `A` (after optional symmetrization), `D'` the
//! row sums of `A'`.
//!
//! ## Isolated points
//!
//! A zero degree has reciprocal `0`, and the identity term is dropped on that
//! row. An isolated point therefore gets an all-zero row and column in every
//! mode, never NaN.
//!
//! ## The diagonal side channel
//!
//! A sparse Laplacian does not store exact zeros, so a zero on its diagonal
//! is indistinguishable from "no entry". [`GraphLaplacian::diagonal`] carries
//! the diagonal of the final `L` explicitly, computed alongside the matrix
//! with the same operations.

use crate::matrix::GraphMatrix;
use crate::{ensure_positive, ensure_square, Error, Result};
use ndarray::Array1;
use std::fmt;
use std::str::FromStr;

/// Normalization applied by [`graph_laplacian`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Normalization {
    /// `L = D − A`
    Unnormalized,
    /// `L = I − D^{-1/2} A D^{-1/2}`
    SymmetricNormalized,
    /// `L = I − D^{-1} A`
    RandomWalk,
    /// Random-walk Laplacian of `D^{-1} A D^{-1}` (diffusion maps, α = 1).
    #[default]
    Geometric,
    /// Symmetric normalized Laplacian of `D^{-α} A D^{-α}`.
    Renormalized,
}

impl Normalization {
    pub const ALL: [Normalization; 5] = [
        Normalization::Unnormalized,
        Normalization::SymmetricNormalized,
        Normalization::RandomWalk,
        Normalization::Geometric,
        Normalization::Renormalized,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Normalization::Unnormalized => "unnormalized",
            Normalization::SymmetricNormalized => "symmetricnormalized",
            Normalization::RandomWalk => "randomwalk",
            Normalization::Geometric => "geometric",
            Normalization::Renormalized => "renormalized",
        }
    }

    /// Whether `scaling_epps` rescales this Laplacian.
    pub fn uses_scaling(self) -> bool {
        matches!(self, Normalization::Geometric | Normalization::Renormalized)
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Normalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Normalization::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| Error::InvalidParameter {
                name: "normalization",
                reason: format!(
                    "unknown normalization `{}` (expected one of: {})",
                    s,
                    Normalization::ALL.map(Normalization::name).join(", ")
                ),
            })
    }
}

/// Parameters for [`graph_laplacian`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LaplacianConfig {
    pub normalization: Normalization,
    /// Replace `A` by `(A + Aᵀ) / 2` before computing degrees.
    pub symmetrize: bool,
    /// Kernel bandwidth used upstream. When set, geometric and renormalized
    /// Laplacians are multiplied by `4 / scaling_epps²`; other modes ignore it.
    pub scaling_epps: Option<f64>,
    /// Exponent α of the renormalized mode. Ignored by the other modes.
    pub renormalization_exponent: f64,
    /// Return the diagonal of `L` alongside it.
    pub return_diag: bool,
}

impl Default for LaplacianConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::default(),
            symmetrize: false,
            scaling_epps: None,
            renormalization_exponent: 1.0,
            return_diag: false,
        }
    }
}

impl LaplacianConfig {
    pub fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            ..Default::default()
        }
    }

    /// Config for a normalization given by name.
    ///
    /// Fails with [`Error::InvalidParameter`] for an unknown name.
    pub fn named(normalization: &str) -> Result<Self> {
        Ok(Self::new(normalization.parse()?))
    }

    pub fn with_symmetrize(mut self, symmetrize: bool) -> Self {
        self.symmetrize = symmetrize;
        self
    }

    pub fn with_scaling_epps(mut self, epps: f64) -> Self {
        self.scaling_epps = Some(epps);
        self
    }

    pub fn with_renormalization_exponent(mut self, exponent: f64) -> Self {
        self.renormalization_exponent = exponent;
        self
    }

    pub fn with_return_diag(mut self, return_diag: bool) -> Self {
        self.return_diag = return_diag;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(epps) = self.scaling_epps {
            ensure_positive("scaling_epps", epps)?;
        }
        if !self.renormalization_exponent.is_finite() {
            return Err(Error::InvalidParameter {
                name: "renormalization_exponent",
                reason: format!("must be finite, got {}", self.renormalization_exponent),
            });
        }
        Ok(())
    }

    /// Final multiplier of `L`, if any.
    fn scale_factor(&self) -> Option<f64> {
        if !self.normalization.uses_scaling() {
            return None;
        }
        self.scaling_epps.map(|epps| 4.0 / (epps * epps))
    }
}

/// A Laplacian and the side information computed with it.
#[derive(Debug, Clone)]
pub struct GraphLaplacian<M> {
    pub matrix: M,
    /// Diagonal of `matrix`, present when `return_diag` was requested.
    ///
    /// A `0.0` entry marks an isolated point (zero or non-invertible degree):
    /// its row and column of `matrix` are zero, rather than carrying a unit
    /// diagonal.
    pub diagonal: Option<Array1<f64>>,
    /// Row sums of the (symmetrized) affinity matrix.
    pub degrees: Array1<f64>,
}

/// `1 / x`, or `0` where that is not finite (zero or subnormal `x`).
fn invert(x: f64) -> f64 {
    let r = 1.0 / x;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

fn reciprocal(values: &Array1<f64>) -> Array1<f64> {
    values.mapv(invert)
}

fn reciprocal_sqrt(values: &Array1<f64>) -> Array1<f64> {
    values.mapv(|d| invert(d.sqrt()))
}

/// Identity restricted to rows whose scaling weight is non-zero.
fn connected_mask(weights: &Array1<f64>) -> Array1<f64> {
    weights.mapv(|w| if w == 0.0 { 0.0 } else { 1.0 })
}

/// `D^{-1} A D^{-1}` (or `D^{-α} A D^{-α}`) and its row sums.
fn density_rescaled<M: GraphMatrix>(a: &M, weights: &Array1<f64>) -> (M, Array1<f64>) {
    let inv = reciprocal(weights);
    let rescaled = a.rescale(&inv, Some(&inv));
    let degrees = rescaled.row_sums();
    (rescaled, degrees)
}

/// The normalized operator `M` and the diagonal `δ` such that `L = diag(δ) − M`.
fn normalize<M: GraphMatrix + Clone>(
    a: &M,
    degrees: &Array1<f64>,
    cfg: &LaplacianConfig,
) -> (M, Array1<f64>) {
    match cfg.normalization {
        Normalization::Unnormalized => (a.clone(), degrees.clone()),
        Normalization::SymmetricNormalized => {
            let s = reciprocal_sqrt(degrees);
            (a.rescale(&s, Some(&s)), connected_mask(&s))
        }
        Normalization::RandomWalk => {
            let inv = reciprocal(degrees);
            (a.rescale(&inv, None), connected_mask(&inv))
        }
        Normalization::Geometric => {
            let (a1, d1) = density_rescaled(a, degrees);
            let inv = reciprocal(&d1);
            (a1.rescale(&inv, None), connected_mask(&inv))
        }
        Normalization::Renormalized => {
            let alpha = cfg.renormalization_exponent;
            let weights = degrees.mapv(|d| d.powf(alpha));
            let (a1, d1) = density_rescaled(a, &weights);
            let s = reciprocal_sqrt(&d1);
            (a1.rescale(&s, Some(&s)), connected_mask(&s))
        }
    }
}

/// Graph Laplacian of an affinity matrix.
///
/// `affinity` should be symmetric with non-negative entries; set
/// `cfg.symmetrize` when it is only approximately symmetric. The output keeps
/// the representation of the input.
///
/// # Errors
///
/// - [`Error::NotSquare`] if `affinity` is not square.
/// - [`Error::InvalidParameter`] for a non-positive `scaling_epps` or a
///   non-finite `renormalization_exponent`.
///
/// # Example
///
/// ```rust
/// use geolap::{graph_laplacian, LaplacianConfig, Normalization};
/// use ndarray::array;
///
/// // Path graph: 0 -- 1 -- 2
/// let adj = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
/// let cfg = LaplacianConfig::new(Normalization::Unnormalized).with_return_diag(true);
/// let lap = graph_laplacian(&adj, &cfg).unwrap();
///
/// assert_eq!(lap.matrix[[1, 1]], 2.0);
/// assert_eq!(lap.matrix[[0, 1]], -1.0);
/// assert_eq!(lap.diagonal.unwrap().to_vec(), vec![1.0, 2.0, 1.0]);
/// ```
pub fn graph_laplacian<M>(affinity: &M, cfg: &LaplacianConfig) -> Result<GraphLaplacian<M>>
where
    M: GraphMatrix + Clone,
{
    cfg.validate()?;
    let n = ensure_square(affinity)?;

    let symmetrized;
    let a = if cfg.symmetrize {
        symmetrized = affinity.symmetrize();
        &symmetrized
    } else {
        affinity
    };

    let degrees = a.row_sums();
    let isolated = degrees.iter().filter(|&&d| invert(d) == 0.0).count();
    if isolated > 0 {
        log::warn!(
            "graph laplacian: {} of {} points have zero or non-invertible degree",
            isolated,
            n
        );
    }

    let (operator, offset) = normalize(a, &degrees, cfg);
    let mut matrix = operator.diag_minus(&offset);
    let mut diagonal = &offset - &operator.diagonal();

    if let Some(factor) = cfg.scale_factor() {
        matrix = matrix.scalar_mul(factor);
        diagonal.mapv_inplace(|v| v * factor);
    }

    log::debug!(
        "graph laplacian: n={}, normalization={}, symmetrize={}, scale={:?}",
        n,
        cfg.normalization,
        cfg.symmetrize,
        cfg.scale_factor()
    );

    Ok(GraphLaplacian {
        matrix,
        diagonal: cfg.return_diag.then_some(diagonal),
        degrees,
    })
}

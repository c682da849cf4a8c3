use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// A sphere fitted to a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereFit {
    /// Center of the sphere.
    pub center: [f64; 3],
    /// Radius of the sphere.
    pub radius: f64,
    /// Norm of the least-squares residual divided by the number of points.
    pub residue: f64,
}

/// Fit a sphere to a set of points with linear least squares.
///
/// Each point contributes the row `[2x, 2y, 2z, 1] · c = x² + y² + z²`; the
/// center is `(c0, c1, c2)` and the radius `sqrt(c0² + c1² + c2² + c3)`.
///
/// # Errors
///
/// [`FitError::RankDeficient`] when the system does not determine the sphere,
/// e.g. fewer than four points or all points on a plane.
pub fn fit_sphere(points: &[[f64; 3]]) -> Result<SphereFit, FitError> {
    let n = points.len();
    if n == 0 {
        return Err(FitError::RankDeficient { rank: 0 });
    }

    let a_flat: Vec<f64> = points
        .iter()
        .flat_map(|p| [2.0 * p[0], 2.0 * p[1], 2.0 * p[2], 1.0])
        .collect();
    let a = DMatrix::<f64>::from_row_slice(n, 4, &a_flat);
    let f = DVector::<f64>::from_iterator(
        n,
        points.iter().map(|p| p[0] * p[0] + p[1] * p[1] + p[2] * p[2]),
    );

    let svd = a.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let tol = f64::EPSILON * n.max(4) as f64 * sigma_max;

    let rank = svd.rank(tol);
    if rank < 4 {
        return Err(FitError::RankDeficient { rank });
    }

    let c = svd
        .solve(&f, tol)
        .map_err(|e| FitError::SvdFailed(e.to_string()))?;

    let center = [c[0], c[1], c[2]];
    let radius = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2] + c[3]).max(0.0).sqrt();
    let residue = (&a * &c - &f).norm() / n as f64;

    log::debug!(
        "sphere fit over {} points: center {:?}, radius {}, residue {}",
        n,
        center,
        radius,
        residue
    );

    Ok(SphereFit {
        center,
        radius,
        residue,
    })
}

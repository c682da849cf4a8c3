use pointfit_3d::linalg::{cross_product3, dot_product3};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::FitError;
use crate::pca::{orient_axis, principal_axes};

/// Number of dimensions of the fitted distribution.
const DIMS: f64 = 3.0;

/// A confidence ellipsoid fitted to a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidFit {
    /// Center of the ellipsoid, the centroid of the points.
    pub center: [f64; 3],
    /// Semi-axis lengths, in descending order.
    pub semi_axes: [f64; 3],
    /// Unit axis directions, one per row, forming a proper rotation.
    pub orientation: [[f64; 3]; 3],
    /// Number of points the ellipsoid was fitted to.
    pub sample_count: usize,
    /// Confidence level of the ellipsoid.
    pub pvalue: f64,
}

impl EllipsoidFit {
    /// Axis vectors scaled by their semi-axis length.
    pub fn axes(&self) -> [[f64; 3]; 3] {
        std::array::from_fn(|i| self.orientation[i].map(|v| v * self.semi_axes[i]))
    }

    /// Check whether a point lies inside or on the ellipsoid.
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        let d: [f64; 3] = std::array::from_fn(|i| point[i] - self.center[i]);
        let mut mahalanobis_sq = 0.0;
        for (axis, &semi) in self.orientation.iter().zip(self.semi_axes.iter()) {
            let t = dot_product3(&d, axis);
            if semi > 0.0 {
                mahalanobis_sq += (t / semi).powi(2);
            } else if t.abs() > 1e-12 {
                return false;
            }
        }
        mahalanobis_sq <= 1.0
    }
}

/// Fit the ellipsoid expected to contain a fraction `pvalue` of the points.
///
/// The points are treated as a sample of a trivariate normal distribution.
/// Semi-axes follow from the eigenvalues `s_i` of the sample covariance:
/// `sqrt(s_i · fppf) / (1 + 6 / (n - 1))` with
/// `fppf = F⁻¹(pvalue; 3, n - 3) · (n - 1) · 3 · (n + 1) / (n · (n - 3))`.
///
/// # Arguments
///
/// * `points` - The sample, at least four points.
/// * `pvalue` - Confidence level in (0, 1).
pub fn fit_ellipsoid(points: &[[f64; 3]], pvalue: f64) -> Result<EllipsoidFit, FitError> {
    if !(pvalue > 0.0 && pvalue < 1.0) {
        return Err(FitError::InvalidPValue(pvalue));
    }

    let n = points.len();
    if n < 4 {
        return Err(FitError::InsufficientPoints {
            required: 4,
            actual: n,
        });
    }
    let nf = n as f64;

    let f_dist = FisherSnedecor::new(DIMS, nf - DIMS)
        .map_err(|e| FitError::Distribution(e.to_string()))?;
    let fppf =
        f_dist.inverse_cdf(pvalue) * (nf - 1.0) * DIMS * (nf + 1.0) / (nf * (nf - DIMS));
    let cfac = 1.0 + 6.0 / (nf - 1.0);

    // covariance eigenvalues are the squared singular values over n - 1
    let pca = principal_axes(points)?;
    let semi_axes = pca
        .singular_values
        .map(|s| (s * s / (nf - 1.0) * fppf).sqrt() / cfac);

    let a0 = orient_axis(pca.axes[0]);
    let a1 = orient_axis(pca.axes[1]);
    let a2 = cross_product3(&a0, &a1);

    log::debug!(
        "ellipsoid fit over {} points at p={}: semi-axes {:?}",
        n,
        pvalue,
        semi_axes
    );

    Ok(EllipsoidFit {
        center: pca.center,
        semi_axes,
        orientation: [a0, a1, a2],
        sample_count: n,
        pvalue,
    })
}

use pointfit_3d::linalg::{cross_product3, dot_product3};
use pointfit_3d::ops;
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::pca::{orient_axis, principal_axes};

/// A plane fitted through a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneFit {
    /// Unit normal of the plane.
    pub normal: [f64; 3],
    /// Centroid of the points, lying on the plane.
    pub center: [f64; 3],
    /// Smallest singular value of the centered points.
    pub min_variance: f64,
    /// Singular values of the centered points, in descending order.
    pub singular_values: [f64; 3],
    /// Diagonal of the bounding box of the points.
    pub size: f64,
}

impl PlaneFit {
    /// Signed distance of a point from the plane, positive on the normal side.
    pub fn signed_distance(&self, point: &[f64; 3]) -> f64 {
        let d: [f64; 3] = std::array::from_fn(|i| point[i] - self.center[i]);
        dot_product3(&d, &self.normal)
    }
}

/// Fit a plane through a set of points.
///
/// The normal is the cross product of the two leading principal axes.
pub fn fit_plane(points: &[[f64; 3]]) -> Result<PlaneFit, FitError> {
    if points.len() < 3 {
        return Err(FitError::InsufficientPoints {
            required: 3,
            actual: points.len(),
        });
    }

    let pca = principal_axes(points)?;
    let normal = orient_axis(cross_product3(&pca.axes[0], &pca.axes[1]));

    Ok(PlaneFit {
        normal,
        center: pca.center,
        min_variance: pca.singular_values[2],
        singular_values: pca.singular_values,
        size: ops::diagonal_size(points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_plane_tilted() -> Result<(), Box<dyn std::error::Error>> {
        // z = 0.5 x - 0.25 y + 2
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..4 {
                let (x, y) = (i as f64, j as f64 * 1.5);
                points.push([x, y, 0.5 * x - 0.25 * y + 2.0]);
            }
        }
        let plane = fit_plane(&points)?;

        let norm = (0.25f64 + 0.0625 + 1.0).sqrt();
        assert_relative_eq!(plane.normal[0], -0.5 / norm, epsilon = 1e-9);
        assert_relative_eq!(plane.normal[1], 0.25 / norm, epsilon = 1e-9);
        assert_relative_eq!(plane.normal[2], 1.0 / norm, epsilon = 1e-9);
        assert_relative_eq!(plane.min_variance, 0.0, epsilon = 1e-9);

        for p in points.iter() {
            assert_relative_eq!(plane.signed_distance(p), 0.0, epsilon = 1e-9);
        }
        assert_relative_eq!(plane.size, ops::diagonal_size(&points), epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_fit_plane_signed_distance() -> Result<(), Box<dyn std::error::Error>> {
        let plane = fit_plane(&[
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ])?;
        assert_relative_eq!(plane.normal[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(plane.normal[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(plane.normal[2], 1.0, epsilon = 1e-9);
        assert_relative_eq!(plane.signed_distance(&[0.3, 0.3, 4.0]), 3.0, epsilon = 1e-9);
        assert_relative_eq!(plane.size, 2f64.sqrt(), epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_plane_fit_serde() -> Result<(), Box<dyn std::error::Error>> {
        let plane = fit_plane(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])?;
        let json = serde_json::to_string(&plane)?;
        let back: PlaneFit = serde_json::from_str(&json)?;
        assert_eq!(back, plane);
        Ok(())
    }

    #[test]
    fn test_fit_plane_too_few_points() {
        let res = fit_plane(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert_eq!(
            res,
            Err(FitError::InsufficientPoints {
                required: 3,
                actual: 2
            })
        );
    }
}

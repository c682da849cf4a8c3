use pointfit_3d::linalg::dot_product3;
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::pca::{orient_axis, principal_axes};

/// A straight line fitted through a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    /// Unit direction of the line.
    pub direction: [f64; 3],
    /// Centroid of the points, lying on the line.
    pub center: [f64; 3],
    /// Singular values of the centered points, in descending order.
    pub singular_values: [f64; 3],
    /// Extreme projections of the points onto the line.
    pub endpoints: [[f64; 3]; 2],
}

impl LineFit {
    /// Length of the fitted segment.
    pub fn length(&self) -> f64 {
        let [a, b] = self.endpoints;
        ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt()
    }

    /// Distance of a point from the infinite line.
    pub fn distance_to(&self, point: &[f64; 3]) -> f64 {
        let d: [f64; 3] = std::array::from_fn(|i| point[i] - self.center[i]);
        let t = dot_product3(&d, &self.direction);
        let perp_sq = dot_product3(&d, &d) - t * t;
        perp_sq.max(0.0).sqrt()
    }
}

/// Fit a line through a set of points.
///
/// The direction is the first principal axis of the centered points.
///
/// # Arguments
///
/// * `points` - The points to fit, at least two of them distinct.
///
/// # Returns
///
/// The fitted line, with endpoints at the smallest and largest projection of
/// the points on it.
pub fn fit_line(points: &[[f64; 3]]) -> Result<LineFit, FitError> {
    let distinct = match points.split_first() {
        None => 0,
        Some((first, rest)) => 1 + rest.iter().any(|p| p != first) as usize,
    };
    if distinct < 2 {
        return Err(FitError::InsufficientPoints {
            required: 2,
            actual: distinct,
        });
    }

    let pca = principal_axes(points)?;
    let direction = orient_axis(pca.axes[0]);
    let center = pca.center;

    let (t_min, t_max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, p| {
        let d: [f64; 3] = std::array::from_fn(|i| p[i] - center[i]);
        let t = dot_product3(&d, &direction);
        (acc.0.min(t), acc.1.max(t))
    });

    let endpoints = [
        std::array::from_fn(|i| center[i] + t_min * direction[i]),
        std::array::from_fn(|i| center[i] + t_max * direction[i]),
    ];

    log::debug!(
        "line fit over {} points: direction {:?}, spread {:?}",
        points.len(),
        direction,
        pca.singular_values
    );

    Ok(LineFit {
        direction,
        center,
        singular_values: pca.singular_values,
        endpoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_line_collinear() -> Result<(), Box<dyn std::error::Error>> {
        let points: Vec<[f64; 3]> = (0..10)
            .map(|i| {
                let t = i as f64;
                [1.0 + 6.0 * t, -1.0 + 2.0 * t, 3.0 - 3.0 * t]
            })
            .collect();
        let line = fit_line(&points)?;

        let norm = 7.0;
        assert_relative_eq!(line.direction[0], 6.0 / norm, epsilon = 1e-9);
        assert_relative_eq!(line.direction[1], 2.0 / norm, epsilon = 1e-9);
        assert_relative_eq!(line.direction[2], -3.0 / norm, epsilon = 1e-9);

        assert_relative_eq!(line.center[0], 28.0, epsilon = 1e-9);
        assert_relative_eq!(line.center[1], 8.0, epsilon = 1e-9);
        assert_relative_eq!(line.center[2], -10.5, epsilon = 1e-9);

        assert_relative_eq!(line.singular_values[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(line.singular_values[2], 0.0, epsilon = 1e-9);

        for (endpoint, expected) in line.endpoints.iter().zip([points[0], points[9]]) {
            for k in 0..3 {
                assert_relative_eq!(endpoint[k], expected[k], epsilon = 1e-9);
            }
        }
        assert_relative_eq!(line.length(), 63.0, epsilon = 1e-9);

        for p in points.iter() {
            assert_relative_eq!(line.distance_to(p), 0.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_fit_line_distance() -> Result<(), Box<dyn std::error::Error>> {
        let line = fit_line(&[[0.0, 0.0, 0.0], [5.0, 0.0, 0.0]])?;
        assert_relative_eq!(line.distance_to(&[2.0, 3.0, 4.0]), 5.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_fit_line_duplicates() {
        let res = fit_line(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);
        assert_eq!(
            res,
            Err(FitError::InsufficientPoints {
                required: 2,
                actual: 1
            })
        );
        assert!(fit_line(&[]).is_err());
    }
}

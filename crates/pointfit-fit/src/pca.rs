use nalgebra::DMatrix;
use pointfit_3d::ops;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Principal axes of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalAxes {
    /// Centroid of the points.
    pub center: [f64; 3],
    /// Singular values of the centered coordinates, in descending order.
    pub singular_values: [f64; 3],
    /// Right singular vectors, one unit row per singular value.
    pub axes: [[f64; 3]; 3],
}

/// Compute the principal axes of a set of points.
///
/// The centered coordinates are decomposed with a thin SVD. Sets with fewer
/// than three points are padded with zero rows, which leaves the
/// decomposition unchanged but always yields three axes.
///
/// # Arguments
///
/// * `points` - The points to analyze.
///
/// # Returns
///
/// The centroid with the singular values and right singular vectors sorted
/// by decreasing singular value.
///
/// # Errors
///
/// [`FitError::InsufficientPoints`] when `points` is empty.
pub fn principal_axes(points: &[[f64; 3]]) -> Result<PrincipalAxes, FitError> {
    if points.is_empty() {
        return Err(FitError::InsufficientPoints {
            required: 1,
            actual: 0,
        });
    }

    let center = ops::centroid(points);
    let rows = points.len().max(3);

    let mut centered = DMatrix::<f64>::zeros(rows, 3);
    for (i, p) in points.iter().enumerate() {
        for j in 0..3 {
            centered[(i, j)] = p[j] - center[j];
        }
    }

    let svd = centered.svd(false, true);
    let v_t = match svd.v_t {
        Some(v) => v,
        None => return Err(FitError::SvdFailed("Failed to compute V^T".to_string())),
    };

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    let singular_values = order.map(|k| svd.singular_values[k]);
    let axes = order.map(|k| [v_t[(k, 0)], v_t[(k, 1)], v_t[(k, 2)]]);

    Ok(PrincipalAxes {
        center,
        singular_values,
        axes,
    })
}

/// Flip a direction so that its largest magnitude component is positive.
pub fn orient_axis(v: [f64; 3]) -> [f64; 3] {
    let dominant = v
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    match dominant < 0.0 {
        true => [-v[0], -v[1], -v[2]],
        false => v,
    }
}

use pointfit_3d::linalg::dot_product3;
use pointfit_3d::PointSet;
use pointfit_fit::pca::principal_axes;
use rayon::prelude::*;

use crate::error::MlsError;
use crate::neighborhood::MlsParams;
use crate::result::MlsResult;

/// Neighborhoods smaller than this are left out of the curve fit.
const MIN_CURVE_NEIGHBORHOOD: usize = 4;

/// Smooth a point set toward a curve with moving least squares.
///
/// Every point is projected onto the principal line of its neighborhood. The
/// neighborhood holds `round(N * smoothing_factor / 10)` points, at least 5,
/// or every point within `radius` when one is given.
///
/// # Arguments
///
/// * `point_set` - The points to smooth. Its posed coordinates are used.
/// * `params` - The neighborhood selection.
///
/// # Returns
///
/// The projected points, with the sum of the two minor singular values of
/// each neighborhood as residual. Points with fewer than 4 neighbors are
/// skipped.
pub fn smooth_mls_1d(point_set: &PointSet, params: &MlsParams) -> Result<MlsResult, MlsError> {
    let now = std::time::Instant::now();

    let locator = point_set.locator();
    let selection = params.selection(locator.len(), 10.0)?;
    log::debug!("curve smoothing of {} points with {:?}", locator.len(), selection);

    let smoothed = locator
        .points()
        .par_iter()
        .map(|p| -> Result<Option<([f64; 3], f64)>, MlsError> {
            let neighborhood = selection.gather(locator, p);
            if neighborhood.len() < MIN_CURVE_NEIGHBORHOOD {
                return Ok(None);
            }

            let pca = principal_axes(&neighborhood)?;
            let (c, v) = (pca.center, pca.axes[0]);
            let d: [f64; 3] = std::array::from_fn(|i| p[i] - c[i]);
            let t = dot_product3(&d, &v);
            let projected = std::array::from_fn(|i| c[i] + t * v[i]);
            let variance = pca.singular_values[1] + pca.singular_values[2];

            Ok(Some((projected, variance)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = collect_kept(smoothed);
    log::debug!(
        "curve smoothing kept {} of {} points in {:?}",
        result.len(),
        locator.len(),
        now.elapsed()
    );
    Ok(result)
}

/// Gather the smoothed points, keeping track of their input indices.
pub(crate) fn collect_kept(smoothed: Vec<Option<([f64; 3], f64)>>) -> MlsResult {
    let mut result = MlsResult::default();
    for (index, (point, variance)) in smoothed
        .into_iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|s| (i, s)))
    {
        result.points.push(point);
        result.variances.push(variance);
        result.kept_indices.push(index);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smooth_mls_1d_straight_line() -> Result<(), MlsError> {
        let points: Vec<[f64; 3]> = (0..50).map(|i| [i as f64 * 0.1, 2.0, -1.0]).collect();
        let point_set = PointSet::from_points(points.clone());

        let result = smooth_mls_1d(&point_set, &MlsParams::default())?;

        assert_eq!(result.len(), 50);
        assert_eq!(result.kept_indices, (0..50).collect::<Vec<_>>());
        for (p, q) in result.points.iter().zip(points.iter()) {
            for k in 0..3 {
                assert_relative_eq!(p[k], q[k], epsilon = 1e-9);
            }
        }
        for v in result.variances.iter() {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_smooth_mls_1d_reduces_noise() -> Result<(), MlsError> {
        // zig-zag around the x axis
        let points: Vec<[f64; 3]> = (0..200)
            .map(|i| {
                let offset = if i % 2 == 0 { 0.05 } else { -0.05 };
                [i as f64 * 0.05, offset, 0.0]
            })
            .collect();
        let point_set = PointSet::from_points(points);

        let result = smooth_mls_1d(&point_set, &MlsParams::default())?;

        let max_before = 0.05;
        let max_after = result
            .points
            .iter()
            .map(|p| p[1].abs())
            .fold(0.0, f64::max);
        assert!(max_after < max_before);
        assert!(result.variances.iter().all(|v| *v > 0.0));
        Ok(())
    }

    #[test]
    fn test_smooth_mls_1d_uses_pose() -> Result<(), MlsError> {
        let points: Vec<[f64; 3]> = (0..20).map(|i| [i as f64, 0.0, 0.0]).collect();
        let mut point_set = PointSet::from_points(points);
        point_set.translate([0.0, 0.0, 3.0]);

        let result = smooth_mls_1d(&point_set, &MlsParams::default())?;
        for p in result.points.iter() {
            assert_relative_eq!(p[2], 3.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_smooth_mls_1d_radius_skips_isolated() -> Result<(), MlsError> {
        let mut points: Vec<[f64; 3]> = (0..10).map(|i| [i as f64 * 0.1, 0.0, 0.0]).collect();
        points.push([100.0, 0.0, 0.0]);
        let point_set = PointSet::from_points(points);

        let params = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(0.5),
        };
        let result = smooth_mls_1d(&point_set, &params)?;

        assert_eq!(result.len(), 10);
        assert!(!result.kept_indices.contains(&10));
        Ok(())
    }

    #[test]
    fn test_smooth_mls_1d_empty() -> Result<(), MlsError> {
        let result = smooth_mls_1d(&PointSet::default(), &MlsParams::default())?;
        assert!(result.is_empty());
        Ok(())
    }
}

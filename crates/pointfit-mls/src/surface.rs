use pointfit_3d::linalg::{cross_product3, dot_product3};
use pointfit_3d::PointSet;
use pointfit_fit::pca::principal_axes;
use rayon::prelude::*;

use crate::curve::collect_kept;
use crate::error::MlsError;
use crate::neighborhood::{MlsParams, Selection};
use crate::result::MlsResult;

/// Neighborhoods gathered by radius smaller than this are skipped.
const MIN_RADIUS_NEIGHBORHOOD: usize = 5;

/// A plane needs at least three points.
const MIN_PLANE_NEIGHBORHOOD: usize = 3;

/// Smooth a point set toward a surface with moving least squares.
///
/// Every point is projected along the local normal, `v0 × v1` of its
/// neighborhood, onto the plane through the neighborhood centroid. The
/// neighborhood holds `round(N * smoothing_factor / 100)` points, at least 5,
/// or every point within `radius` when one is given.
///
/// The residual of each point is the smallest singular value of its
/// neighborhood. Radius neighborhoods with fewer than 5 points are skipped.
pub fn smooth_mls_2d(point_set: &PointSet, params: &MlsParams) -> Result<MlsResult, MlsError> {
    let now = std::time::Instant::now();

    let locator = point_set.locator();
    let selection = params.selection(locator.len(), 100.0)?;
    let min_size = match selection {
        Selection::Radius(_) => MIN_RADIUS_NEIGHBORHOOD,
        Selection::Count(_) => MIN_PLANE_NEIGHBORHOOD,
    };
    log::debug!("surface smoothing of {} points with {:?}", locator.len(), selection);

    let smoothed = locator
        .points()
        .par_iter()
        .map(|p| -> Result<Option<([f64; 3], f64)>, MlsError> {
            let neighborhood = selection.gather(locator, p);
            if neighborhood.len() < min_size {
                return Ok(None);
            }

            let pca = principal_axes(&neighborhood)?;
            let normal = cross_product3(&pca.axes[0], &pca.axes[1]);
            let t = (dot_product3(&normal, &pca.center) - dot_product3(&normal, p))
                / dot_product3(&normal, &normal);
            let projected = std::array::from_fn(|i| p[i] + t * normal[i]);

            Ok(Some((projected, pca.singular_values[2])))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = collect_kept(smoothed);
    log::debug!(
        "surface smoothing kept {} of {} points in {:?}",
        result.len(),
        locator.len(),
        now.elapsed()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(n: usize, z: impl Fn(f64, f64) -> f64) -> Vec<[f64; 3]> {
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let (x, y) = (i as f64 * 0.1, j as f64 * 0.1);
                points.push([x, y, z(x, y)]);
            }
        }
        points
    }

    #[test]
    fn test_smooth_mls_2d_planar_idempotent() -> Result<(), MlsError> {
        let points = grid(10, |x, y| 0.5 * x - 0.2 * y + 1.0);
        let point_set = PointSet::from_points(points.clone());

        let result = smooth_mls_2d(&point_set, &MlsParams::default())?;

        assert_eq!(result.len(), 100);
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
    fn test_smooth_mls_2d_flattens_bumps() -> Result<(), MlsError> {
        let points = grid(20, |x, y| {
            let checker = ((x * 10.0).round() + (y * 10.0).round()) as i64 % 2;
            if checker == 0 {
                0.01
            } else {
                -0.01
            }
        });
        let point_set = PointSet::from_points(points);

        let params = MlsParams {
            smoothing_factor: 5.0,
            radius: None,
        };
        let result = smooth_mls_2d(&point_set, &params)?;

        assert_eq!(result.len(), 400);
        let mean_after = result.points.iter().map(|p| p[2].abs()).sum::<f64>() / 400.0;
        assert!(mean_after < 0.005, "mean |z| after smoothing = {mean_after}");
        assert!(result.variances.iter().all(|v| *v > 0.0));
        Ok(())
    }

    #[test]
    fn test_smooth_mls_2d_radius_skips_sparse() -> Result<(), MlsError> {
        let mut points = grid(10, |_, _| 0.0);
        points.push([5.0, 5.0, 5.0]);
        points.push([5.05, 5.0, 5.0]);
        let point_set = PointSet::from_points(points);

        let params = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(0.25),
        };
        let result = smooth_mls_2d(&point_set, &params)?;

        assert_eq!(result.len(), 100);
        assert_eq!(result.kept_indices, (0..100).collect::<Vec<_>>());
        for p in result.points.iter() {
            assert_relative_eq!(p[2], 0.0, epsilon = 1e-9);
        }
        Ok(())
    }
}

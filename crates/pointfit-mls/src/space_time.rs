use nalgebra::{DMatrix, DVector};
use pointfit_3d::{NeighborLocator, PointSet};
use pointfit_fit::FitError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MlsError;
use crate::result::SpaceTimeResult;

/// Every `STATS_STRIDE` points the neighborhood spread is sampled for the
/// suggested time spacing.
const STATS_STRIDE: usize = 1000;

/// Neighborhoods must hold more points than this to be fitted.
const MIN_SPACE_TIME_NEIGHBORHOOD: usize = 5;

/// Parameters of the space-time smoother.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceTimeParams {
    /// Number of neighbors in space-time used by each local fit.
    pub neighbours: usize,
}

impl Default for SpaceTimeParams {
    fn default() -> Self {
        Self { neighbours: 10 }
    }
}

/// Smooth a time sequence of point sets in 4D space-time with moving least
/// squares.
///
/// Every point `(x, y, z, t)` is projected onto the hyperplane `m · q = 1`
/// fitted by least squares to its `neighbours` nearest points in space-time,
/// shifted to pass through their mean. Points whose neighborhood holds fewer
/// than `neighbours` points, or 5 points or less, are skipped.
///
/// # Arguments
///
/// * `point_sets` - The sequence, ordered by time. Every set must carry a time tag.
/// * `params` - The neighborhood size.
///
/// # Errors
///
/// [`MlsError::MissingTime`] with the index of the first set without time.
pub fn smooth_mls_space_time(
    point_sets: &[PointSet],
    params: &SpaceTimeParams,
) -> Result<SpaceTimeResult, MlsError> {
    if params.neighbours == 0 {
        return Err(MlsError::InvalidParameter(
            "neighbours must be at least 1".to_string(),
        ));
    }

    let times = point_sets
        .iter()
        .enumerate()
        .map(|(i, ps)| ps.time().ok_or(MlsError::MissingTime(i)))
        .collect::<Result<Vec<_>, _>>()?;

    let average_dt = match (times.first(), times.last()) {
        (Some(first), Some(last)) if times.len() > 1 => (last - first) / (times.len() - 1) as f64,
        _ => 0.0,
    };
    log::info!("average time separation between point sets dt = {average_dt:.3}");

    let coords4d: Vec<[f64; 4]> = point_sets
        .iter()
        .zip(times.iter())
        .flat_map(|(ps, &t)| {
            ps.coordinates(true)
                .iter()
                .map(|p| [p[0], p[1], p[2], t])
                .collect::<Vec<_>>()
        })
        .collect();

    let now = std::time::Instant::now();
    let locator = NeighborLocator::<4>::new(&coords4d);
    let neighbours = params.neighbours;

    let smoothed = coords4d
        .par_iter()
        .enumerate()
        .map(|(i, p)| -> Result<Option<([f64; 4], Option<f64>)>, MlsError> {
            let closest = locator.gather(&locator.k_nearest(p, neighbours));
            let nc = closest.len();
            if nc < neighbours || nc <= MIN_SPACE_TIME_NEIGHBORHOOD {
                return Ok(None);
            }

            let Some(normal) = fit_hyperplane(&closest)? else {
                return Ok(None);
            };

            let center = mean4(&closest);
            let dist: f64 = (0..4).map(|k| (p[k] - center[k]) * normal[k]).sum();
            let projected = std::array::from_fn(|k| p[k] - dist * normal[k]);

            let spread = match i % STATS_STRIDE {
                0 => Some(spatial_spread(&closest, &center)),
                _ => None,
            };

            Ok(Some((projected, spread)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = SpaceTimeResult {
        average_dt,
        ..Default::default()
    };
    for (index, (q, spread)) in smoothed
        .into_iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|s| (i, s)))
    {
        result.points.push([q[0], q[1], q[2]]);
        result.times.push(q[3]);
        result.kept_indices.push(index);
        if spread.is_some() {
            result.suggested_dt = spread;
        }
    }

    if let Some(dt) = result.suggested_dt {
        log::info!("data suggest dt = {dt:.3}");
    }
    log::debug!(
        "space-time smoothing kept {} of {} points in {:?}",
        result.points.len(),
        coords4d.len(),
        now.elapsed()
    );

    Ok(result)
}

/// Unit normal of the hyperplane `m · q = 1` fitted to `points` by least
/// squares, or `None` when the fit is degenerate.
fn fit_hyperplane(points: &[[f64; 4]]) -> Result<Option<[f64; 4]>, MlsError> {
    let n = points.len();
    let flat: Vec<f64> = points.iter().flatten().copied().collect();
    let a = DMatrix::<f64>::from_row_slice(n, 4, &flat);
    let ones = DVector::<f64>::from_element(n, 1.0);

    let svd = a.svd(true, true);
    let tol = f64::EPSILON * n.max(4) as f64 * svd.singular_values.max();
    let m = svd
        .solve(&ones, tol)
        .map_err(|e| FitError::SvdFailed(e.to_string()))?;

    let norm = m.norm();
    if !norm.is_finite() || norm <= 0.0 {
        return Ok(None);
    }
    Ok(Some([m[0] / norm, m[1] / norm, m[2] / norm, m[3] / norm]))
}

fn mean4(points: &[[f64; 4]]) -> [f64; 4] {
    let mut mean = [0.0; 4];
    for p in points {
        for k in 0..4 {
            mean[k] += p[k];
        }
    }
    mean.map(|v| v / points.len() as f64)
}

/// Mean of the population standard deviations of the spatial coordinates.
fn spatial_spread(points: &[[f64; 4]], mean: &[f64; 4]) -> f64 {
    let n = points.len() as f64;
    let std_sum: f64 = (0..3)
        .map(|k| {
            let var = points.iter().map(|p| (p[k] - mean[k]).powi(2)).sum::<f64>() / n;
            var.sqrt()
        })
        .sum();
    std_sum / 3.0
}

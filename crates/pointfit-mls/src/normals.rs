use std::collections::VecDeque;

use pointfit_3d::linalg::dot_product3;
use pointfit_3d::PointSet;
use pointfit_fit::pca::principal_axes;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MlsError;
use crate::result::NormalsResult;

/// Parameters of the normal estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    /// Number of neighbors of the local plane fit.
    pub neighbours: usize,
    /// Orient every normal toward this point. Without it, normals are made
    /// consistent by walking the neighbor graph.
    pub orientation_point: Option<[f64; 3]>,
    /// Flip all normals after orientation.
    pub flip: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            neighbours: 20,
            orientation_point: None,
            flip: false,
        }
    }
}

/// Estimate point normals with a local principal component analysis.
///
/// The normal of each point is the least significant principal axis of its
/// `neighbours` nearest points.
///
/// Orientation follows `orientation_point` when given. Otherwise the walk
/// starts at the highest point, whose normal is made to point up, and flips
/// every newly reached normal to agree with the normal it was reached from.
pub fn estimate_normals_pca(
    point_set: &PointSet,
    params: &NormalParams,
) -> Result<NormalsResult, MlsError> {
    if params.neighbours < 3 {
        return Err(MlsError::InvalidParameter(format!(
            "a plane fit needs at least 3 neighbours, got {}",
            params.neighbours
        )));
    }

    let locator = point_set.locator();
    let points = locator.points();

    let (mut normals, neighborhoods): (Vec<[f64; 3]>, Vec<Vec<usize>>) = points
        .par_iter()
        .map(|p| -> Result<([f64; 3], Vec<usize>), MlsError> {
            let neighbors = locator.k_nearest(p, params.neighbours);
            let pca = principal_axes(&locator.gather(&neighbors))?;
            Ok((pca.axes[2], neighbors.iter().map(|n| n.index).collect()))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();

    match params.orientation_point {
        Some(target) => {
            for (n, p) in normals.iter_mut().zip(points.iter()) {
                let to_target: [f64; 3] = std::array::from_fn(|i| target[i] - p[i]);
                if dot_product3(n, &to_target) < 0.0 {
                    *n = n.map(|v| -v);
                }
            }
        }
        None => orient_by_traversal(points, &neighborhoods, &mut normals),
    }

    if params.flip {
        for n in normals.iter_mut() {
            *n = n.map(|v| -v);
        }
    }

    log::debug!(
        "estimated {} normals from {} neighbours",
        normals.len(),
        params.neighbours
    );

    Ok(NormalsResult { normals })
}

/// Breadth-first walk of the neighbor graph making adjacent normals agree.
///
/// Every connected component is seeded at its highest unvisited point.
fn orient_by_traversal(
    points: &[[f64; 3]],
    neighborhoods: &[Vec<usize>],
    normals: &mut [[f64; 3]],
) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[b][2].total_cmp(&points[a][2]));

    let mut visited = vec![false; points.len()];
    let mut queue = VecDeque::new();

    for seed in order {
        if visited[seed] {
            continue;
        }
        if normals[seed][2] < 0.0 {
            normals[seed] = normals[seed].map(|v| -v);
        }
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let reference = normals[current];
            for &next in neighborhoods[current].iter() {
                if visited[next] {
                    continue;
                }
                if dot_product3(&normals[next], &reference) < 0.0 {
                    normals[next] = normals[next].map(|v| -v);
                }
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
}

use pointfit_3d::{PointArray, PointSet};
use serde::{Deserialize, Serialize};

use crate::error::MlsError;

/// Name of the scalar array holding the local fit residuals.
pub const VARIANCES_ARRAY: &str = "variances";

/// Name of the scalar array holding the time of each smoothed point.
pub const TIME_ARRAY: &str = "time";

/// Name of the vector array holding estimated normals.
pub const NORMALS_ARRAY: &str = "Normals";

/// Output of the curve and surface smoothers.
///
/// Points whose neighborhood was too small are omitted; `kept_indices[i]` is
/// the input index of `points[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlsResult {
    /// The smoothed points.
    pub points: Vec<[f64; 3]>,
    /// Residual of the local fit of each smoothed point.
    pub variances: Vec<f64>,
    /// Input index of each smoothed point.
    pub kept_indices: Vec<usize>,
}

impl MlsResult {
    /// Number of smoothed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no point was smoothed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build a new point set from the smoothed points, with the residuals
    /// stored in the [`VARIANCES_ARRAY`] scalar array.
    pub fn into_point_set(self) -> Result<PointSet, MlsError> {
        let mut point_set = PointSet::from_points(self.points);
        point_set.add_point_array(VARIANCES_ARRAY, PointArray::Scalars(self.variances))?;
        Ok(point_set)
    }

    /// Replace the coordinates of `point_set` with the smoothed points.
    ///
    /// The pose is reset. When points were skipped the existing arrays and
    /// colors of `point_set` no longer match and are dropped.
    pub fn apply_to(self, point_set: &mut PointSet) -> Result<(), MlsError> {
        point_set.set_coordinates(self.points)?;
        point_set.add_point_array(VARIANCES_ARRAY, PointArray::Scalars(self.variances))?;
        Ok(())
    }
}

/// Output of the space-time smoother.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceTimeResult {
    /// The smoothed spatial coordinates.
    pub points: Vec<[f64; 3]>,
    /// The smoothed time coordinate of each point.
    pub times: Vec<f64>,
    /// Index of each point in the concatenation of the input sets.
    pub kept_indices: Vec<usize>,
    /// Average time spacing between consecutive input sets,
    /// `(t_last - t_first) / (n_sets - 1)`, and 0 for a single set.
    ///
    /// This is the spacing between sets, not the time span divided by
    /// `n_sets`, which is smaller by a factor `(n_sets - 1) / n_sets`.
    pub average_dt: f64,
    /// Time spacing suggested by the spatial spread of the neighborhoods.
    pub suggested_dt: Option<f64>,
}

impl SpaceTimeResult {
    /// Build a new point set from the smoothed points, with their times
    /// stored in the [`TIME_ARRAY`] scalar array.
    pub fn into_point_set(self) -> Result<PointSet, MlsError> {
        let mut point_set = PointSet::from_points(self.points);
        point_set.add_point_array(TIME_ARRAY, PointArray::Scalars(self.times))?;
        Ok(point_set)
    }
}

/// Per point normals estimated from local neighborhoods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalsResult {
    /// One unit normal per input point.
    pub normals: Vec<[f64; 3]>,
}

impl NormalsResult {
    /// Store the normals in the [`NORMALS_ARRAY`] vector array.
    ///
    /// The normals are estimated from posed coordinates, so the pose of
    /// `point_set` is baked into its raw coordinates first.
    pub fn apply_to(self, point_set: &mut PointSet) -> Result<(), MlsError> {
        point_set.bake_pose();
        point_set.add_point_array(NORMALS_ARRAY, PointArray::Vectors(self.normals))?;
        Ok(())
    }
}

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{
    error::PointSetError,
    locator::NeighborLocator,
    ops,
    pose::{AffineTransform, Pose},
    transforms::{axis_rotation_matrix, Axis},
};

/// Name of the vector array written by [`PointSet::gauss_noise`].
pub const GAUSS_NOISE_ARRAY: &str = "GaussNoise";

/// Coordinate data accepted when building or replacing a point set.
///
/// Two dimensional inputs are promoted to 3D with a zero z coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum PointsInput {
    /// One `[x, y, z]` triplet per point.
    Xyz(Vec<[f64; 3]>),
    /// One `[x, y]` pair per point.
    Xy(Vec<[f64; 2]>),
    /// One row per point, every row of length 2 or 3.
    Rows(Vec<Vec<f64>>),
    /// Coordinate columns `[all_x, all_y]` or `[all_x, all_y, all_z]`.
    Columns(Vec<Vec<f64>>),
    /// Interleaved coordinates with `dim` values per point.
    Flat {
        /// The interleaved coordinates.
        data: Vec<f64>,
        /// Number of values per point, 2 or 3.
        dim: usize,
    },
}

impl From<Vec<[f64; 3]>> for PointsInput {
    fn from(points: Vec<[f64; 3]>) -> Self {
        PointsInput::Xyz(points)
    }
}

impl From<&[[f64; 3]]> for PointsInput {
    fn from(points: &[[f64; 3]]) -> Self {
        PointsInput::Xyz(points.to_vec())
    }
}

impl From<Vec<[f64; 2]>> for PointsInput {
    fn from(points: Vec<[f64; 2]>) -> Self {
        PointsInput::Xy(points)
    }
}

/// Widen a row of 2 or 3 coordinates to a 3D point, with `z = 0` for 2D rows.
fn promote(values: &[f64]) -> [f64; 3] {
    [values[0], values[1], values.get(2).copied().unwrap_or(0.0)]
}

fn check_dim(dim: usize) -> Result<(), PointSetError> {
    match dim {
        2 | 3 => Ok(()),
        _ => Err(PointSetError::ShapeMismatch(format!(
            "points must have 2 or 3 coordinates, got {dim}"
        ))),
    }
}

impl PointsInput {
    /// Resolve the input into 3D points.
    pub fn into_points(self) -> Result<Vec<[f64; 3]>, PointSetError> {
        match self {
            PointsInput::Xyz(points) => Ok(points),
            PointsInput::Xy(points) => Ok(points.into_iter().map(|[x, y]| [x, y, 0.0]).collect()),
            PointsInput::Rows(rows) => {
                let Some(dim) = rows.first().map(Vec::len) else {
                    return Ok(Vec::new());
                };
                check_dim(dim)?;
                if let Some(row) = rows.iter().find(|row| row.len() != dim) {
                    return Err(PointSetError::ShapeMismatch(format!(
                        "rows have mixed lengths {dim} and {}",
                        row.len()
                    )));
                }
                Ok(rows.iter().map(|row| promote(row)).collect())
            }
            PointsInput::Columns(columns) => {
                check_dim(columns.len())?;
                let num_points = columns[0].len();
                if columns.iter().any(|col| col.len() != num_points) {
                    return Err(PointSetError::ShapeMismatch(
                        "coordinate columns have different lengths".to_string(),
                    ));
                }
                let z = |i: usize| columns.get(2).map_or(0.0, |col| col[i]);
                Ok((0..num_points)
                    .map(|i| [columns[0][i], columns[1][i], z(i)])
                    .collect())
            }
            PointsInput::Flat { data, dim } => {
                check_dim(dim)?;
                if data.len() % dim != 0 {
                    return Err(PointSetError::ShapeMismatch(format!(
                        "{} values cannot be split into points of dimension {dim}",
                        data.len()
                    )));
                }
                Ok(data.chunks_exact(dim).map(promote).collect())
            }
        }
    }
}

/// A named per point attribute array.
#[derive(Debug, Clone, PartialEq)]
pub enum PointArray {
    /// One scalar per point.
    Scalars(Vec<f64>),
    /// One 3D vector per point.
    Vectors(Vec<[f64; 3]>),
    /// One 4-tuple per point.
    Tuples4(Vec<[f64; 4]>),
}

impl PointArray {
    /// Number of entries in the array.
    pub fn len(&self) -> usize {
        match self {
            PointArray::Scalars(v) => v.len(),
            PointArray::Vectors(v) => v.len(),
            PointArray::Tuples4(v) => v.len(),
        }
    }

    /// Check if the array is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retain_mask(&mut self, keep: &[bool]) {
        match self {
            PointArray::Scalars(v) => retain_by_mask(v, keep),
            PointArray::Vectors(v) => retain_by_mask(v, keep),
            PointArray::Tuples4(v) => retain_by_mask(v, keep),
        }
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter().copied();
    values.retain(|_| flags.next().unwrap_or(true));
}

/// Kind of neighborhood requested from [`PointSet::closest_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeighborQuery {
    /// The single closest point.
    Closest,
    /// A fixed number of closest points, by ascending distance.
    KNearest(usize),
    /// Every point within a radius, unordered.
    Radius(f64),
}

/// An ordered set of 3D points with a lazily applied pose.
///
/// The raw coordinates are stored untouched; the pose is applied on read by
/// [`PointSet::coordinates`]. A neighbor locator over the posed coordinates
/// is built on the first neighborhood query and dropped by every mutation.
#[derive(Debug, Default)]
pub struct PointSet {
    // The raw coordinates of the points.
    points: Vec<[f64; 3]>,
    // Placement applied on top of the raw coordinates.
    pose: Pose,
    // Named per point arrays.
    arrays: BTreeMap<String, PointArray>,
    // Optional RGBA color per point.
    colors: Option<Vec<[u8; 4]>>,
    // Time tag used when smoothing sequences of point sets.
    time: Option<f64>,
    // Lazily built locator over the posed coordinates.
    locator: OnceLock<NeighborLocator>,
}

impl Clone for PointSet {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            pose: self.pose,
            arrays: self.arrays.clone(),
            colors: self.colors.clone(),
            time: self.time,
            locator: OnceLock::new(),
        }
    }
}

impl From<Vec<[f64; 3]>> for PointSet {
    fn from(points: Vec<[f64; 3]>) -> Self {
        Self::from_points(points)
    }
}

impl PointSet {
    /// Create a point set from any supported coordinate input.
    ///
    /// Example:
    ///
    /// ```
    /// use pointfit_3d::{PointSet, PointsInput};
    ///
    /// let columns = vec![vec![0.0, 1.0], vec![0.0, 2.0]];
    /// let points = PointSet::new(PointsInput::Columns(columns)).unwrap();
    /// assert_eq!(points.coordinates(true)[1], [1.0, 2.0, 0.0]);
    /// ```
    pub fn new(input: impl Into<PointsInput>) -> Result<Self, PointSetError> {
        Ok(Self::from_points(input.into().into_points()?))
    }

    /// Create a point set from 3D points.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Attach a time tag to the point set.
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// Get the number of points in the point set.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The time tag of the point set, if any.
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Set or clear the time tag.
    pub fn set_time(&mut self, time: Option<f64>) {
        self.time = time;
    }

    /// Get the coordinates of the points.
    ///
    /// With `apply_pose == false`, or when the pose is the identity, the raw
    /// buffer is borrowed. Otherwise the posed coordinates are computed.
    pub fn coordinates(&self, apply_pose: bool) -> Cow<'_, [[f64; 3]]> {
        match apply_pose && !self.pose.is_identity() {
            true => Cow::Owned(self.pose.to_affine().transform_points(&self.points)),
            false => Cow::Borrowed(&self.points),
        }
    }

    /// Mutable access to the raw coordinates for in place edits.
    pub fn coordinates_mut(&mut self) -> &mut [[f64; 3]] {
        self.invalidate_locator();
        &mut self.points
    }

    /// Replace the raw coordinates.
    ///
    /// The pose is reset to the identity so that the posed coordinates equal
    /// the new buffer exactly. Per point arrays are dropped when the number
    /// of points changes.
    pub fn set_coordinates(&mut self, input: impl Into<PointsInput>) -> Result<(), PointSetError> {
        let points = input.into().into_points()?;
        self.replace_points(points);
        Ok(())
    }

    /// Get the posed coordinates of a single point.
    pub fn point(&self, index: usize) -> Result<[f64; 3], PointSetError> {
        self.points
            .get(index)
            .map(|p| self.pose.transform_point(p))
            .ok_or(PointSetError::IndexOutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// Get the posed coordinates of several points.
    pub fn points_at(&self, indices: &[usize]) -> Result<Vec<[f64; 3]>, PointSetError> {
        indices.iter().map(|&i| self.point(i)).collect()
    }

    /// The current pose.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Replace the pose, keeping the raw coordinates.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.invalidate_locator();
    }

    /// Reset the pose to the identity.
    pub fn reset_pose(&mut self) {
        self.set_pose(Pose::IDENTITY);
    }

    /// Move the point set by `delta`.
    pub fn translate(&mut self, delta: [f64; 3]) {
        self.pose.translate(delta);
        self.invalidate_locator();
    }

    /// Place the origin of the point set at `position`.
    pub fn set_position(&mut self, position: [f64; 3]) {
        self.pose.translation = position;
        self.invalidate_locator();
    }

    /// Rotate the point set about its origin around a world axis.
    pub fn rotate(&mut self, axis: &[f64; 3], angle: f64) -> Result<(), PointSetError> {
        self.pose.rotate(axis, angle)?;
        self.invalidate_locator();
        Ok(())
    }

    /// Rotate about the x axis by `angle` radians.
    pub fn rotate_x(&mut self, angle: f64) {
        self.rotate_axis(Axis::X, angle);
    }

    /// Rotate about the y axis by `angle` radians.
    pub fn rotate_y(&mut self, angle: f64) {
        self.rotate_axis(Axis::Y, angle);
    }

    /// Rotate about the z axis by `angle` radians.
    pub fn rotate_z(&mut self, angle: f64) {
        self.rotate_axis(Axis::Z, angle);
    }

    fn rotate_axis(&mut self, axis: Axis, angle: f64) {
        self.pose.pre_rotate(&axis_rotation_matrix(axis, angle));
        self.invalidate_locator();
    }

    /// Scale the point set uniformly about its origin.
    pub fn scale(&mut self, factor: f64) {
        self.scale_xyz([factor; 3]);
    }

    /// Scale the point set about its origin with one factor per axis.
    pub fn scale_xyz(&mut self, factors: [f64; 3]) {
        self.pose.scale_by(factors);
        self.invalidate_locator();
    }

    /// Add or replace a named per point array.
    pub fn add_point_array(
        &mut self,
        name: impl Into<String>,
        array: PointArray,
    ) -> Result<(), PointSetError> {
        let name = name.into();
        if array.len() != self.len() {
            return Err(PointSetError::ShapeMismatch(format!(
                "array {name} has {} entries for {} points",
                array.len(),
                self.len()
            )));
        }
        self.arrays.insert(name, array);
        Ok(())
    }

    /// Get a named per point array.
    pub fn point_array(&self, name: &str) -> Option<&PointArray> {
        self.arrays.get(name)
    }

    /// Remove a named per point array.
    pub fn remove_point_array(&mut self, name: &str) -> Option<PointArray> {
        self.arrays.remove(name)
    }

    /// Names of the stored per point arrays.
    pub fn point_array_names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    /// Assign one RGBA color per point.
    pub fn set_colors(&mut self, colors: Vec<[u8; 4]>) -> Result<(), PointSetError> {
        if colors.len() != self.len() {
            return Err(PointSetError::ShapeMismatch(format!(
                "{} colors for {} points",
                colors.len(),
                self.len()
            )));
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// The per point colors, if any.
    pub fn colors(&self) -> Option<&[[u8; 4]]> {
        self.colors.as_deref()
    }

    /// Get the neighbor locator over the posed coordinates, building it if needed.
    pub fn locator(&self) -> &NeighborLocator {
        self.locator.get_or_init(|| {
            log::debug!("building neighbor locator over {} points", self.len());
            NeighborLocator::<3>::new(&self.coordinates(true))
        })
    }

    /// Discard the cached neighbor locator.
    pub fn invalidate_locator(&mut self) {
        self.locator.take();
    }

    /// Find the indices of the points closest to `query`.
    ///
    /// `KNearest(1)` behaves as `Closest`; `KNearest(0)` finds nothing.
    pub fn closest_point(&self, query: &[f64; 3], neighbors: NeighborQuery) -> Vec<usize> {
        let locator = self.locator();
        match neighbors {
            NeighborQuery::Closest | NeighborQuery::KNearest(1) => {
                locator.closest(query).into_iter().map(|n| n.index).collect()
            }
            NeighborQuery::KNearest(k) => locator
                .k_nearest(query, k)
                .into_iter()
                .map(|n| n.index)
                .collect(),
            NeighborQuery::Radius(radius) => locator
                .within_radius(query, radius)
                .into_iter()
                .map(|n| n.index)
                .collect(),
        }
    }

    /// Same as [`PointSet::closest_point`] returning posed coordinates.
    pub fn closest_points(&self, query: &[f64; 3], neighbors: NeighborQuery) -> Vec<[f64; 3]> {
        let locator = self.locator();
        self.closest_point(query, neighbors)
            .into_iter()
            .map(|i| locator.points()[i])
            .collect()
    }

    /// Delete points by index, keeping the order of the remaining points.
    pub fn delete_points(&mut self, indices: &[usize]) -> Result<(), PointSetError> {
        let len = self.len();
        let mut keep = vec![true; len];
        for &index in indices {
            match keep.get_mut(index) {
                Some(flag) => *flag = false,
                None => return Err(PointSetError::IndexOutOfBounds { index, len }),
            }
        }
        retain_by_mask(&mut self.points, &keep);
        if let Some(colors) = self.colors.as_mut() {
            retain_by_mask(colors, &keep);
        }
        for array in self.arrays.values_mut() {
            array.retain_mask(&keep);
        }
        self.invalidate_locator();
        Ok(())
    }

    /// Apply an affine map to the posed coordinates and store the result as
    /// the new raw coordinates, with an identity pose.
    pub fn apply_transform(&mut self, transform: &AffineTransform) {
        let composed = self.pose.to_affine().then(transform);
        self.points = composed.transform_points(&self.points);
        self.pose = Pose::IDENTITY;
        self.invalidate_locator();
    }

    /// Write the posed coordinates into the raw buffer and reset the pose.
    pub fn bake_pose(&mut self) {
        self.apply_transform(&AffineTransform::identity());
    }

    /// Scale the points about the origin so that their root mean square
    /// distance from the center of mass is one.
    pub fn normalize(&mut self) {
        let coords = self.coordinates(true);
        if coords.is_empty() {
            return;
        }
        let cm = ops::centroid(&coords);
        let mean_sq = coords
            .iter()
            .map(|p| ops::squared_euclidean_distance(p, &cm))
            .sum::<f64>()
            / coords.len() as f64;
        if mean_sq <= 0.0 {
            return;
        }
        let factor = 1.0 / mean_sq.sqrt();
        self.apply_transform(&AffineTransform::from_scale([factor; 3]));
    }

    /// Mirror the points along one of the cartesian axes.
    pub fn mirror(&mut self, axis: Axis) {
        self.apply_transform(&AffineTransform::mirror(axis));
    }

    /// Apply a shear deformation along the main axes.
    pub fn shear(&mut self, x: f64, y: f64, z: f64) {
        self.apply_transform(&AffineTransform::shear(x, y, z));
    }

    /// Add gaussian noise to the point positions.
    ///
    /// `sigma` is expressed in percent of the diagonal size. The negated
    /// displacements are stored in the [`GAUSS_NOISE_ARRAY`] vector array.
    pub fn gauss_noise<R: Rng + ?Sized>(&mut self, sigma: f64, rng: &mut R) {
        let coords = self.coordinates(true).into_owned();
        let amplitude = sigma * ops::diagonal_size(&coords) / 100.0;
        let mut noise = Vec::with_capacity(coords.len());
        let noisy = coords
            .iter()
            .map(|p| {
                let n: [f64; 3] = std::array::from_fn(|_| {
                    let v: f64 = StandardNormal.sample(rng);
                    v * amplitude
                });
                noise.push([-n[0], -n[1], -n[2]]);
                [p[0] + n[0], p[1] + n[1], p[2] + n[2]]
            })
            .collect();
        self.replace_points(noisy);
        self.arrays
            .insert(GAUSS_NOISE_ARRAY.to_string(), PointArray::Vectors(noise));
    }

    /// Move the points toward `target` by `factor`.
    ///
    /// With `absolute`, each displacement is first shortened by the distance
    /// of the nearest point, so that the nearest point reaches the target
    /// when `factor == 1`.
    pub fn warp_to_point(&mut self, target: [f64; 3], factor: f64, absolute: bool) {
        let coords = self.coordinates(true).into_owned();
        let min_mag = coords
            .iter()
            .map(|p| ops::euclidean_distance(p, &target))
            .fold(f64::INFINITY, f64::min);
        let warped = coords
            .iter()
            .map(|p| {
                let goal = match absolute {
                    true => {
                        let mag = ops::euclidean_distance(p, &target);
                        let shrink = if mag > 0.0 { (mag - min_mag) / mag } else { 0.0 };
                        std::array::from_fn(|i| target[i] + (p[i] - target[i]) * shrink)
                    }
                    false => target,
                };
                std::array::from_fn(|i| (1.0 - factor) * p[i] + factor * goal[i])
            })
            .collect();
        self.replace_points(warped);
    }

    /// Flatten the points onto the plane orthogonal to `axis` through the
    /// minimum bound along that axis.
    pub fn project_on_plane(&mut self, axis: Axis) {
        let mut coords = self.coordinates(true).into_owned();
        let k = axis.index();
        let level = coords.iter().map(|p| p[k]).fold(f64::INFINITY, f64::min);
        for p in coords.iter_mut() {
            p[k] = level;
        }
        self.replace_points(coords);
    }

    /// Center of mass of the posed coordinates.
    pub fn center_of_mass(&self) -> [f64; 3] {
        ops::centroid(&self.coordinates(true))
    }

    /// Mean distance of the posed points from their center of mass.
    pub fn average_size(&self) -> f64 {
        ops::average_size(&self.coordinates(true))
    }

    /// Axis aligned bounds `(min, max)` of the posed coordinates.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        ops::bounds(&self.coordinates(true))
    }

    /// Length of the diagonal of the posed bounding box.
    pub fn diagonal_size(&self) -> f64 {
        ops::diagonal_size(&self.coordinates(true))
    }

    fn replace_points(&mut self, points: Vec<[f64; 3]>) {
        if points.len() != self.points.len() && (self.colors.is_some() || !self.arrays.is_empty())
        {
            log::warn!(
                "point count changed from {} to {}, dropping {} point arrays",
                self.points.len(),
                points.len(),
                self.arrays.len() + usize::from(self.colors.is_some())
            );
            self.arrays.clear();
            self.colors = None;
        }
        self.points = points;
        self.pose = Pose::IDENTITY;
        self.invalidate_locator();
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    error::PointSetError,
    linalg::{self, mat33_vec3, matmul33},
    transforms::{axis_angle_to_rotation_matrix, Axis},
};

const IDENTITY33: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Placement of a point set in space: a rotation, a translation and a per
/// axis scale.
///
/// A raw point `p` is mapped to `rotation * diag(scale) * p + translation`,
/// i.e. the set is scaled and rotated about its own origin and then moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Rotation matrix in row major order.
    pub rotation: [[f64; 3]; 3],
    /// Position of the origin of the point set.
    pub translation: [f64; 3],
    /// Scale factor along each axis of the point set.
    pub scale: [f64; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Pose = Pose {
        rotation: IDENTITY33,
        translation: [0.0; 3],
        scale: [1.0; 3],
    };

    /// Create a pose from its components.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3], scale: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    /// Check if the pose leaves every point untouched.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// The linear part `rotation * diag(scale)`.
    pub fn linear(&self) -> [[f64; 3]; 3] {
        let mut m = self.rotation;
        for row in m.iter_mut() {
            for (val, s) in row.iter_mut().zip(self.scale.iter()) {
                *val *= s;
            }
        }
        m
    }

    /// The pose as a general affine map.
    pub fn to_affine(&self) -> AffineTransform {
        AffineTransform::new(self.linear(), self.translation)
    }

    /// Map a single raw point.
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        self.to_affine().transform_point(point)
    }

    /// Move the point set by `delta`.
    pub fn translate(&mut self, delta: [f64; 3]) {
        for (t, d) in self.translation.iter_mut().zip(delta) {
            *t += d;
        }
    }

    /// Rotate the point set about its own origin.
    ///
    /// The axis is expressed in world coordinates; the position is unchanged.
    pub fn rotate(&mut self, axis: &[f64; 3], angle: f64) -> Result<(), PointSetError> {
        let rotation = axis_angle_to_rotation_matrix(axis, angle)?;
        self.pre_rotate(&rotation);
        Ok(())
    }

    /// Compose a world frame rotation on top of the current one.
    pub fn pre_rotate(&mut self, rotation: &[[f64; 3]; 3]) {
        let mut composed = [[0.0; 3]; 3];
        matmul33(rotation, &self.rotation, &mut composed);
        self.rotation = composed;
    }

    /// Multiply the per axis scale by `factors`.
    pub fn scale_by(&mut self, factors: [f64; 3]) {
        for (s, f) in self.scale.iter_mut().zip(factors) {
            *s *= f;
        }
    }
}

/// A general affine map `matrix * p + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Linear part in row major order.
    pub matrix: [[f64; 3]; 3],
    /// Translation part.
    pub translation: [f64; 3],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// Create an affine map from its linear and translation parts.
    pub fn new(matrix: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            matrix,
            translation,
        }
    }

    /// The identity map.
    pub fn identity() -> Self {
        Self::new(IDENTITY33, [0.0; 3])
    }

    /// A scale about the origin.
    pub fn from_scale(scale: [f64; 3]) -> Self {
        Self::new(
            [
                [scale[0], 0.0, 0.0],
                [0.0, scale[1], 0.0],
                [0.0, 0.0, scale[2]],
            ],
            [0.0; 3],
        )
    }

    /// A pure translation.
    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self::new(IDENTITY33, translation)
    }

    /// A reflection negating one coordinate axis.
    pub fn mirror(axis: Axis) -> Self {
        let mut scale = [1.0; 3];
        scale[axis.index()] = -1.0;
        Self::from_scale(scale)
    }

    /// A shear along the main axes with matrix `[[1, x, 0], [y, 1, z], [0, 0, 1]]`.
    pub fn shear(x: f64, y: f64, z: f64) -> Self {
        Self::new([[1.0, x, 0.0], [y, 1.0, z], [0.0, 0.0, 1.0]], [0.0; 3])
    }

    /// Compose two maps: the result applies `self` first, then `next`.
    pub fn then(&self, next: &AffineTransform) -> AffineTransform {
        let mut matrix = [[0.0; 3]; 3];
        matmul33(&next.matrix, &self.matrix, &mut matrix);
        let moved = mat33_vec3(&next.matrix, &self.translation);
        AffineTransform::new(
            matrix,
            [
                moved[0] + next.translation[0],
                moved[1] + next.translation[1],
                moved[2] + next.translation[2],
            ],
        )
    }

    /// Map a single point.
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        let p = mat33_vec3(&self.matrix, point);
        [
            p[0] + self.translation[0],
            p[1] + self.translation[1],
            p[2] + self.translation[2],
        ]
    }

    /// Map a buffer of points into a new buffer.
    pub fn transform_points(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let mut dst_points = vec![[0.0; 3]; points.len()];
        linalg::transform_points3d_into(points, &self.matrix, &self.translation, &mut dst_points);
        dst_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pose_identity() {
        let pose = Pose::default();
        assert!(pose.is_identity());
        assert_eq!(pose.transform_point(&[1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pose_scale_rotate_translate() -> Result<(), PointSetError> {
        let mut pose = Pose::default();
        pose.scale_by([2.0, 1.0, 1.0]);
        pose.rotate(&[0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2)?;
        pose.translate([0.0, 0.0, 1.0]);
        assert!(!pose.is_identity());

        // scale x by 2 -> (2, 0, 0), rotate about z -> (0, 2, 0), move up
        let p = pose.transform_point(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_affine_then() {
        let shift = AffineTransform::from_translation([1.0, 0.0, 0.0]);
        let double = AffineTransform::from_scale([2.0, 2.0, 2.0]);
        let composed = shift.then(&double);
        assert_eq!(composed.transform_point(&[1.0, 1.0, 1.0]), [4.0, 2.0, 2.0]);
        assert_eq!(
            composed.transform_points(&[[0.0, 0.0, 0.0]]),
            vec![[2.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_pose_serde() -> Result<(), Box<dyn std::error::Error>> {
        let mut pose = Pose::default();
        pose.translate([1.0, 2.0, 3.0]);
        let json = serde_json::to_string(&pose)?;
        let restored: Pose = serde_json::from_str(&json)?;
        assert_eq!(restored, pose);
        Ok(())
    }
}

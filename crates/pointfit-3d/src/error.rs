/// An error type for point set construction and mutation.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PointSetError {
    /// Coordinate data cannot be read as 2D/3D points, or a per-point array
    /// does not have one entry per point.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A point index is outside the point set.
    #[error("Point index {index} is out of bounds for a point set of {len} points")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of points in the set.
        len: usize,
    },

    /// A rotation was requested around a zero-length axis.
    #[error("Cannot compute rotation matrix from a zero vector")]
    ZeroRotationAxis,
}

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for point set operations.
pub mod error;

/// Linear algebra utilities.
pub mod linalg;

/// Spatial index for nearest neighbor and radius queries.
pub mod locator;

/// Operations on sets of 3D points.
pub mod ops;

/// Point set storage with a lazily applied pose.
pub mod pointcloud;

/// Rigid placement and affine transforms.
pub mod pose;

/// 3D transforms algorithms.
pub mod transforms;

mod utils;

pub use error::PointSetError;
pub use locator::{Neighbor, NeighborLocator};
pub use pointcloud::{NeighborQuery, PointArray, PointSet, PointsInput};
pub use pose::{AffineTransform, Pose};

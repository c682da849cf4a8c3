#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The smoothers read the posed coordinates of a [`pointfit_3d::PointSet`]
//! through its neighbor locator and never modify it; their results can be
//! written back with [`MlsResult::apply_to`] or turned into new point sets.

mod curve;
pub use curve::smooth_mls_1d;

mod error;
pub use error::MlsError;

mod neighborhood;
pub use neighborhood::{MlsParams, MIN_NEIGHBORS};

mod normals;
pub use normals::{estimate_normals_pca, NormalParams};

mod result;
pub use result::{
    MlsResult, NormalsResult, SpaceTimeResult, NORMALS_ARRAY, TIME_ARRAY, VARIANCES_ARRAY,
};

mod space_time;
pub use space_time::{smooth_mls_space_time, SpaceTimeParams};

mod surface;
pub use surface::smooth_mls_2d;

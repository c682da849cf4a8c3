#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Every fitter takes the posed coordinates of a point set, e.g. the output
//! of [`pointfit_3d::PointSet::coordinates`] with `apply_pose == true`.
//!
//! Principal directions are only defined up to their sign. Line directions,
//! plane normals and the first two ellipsoid axes are oriented so that their
//! largest magnitude component is positive; the third ellipsoid axis
//! completes a right handed frame.

mod ellipsoid;
pub use ellipsoid::{fit_ellipsoid, EllipsoidFit};

mod error;
pub use error::FitError;

mod line;
pub use line::{fit_line, LineFit};

/// Principal component analysis of point sets.
pub mod pca;

mod plane;
pub use plane::{fit_plane, PlaneFit};

mod sphere;
pub use sphere::{fit_sphere, SphereFit};

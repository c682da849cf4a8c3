use pointfit_3d::PointSetError;
use pointfit_fit::FitError;
use thiserror::Error;

/// Error types for the smoothing operations.
#[derive(Debug, Error, PartialEq)]
pub enum MlsError {
    /// A point set of a time sequence has no time tag.
    #[error("Point set {0} of the sequence has no time tag")]
    MissingTime(usize),

    /// A smoothing parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A local fit failed.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// The smoothed points could not be written to a point set.
    #[error(transparent)]
    PointSet(#[from] PointSetError),
}

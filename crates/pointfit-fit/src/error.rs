use thiserror::Error;

/// Error types for the shape fitters.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    /// Fewer points than the fit needs.
    #[error("Fit requires at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required by the fit.
        required: usize,
        /// Actual number of (distinct) points provided.
        actual: usize,
    },

    /// The least-squares system of a sphere fit does not have full rank.
    #[error("Least-squares system is rank deficient: rank {rank} < 4")]
    RankDeficient {
        /// Numerical rank of the coefficient matrix.
        rank: usize,
    },

    /// The requested confidence level is outside (0, 1).
    #[error("Confidence level must be in (0, 1), got {0}")]
    InvalidPValue(f64),

    /// Singular value decomposition failed.
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),

    /// The statistical distribution could not be built.
    #[error("Invalid distribution parameters: {0}")]
    Distribution(String),
}

//! Error taxonomy for the uncertainty-extraction pipeline.
//!
//! Numeric degeneracies inside a block (zero spread, zero mean) are *not*
//! errors: they are recovered locally by the relative-std clamp. Only
//! structural problems surface here, and the batch driver attaches the
//! offending cube identifier before reporting them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested pixel fraction is outside the half-open interval (0, 1].
    #[error("pixel fraction {0} is outside (0, 1]")]
    InvalidFraction(f64),

    /// The cube is not available from the cube source and could not be fetched.
    #[error("cube '{id}' not found")]
    CubeNotFound { id: String },

    /// Too few points to determine a smoothing-spline fit.
    #[error("spline fit needs at least {needed} points, got {got}")]
    InsufficientSamples { got: usize, needed: usize },
}

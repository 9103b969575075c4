//! Error types for stretch operations.
//!
//! Constructors validate eagerly and fail fast; calibration failures are
//! carried back to the caller as values so a pass can be retried with
//! adjusted constraints, and evaluation on a not-ready stretch is refused
//! rather than extrapolated.

use taut_math::MathError;
use thiserror::Error;

/// A specialized Result type for stretch operations.
pub type StretchResult<T> = Result<T, StretchError>;

/// Error types for stretch operations.
#[derive(Error, Debug, Clone)]
pub enum StretchError {
    /// Requested predictor ordinate is outside the stretch's knot span.
    #[error("Predictor {requested:.6} out of range [{min:.6}, {max:.6}]")]
    PredictorOutOfRange {
        /// The requested ordinate.
        requested: f64,
        /// Left-most knot.
        min: f64,
        /// Right-most knot.
        max: f64,
    },

    /// Knots are not strictly increasing.
    #[error("Non-monotonic knots at index {index}: {prev:.6} >= {current:.6}")]
    NonMonotonicKnots {
        /// Index where monotonicity breaks.
        index: usize,
        /// Previous knot value.
        prev: f64,
        /// Current knot value.
        current: f64,
    },

    /// Not enough knots to form a segment.
    #[error("Insufficient knots: need at least {required}, got {got}")]
    InsufficientKnots {
        /// Minimum required knots.
        required: usize,
        /// Actual number of knots provided.
        got: usize,
    },

    /// A segment's linear system could not be solved.
    #[error("Calibration failure at segment {segment}: {reason}")]
    CalibrationFailure {
        /// Index of the segment that failed.
        segment: usize,
        /// Description of the failure.
        reason: String,
    },

    /// The stretch has no successfully calibrated coefficients.
    #[error("Stretch is not calibrated; run a successful calibration pass before querying")]
    NotCalibrated,

    /// Invalid input argument.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Underlying mathematical error.
    #[error("Math error: {source}")]
    Math {
        /// The propagated math error.
        #[from]
        source: MathError,
    },
}

impl StretchError {
    /// Creates a predictor out of range error.
    #[must_use]
    pub fn predictor_out_of_range(requested: f64, min: f64, max: f64) -> Self {
        Self::PredictorOutOfRange {
            requested,
            min,
            max,
        }
    }

    /// Creates a non-monotonic knots error.
    #[must_use]
    pub fn non_monotonic_knots(index: usize, prev: f64, current: f64) -> Self {
        Self::NonMonotonicKnots {
            index,
            prev,
            current,
        }
    }

    /// Creates an insufficient knots error.
    #[must_use]
    pub fn insufficient_knots(required: usize, got: usize) -> Self {
        Self::InsufficientKnots { required, got }
    }

    /// Creates a calibration failure error.
    #[must_use]
    pub fn calibration_failure(segment: usize, reason: impl Into<String>) -> Self {
        Self::CalibrationFailure {
            segment,
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

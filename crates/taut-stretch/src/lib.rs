//! # Taut Stretch
//!
//! Multi-segment tension-spline calibration for the Taut fixed income
//! analytics library.
//!
//! A *stretch* is an ordered chain of spline segments sharing contiguous
//! knots. Each segment owns a basis-function set and a fitted coefficient
//! vector; calibration runs strictly left to right, propagating value and
//! derivative continuity across every shared knot, with the calibration
//! philosophy (constraint layout, boundary handling) supplied by a
//! pluggable [`SequenceBuilder`].
//!
//! This crate provides:
//!
//! - **Segments**: calibratable intervals with local basis representation
//! - **Constraints**: response-value constraints and best-fit weightings
//! - **Builders**: sequence-calibration strategies and the attach protocol
//! - **Stretch**: the top-level [`MultiSegmentSequence`] with global
//!   evaluate/derivative/integrate queries
//!
//! ## Quick Start
//!
//! ```rust
//! use taut_math::basis::BasisFamily;
//! use taut_stretch::prelude::*;
//!
//! // Interpolate discount-curve responses over three knots
//! let stretch = StretchBuilder::new(BasisFamily::HyperbolicTensionC2 { tension: 2.0 })
//!     .knots(vec![0.0, 1.0, 2.0])
//!     .values(vec![1.0, 0.96, 0.91])
//!     .left_slope(-0.04)
//!     .build()
//!     .unwrap();
//!
//! let df = stretch.response(1.5).unwrap();
//! assert!(df > 0.91 && df < 0.96);
//! ```
//!
//! Calibration of a sequence is an atomic, single-threaded pass; a failed
//! pass leaves the stretch refusing evaluation until a later pass
//! succeeds. Read-only queries on a calibrated stretch are safe from
//! multiple readers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod boundary;
pub mod builder;
pub mod constraint;
pub mod error;
pub mod segment;
pub mod stretch;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::boundary::BoundarySetting;
    pub use crate::builder::{
        CalibrationReport, CkSequenceBuilder, KnotAnchoredSequenceBuilder, SequenceBuilder,
    };
    pub use crate::constraint::{BestFitWeighting, ResponseValueConstraint};
    pub use crate::error::{StretchError, StretchResult};
    pub use crate::segment::Segment;
    pub use crate::stretch::{MultiSegmentSequence, StretchBuilder};
}

pub use error::{StretchError, StretchResult};
pub use stretch::{MultiSegmentSequence, StretchBuilder};

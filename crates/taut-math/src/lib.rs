//! # Taut Math
//!
//! Numerical substrate for the Taut tension-spline calibration library.
//!
//! This crate provides:
//!
//! - **Basis Functions**: Univariate basis-function families (polynomial,
//!   hyperbolic tension, reflection) and ordered basis sets
//! - **Linear Algebra**: Deterministic dense solves and constrained
//!   least-squares for segment calibration
//!
//! ## Design Philosophy
//!
//! - **Fail Fast**: Constructors validate eagerly; an object is never
//!   created in an invalid state
//! - **Numerical Stability**: Singular systems are reported, never
//!   silently returned as NaN
//! - **Generic Seams**: Basis families sit behind a trait so segment
//!   calibration is family-agnostic

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod basis;
pub mod error;
pub mod linear_algebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::basis::{
        BasisFamily, BasisFunction, BasisFunctionSet, HyperbolicTension, Monomial, Reflection,
    };
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{
        lu_decomposition, solve_constrained_least_squares, solve_linear_system,
    };
}

pub use error::{MathError, MathResult};

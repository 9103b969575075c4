//! Univariate basis functions for segment-local spline representation.
//!
//! A calibrated spline segment represents its response as a weighted sum
//! of basis functions evaluated in the segment's local coordinate
//! `x ∈ [0, 1]`. This module provides the basis families and the ordered
//! sets that fix coefficient indexing.
//!
//! # Available Families
//!
//! - [`Monomial`]: polynomial members `x^n`
//! - [`HyperbolicTension`]: the tension "psy" member
//!   `sinh(t·(1−x)) / sinh(t)`
//! - [`Reflection`]: wrapper evaluating an inner member at `1 − x`
//!
//! # Choosing a Family
//!
//! | Family | Smoothness | Shape control | Use case |
//! |--------|------------|---------------|----------|
//! | Polynomial | C∞ | None | Plain cubic-style segments |
//! | Hyperbolic tension | C∞ | Tension parameter | Oscillation damping near kinks |
//!
//! High tension pulls each segment towards its chord (a straight line);
//! low tension relaxes towards a smooth cubic-like curve.

mod polynomial;
mod reflection;
mod set;
mod tension;

pub use polynomial::Monomial;
pub use reflection::Reflection;
pub use set::{BasisFamily, BasisFunctionSet};
pub use tension::HyperbolicTension;

use crate::error::MathResult;

/// Trait for univariate basis functions.
///
/// Implementations are immutable function objects constructed once per
/// basis set. All entry points reject non-finite arguments so calibration
/// never assembles rows from NaN or infinity.
pub trait BasisFunction: Send + Sync {
    /// Returns the function value at `x`.
    fn evaluate(&self, x: f64) -> MathResult<f64>;

    /// Returns the `order`-th derivative at `x`.
    ///
    /// Order 0 is the function value itself.
    fn derivative(&self, x: f64, order: usize) -> MathResult<f64>;

    /// Returns the definite integral over `[a, b]`.
    fn integrate(&self, a: f64, b: f64) -> MathResult<f64>;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Validates that a basis-function argument is finite.
pub(crate) fn check_finite(value: f64, what: &str) -> MathResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(crate::error::MathError::invalid_input(format!(
            "{what} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_antiderivative(f: &dyn BasisFunction, a: f64, b: f64, name: &str) {
        // Finite-difference cross-check: d/db integrate(a, b) == evaluate(b)
        let h = 1e-6;
        let up = f.integrate(a, b + h).unwrap();
        let down = f.integrate(a, b - h).unwrap();
        let numerical = (up - down) / (2.0 * h);
        let analytical = f.evaluate(b).unwrap();

        assert!(
            (analytical - numerical).abs() < 1e-6,
            "{} antiderivative at b={}: analytical={}, numerical={}",
            name,
            b,
            analytical,
            numerical
        );
    }

    fn check_first_derivative(f: &dyn BasisFunction, x: f64, name: &str) {
        let h = 1e-6;
        let up = f.evaluate(x + h).unwrap();
        let down = f.evaluate(x - h).unwrap();
        let numerical = (up - down) / (2.0 * h);
        let analytical = f.derivative(x, 1).unwrap();

        assert!(
            (analytical - numerical).abs() < 1e-5,
            "{} derivative at x={}: analytical={}, numerical={}",
            name,
            x,
            analytical,
            numerical
        );
    }

    #[test]
    fn test_all_families_derivative_consistency() {
        let cubic = Monomial::new(3);
        check_first_derivative(&cubic, 0.4, "Monomial");

        let psy = HyperbolicTension::new(2.0).unwrap();
        check_first_derivative(&psy, 0.4, "HyperbolicTension");

        let mirrored = Reflection::of(HyperbolicTension::new(2.0).unwrap());
        check_first_derivative(&mirrored, 0.4, "Reflection");
    }

    #[test]
    fn test_all_families_antiderivative_consistency() {
        let quadratic = Monomial::new(2);
        check_antiderivative(&quadratic, 0.0, 0.7, "Monomial");

        let psy = HyperbolicTension::new(2.0).unwrap();
        check_antiderivative(&psy, 0.0, 0.7, "HyperbolicTension");

        let mirrored = Reflection::of(HyperbolicTension::new(2.0).unwrap());
        check_antiderivative(&mirrored, 0.1, 0.8, "Reflection");
    }

    #[test]
    fn test_non_finite_arguments_rejected() {
        let psy = HyperbolicTension::new(1.0).unwrap();
        assert!(psy.evaluate(f64::NAN).is_err());
        assert!(psy.derivative(f64::INFINITY, 1).is_err());
        assert!(psy.integrate(0.0, f64::NEG_INFINITY).is_err());

        let linear = Monomial::new(1);
        assert!(linear.evaluate(f64::NAN).is_err());
    }
}

//! Polynomial basis members.

use crate::basis::{check_finite, BasisFunction};
use crate::error::MathResult;

/// A single monomial basis member `x^n`.
///
/// Degree 0 is the constant function 1, degree 1 the identity, and so on.
/// Monomials up to degree `n - 1` form the standard polynomial basis of a
/// segment with `n` coefficients.
///
/// # Example
///
/// ```rust
/// use taut_math::basis::{BasisFunction, Monomial};
///
/// let quadratic = Monomial::new(2);
/// assert_eq!(quadratic.evaluate(3.0).unwrap(), 9.0);
/// assert_eq!(quadratic.derivative(3.0, 1).unwrap(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monomial {
    degree: u32,
}

impl Monomial {
    /// Creates the monomial `x^degree`.
    #[must_use]
    pub fn new(degree: u32) -> Self {
        Self { degree }
    }

    /// The constant member (degree 0).
    #[must_use]
    pub fn constant() -> Self {
        Self::new(0)
    }

    /// The linear member (degree 1).
    #[must_use]
    pub fn linear() -> Self {
        Self::new(1)
    }

    /// Returns the polynomial degree.
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Falling factorial `n · (n-1) · … · (n-k+1)` as f64.
    fn falling_factorial(n: u32, k: u32) -> f64 {
        (0..k).fold(1.0, |acc, i| acc * f64::from(n - i))
    }
}

impl BasisFunction for Monomial {
    fn evaluate(&self, x: f64) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        Ok(x.powi(self.degree as i32))
    }

    fn derivative(&self, x: f64, order: usize) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        if order == 0 {
            return self.evaluate(x);
        }
        let Ok(k) = u32::try_from(order) else {
            return Ok(0.0);
        };
        if k > self.degree {
            return Ok(0.0);
        }
        Ok(Self::falling_factorial(self.degree, k) * x.powi((self.degree - k) as i32))
    }

    fn integrate(&self, a: f64, b: f64) -> MathResult<f64> {
        check_finite(a, "lower bound")?;
        check_finite(b, "upper bound")?;
        let p = self.degree as i32 + 1;
        Ok((b.powi(p) - a.powi(p)) / f64::from(p))
    }

    fn name(&self) -> &'static str {
        "monomial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_member() {
        let one = Monomial::constant();
        assert_relative_eq!(one.evaluate(0.37).unwrap(), 1.0);
        assert_relative_eq!(one.derivative(0.37, 1).unwrap(), 0.0);
        assert_relative_eq!(one.integrate(0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_cubic_derivatives() {
        let cubic = Monomial::new(3);
        // d/dx x^3 = 3x^2, d2 = 6x, d3 = 6, d4 = 0
        assert_relative_eq!(cubic.derivative(2.0, 1).unwrap(), 12.0);
        assert_relative_eq!(cubic.derivative(2.0, 2).unwrap(), 12.0);
        assert_relative_eq!(cubic.derivative(2.0, 3).unwrap(), 6.0);
        assert_relative_eq!(cubic.derivative(2.0, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_integral() {
        let quadratic = Monomial::new(2);
        assert_relative_eq!(quadratic.integrate(0.0, 1.0).unwrap(), 1.0 / 3.0);
        // Orientation flips the sign
        assert_relative_eq!(quadratic.integrate(1.0, 0.0).unwrap(), -1.0 / 3.0);
    }
}

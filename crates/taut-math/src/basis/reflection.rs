//! Reflection wrapper over an inner basis member.

use crate::basis::{check_finite, BasisFunction};
use crate::error::MathResult;

/// Evaluates an inner basis function at the reflected ordinate `1 − x`.
///
/// Reflection is how the basis families stay small: the linear member
/// `1 − x` is the reflection of the identity, and the second tension hat
/// `sinh(t·x)/sinh(t)` is the reflection of the psy member. Derivatives
/// pick up a `(−1)^k` factor from the chain rule, and integration bounds
/// swap and reflect.
#[derive(Debug, Clone)]
pub struct Reflection<B> {
    inner: B,
}

impl<B: BasisFunction> Reflection<B> {
    /// Wraps `inner`, evaluating it at `1 − x`.
    #[must_use]
    pub fn of(inner: B) -> Self {
        Self { inner }
    }

    /// Returns the wrapped member.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: BasisFunction> BasisFunction for Reflection<B> {
    fn evaluate(&self, x: f64) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        self.inner.evaluate(1.0 - x)
    }

    fn derivative(&self, x: f64, order: usize) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        let sign = if order % 2 == 0 { 1.0 } else { -1.0 };
        Ok(sign * self.inner.derivative(1.0 - x, order)?)
    }

    fn integrate(&self, a: f64, b: f64) -> MathResult<f64> {
        check_finite(a, "lower bound")?;
        check_finite(b, "upper bound")?;
        // ∫_a^b f(1−x) dx = ∫_{1−b}^{1−a} f(u) du
        self.inner.integrate(1.0 - b, 1.0 - a)
    }

    fn name(&self) -> &'static str {
        "reflection"
    }
}

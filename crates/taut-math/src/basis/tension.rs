//! Hyperbolic-tension basis member.

use crate::basis::{check_finite, BasisFunction};
use crate::error::{MathError, MathResult};

/// Tensions at or above this overflow `sinh` in f64 arithmetic.
const MAX_TENSION: f64 = 700.0;

/// Validates a tension parameter for the hyperbolic family.
///
/// The family divides by `sinh(t)`, so `t = 0` is singular; the zero-tension
/// limit degenerates onto the linear members and is rejected outright rather
/// than special-cased. Market calibrations use tensions of order one.
pub(crate) fn check_tension(tension: f64) -> MathResult<()> {
    if !tension.is_finite() || tension <= 0.0 || tension >= MAX_TENSION {
        return Err(MathError::invalid_tension(tension));
    }
    Ok(())
}

/// The hyperbolic-tension "psy" basis member.
///
/// Parameterized by tension `t > 0` over the segment-local coordinate:
///
/// ```text
/// ψ(x) = sinh(t·(1−x)) / sinh(t)
/// ```
///
/// so `ψ(0) = 1` and `ψ(1) = 0`. Together with its reflection
/// `ψ(1−x) = sinh(t·x)/sinh(t)` it forms the two tension-responsive "hat"
/// members of the C2 tension basis; as `t` grows the pair collapses onto
/// the segment chord, damping spline oscillation.
///
/// Derivatives alternate between the sinh and cosh kernels:
///
/// ```text
/// ψ⁽ᵏ⁾(x) = (−t)^k · sinh(t·(1−x)) / sinh(t)    (k even)
/// ψ⁽ᵏ⁾(x) = (−t)^k · cosh(t·(1−x)) / sinh(t)    (k odd)
/// ```
///
/// so even orders reproduce the tension-squared identity
/// `ψ''(x) = t²·ψ(x)` used by C2 calibration.
///
/// # Example
///
/// ```rust
/// use taut_math::basis::{BasisFunction, HyperbolicTension};
///
/// let psy = HyperbolicTension::new(2.0).unwrap();
/// assert!((psy.evaluate(0.0).unwrap() - 1.0).abs() < 1e-12);
/// assert!(psy.evaluate(1.0).unwrap().abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperbolicTension {
    tension: f64,
    /// Cached sinh(t); nonzero by construction.
    sinh_t: f64,
}

impl HyperbolicTension {
    /// Creates the psy member for the given tension.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InvalidTension`] when `tension` is non-finite,
    /// non-positive, or large enough to overflow `sinh`.
    pub fn new(tension: f64) -> MathResult<Self> {
        check_tension(tension)?;
        Ok(Self {
            tension,
            sinh_t: tension.sinh(),
        })
    }

    /// Returns the tension parameter.
    pub fn tension(&self) -> f64 {
        self.tension
    }
}

impl BasisFunction for HyperbolicTension {
    fn evaluate(&self, x: f64) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        Ok((self.tension * (1.0 - x)).sinh() / self.sinh_t)
    }

    fn derivative(&self, x: f64, order: usize) -> MathResult<f64> {
        check_finite(x, "predictor")?;
        let arg = self.tension * (1.0 - x);
        let kernel = if order % 2 == 0 { arg.sinh() } else { arg.cosh() };
        Ok((-self.tension).powi(order as i32) * kernel / self.sinh_t)
    }

    fn integrate(&self, a: f64, b: f64) -> MathResult<f64> {
        check_finite(a, "lower bound")?;
        check_finite(b, "upper bound")?;
        let t = self.tension;
        Ok(-((t * (1.0 - b)).cosh() - (t * (1.0 - a)).cosh()) / (t * self.sinh_t))
    }

    fn name(&self) -> &'static str {
        "hyperbolic-tension"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_boundary_values() {
        for tension in [0.1, 1.0, 2.0, 10.0] {
            let psy = HyperbolicTension::new(tension).unwrap();
            assert_relative_eq!(psy.evaluate(0.0).unwrap(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(psy.evaluate(1.0).unwrap(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_midpoint_value() {
        // evaluate(0.5) = sinh(t/2) / sinh(t)
        let psy = HyperbolicTension::new(2.0).unwrap();
        let expected = 1.0_f64.sinh() / 2.0_f64.sinh();
        assert_relative_eq!(psy.evaluate(0.5).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_second_derivative_identity() {
        // ψ'' = t² ψ everywhere, not only at the boundary
        let psy = HyperbolicTension::new(2.0).unwrap();
        for x in [0.0, 0.25, 0.5, 1.0] {
            let d2 = psy.derivative(x, 2).unwrap();
            let v = psy.evaluate(x).unwrap();
            assert_relative_eq!(d2, 4.0 * v, epsilon = 1e-10);
        }
        assert_relative_eq!(psy.derivative(0.0, 2).unwrap(), 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_first_derivative_is_cosh_kernel() {
        let t = 1.5;
        let psy = HyperbolicTension::new(t).unwrap();
        let x = 0.3;
        let expected = -t * (t * (1.0 - x)).cosh() / t.sinh();
        assert_relative_eq!(psy.derivative(x, 1).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_closed_form() {
        let t = 2.0;
        let psy = HyperbolicTension::new(t).unwrap();
        let (a, b) = (0.0, 1.0);
        let expected = -((t * (1.0 - b)).cosh() - (t * (1.0 - a)).cosh()) / (t * t.sinh());
        assert_relative_eq!(psy.integrate(a, b).unwrap(), expected, epsilon = 1e-12);
        // cosh(0) = 1, so over [0, 1] this is (cosh(t) - 1) / (t sinh(t))
        assert_relative_eq!(
            psy.integrate(0.0, 1.0).unwrap(),
            (t.cosh() - 1.0) / (t * t.sinh()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_tension_rejected() {
        assert!(HyperbolicTension::new(0.0).is_err());
        assert!(HyperbolicTension::new(-1.0).is_err());
        assert!(HyperbolicTension::new(f64::NAN).is_err());
        assert!(HyperbolicTension::new(f64::INFINITY).is_err());
        assert!(HyperbolicTension::new(800.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_bounded_on_unit_interval(
            tension in 0.01f64..50.0,
            x in 0.0f64..=1.0,
        ) {
            let psy = HyperbolicTension::new(tension).unwrap();
            let v = psy.evaluate(x).unwrap();
            prop_assert!(v.is_finite());
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&v));
        }

        #[test]
        fn prop_integral_antisymmetry(
            tension in 0.01f64..50.0,
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let psy = HyperbolicTension::new(tension).unwrap();
            let forward = psy.integrate(a, b).unwrap();
            let backward = psy.integrate(b, a).unwrap();
            prop_assert!((forward + backward).abs() < 1e-12);
        }
    }
}

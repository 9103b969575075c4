//! Ordered basis sets and the family configuration enum.

use serde::{Deserialize, Serialize};

use crate::basis::tension::check_tension;
use crate::basis::{BasisFunction, HyperbolicTension, Monomial, Reflection};
use crate::error::{MathError, MathResult};

/// An ordered collection of basis functions spanning one segment.
///
/// Order matters: coefficient `k` of a calibrated segment multiplies
/// member `k` of its set. Sets are non-empty by construction and immutable
/// thereafter.
pub struct BasisFunctionSet {
    functions: Vec<Box<dyn BasisFunction>>,
    tension: Option<f64>,
}

impl std::fmt::Debug for BasisFunctionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasisFunctionSet")
            .field("members", &self.functions.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("tension", &self.tension)
            .finish()
    }
}

impl BasisFunctionSet {
    /// Creates a set from an ordered list of members.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty.
    pub fn new(functions: Vec<Box<dyn BasisFunction>>) -> MathResult<Self> {
        if functions.is_empty() {
            return Err(MathError::invalid_input("Basis set must be non-empty"));
        }
        Ok(Self {
            functions,
            tension: None,
        })
    }

    /// Creates the 4-member C2 tension set from a tension and its two
    /// tension-responsive "hat" members.
    ///
    /// The ordered members are the constant, the linear reflection `1 − x`,
    /// then `hats[0]` and `hats[1]`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InvalidTension`] for a non-finite or
    /// non-positive tension, and [`MathError::InvalidInput`] unless exactly
    /// two hats are supplied.
    pub fn tension_c2(
        tension: f64,
        hats: Vec<Box<dyn BasisFunction>>,
    ) -> MathResult<Self> {
        check_tension(tension)?;
        if hats.len() != 2 {
            return Err(MathError::invalid_input(format!(
                "C2 tension set needs exactly 2 hat members, got {}",
                hats.len()
            )));
        }

        let mut functions: Vec<Box<dyn BasisFunction>> = vec![
            Box::new(Monomial::constant()),
            Box::new(Reflection::of(Monomial::linear())),
        ];
        functions.extend(hats);

        Ok(Self {
            functions,
            tension: Some(tension),
        })
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if the set has no members (never, by construction).
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns the ordered members.
    pub fn functions(&self) -> &[Box<dyn BasisFunction>] {
        &self.functions
    }

    /// Returns the tension parameter for tension-family sets.
    pub fn tension(&self) -> Option<f64> {
        self.tension
    }

    /// Evaluates every member at `x`, in coefficient order.
    ///
    /// This is the row-assembly primitive of segment calibration: one call
    /// per condition ordinate.
    pub fn evaluate_all(&self, x: f64) -> MathResult<Vec<f64>> {
        self.functions.iter().map(|b| b.evaluate(x)).collect()
    }

    /// Evaluates the `order`-th derivative of every member at `x`.
    pub fn derivative_all(&self, x: f64, order: usize) -> MathResult<Vec<f64>> {
        self.functions.iter().map(|b| b.derivative(x, order)).collect()
    }

    /// Integrates every member over `[a, b]`.
    pub fn integrate_all(&self, a: f64, b: f64) -> MathResult<Vec<f64>> {
        self.functions.iter().map(|f| f.integrate(a, b)).collect()
    }
}

/// Basis family configuration for segment construction.
///
/// Plays the same role as an interpolation-method selector on a curve
/// builder: a plain value describing which concrete basis set each segment
/// receives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BasisFamily {
    /// The 4-member C2 hyperbolic-tension set
    /// {1, 1−x, ψ(x), ψ(1−x)} for tension `t > 0`.
    HyperbolicTensionC2 {
        /// Tension parameter; higher values pull segments towards chords.
        tension: f64,
    },

    /// The polynomial set {1, x, …, x^(n−1)} with `num_basis = n ≥ 2`.
    Polynomial {
        /// Number of members (one coefficient each).
        num_basis: usize,
    },
}

impl BasisFamily {
    /// Returns the number of members a built set will have.
    #[must_use]
    pub fn num_basis(&self) -> usize {
        match self {
            Self::HyperbolicTensionC2 { .. } => 4,
            Self::Polynomial { num_basis } => *num_basis,
        }
    }

    /// Returns true for tension-parameterized families.
    #[must_use]
    pub fn is_tension(&self) -> bool {
        matches!(self, Self::HyperbolicTensionC2 { .. })
    }

    /// Returns the tension parameter, if the family carries one.
    #[must_use]
    pub fn tension(&self) -> Option<f64> {
        match self {
            Self::HyperbolicTensionC2 { tension } => Some(*tension),
            Self::Polynomial { .. } => None,
        }
    }

    /// Builds a fresh basis set for one segment.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InvalidTension`] for an out-of-range tension
    /// and [`MathError::InsufficientData`] for a polynomial family with
    /// fewer than two members.
    pub fn build(&self) -> MathResult<BasisFunctionSet> {
        match self {
            Self::HyperbolicTensionC2 { tension } => {
                let psy = HyperbolicTension::new(*tension)?;
                let hats: Vec<Box<dyn BasisFunction>> =
                    vec![Box::new(psy), Box::new(Reflection::of(psy))];
                BasisFunctionSet::tension_c2(*tension, hats)
            }
            Self::Polynomial { num_basis } => {
                if *num_basis < 2 {
                    return Err(MathError::insufficient_data(2, *num_basis));
                }
                let members: Vec<Box<dyn BasisFunction>> = (0..*num_basis)
                    .map(|degree| {
                        Box::new(Monomial::new(degree as u32)) as Box<dyn BasisFunction>
                    })
                    .collect();
                BasisFunctionSet::new(members)
            }
        }
    }
}

impl std::fmt::Display for BasisFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HyperbolicTensionC2 { tension } => {
                write!(f, "Hyperbolic Tension C2 (t={tension})")
            }
            Self::Polynomial { num_basis } => write!(f, "Polynomial ({num_basis} members)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tension_c2_set_shape() {
        let set = BasisFamily::HyperbolicTensionC2 { tension: 2.0 }
            .build()
            .unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.tension(), Some(2.0));

        // Member order: constant, 1−x, ψ, reflected ψ
        let at_zero = set.evaluate_all(0.0).unwrap();
        assert_relative_eq!(at_zero[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(at_zero[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(at_zero[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(at_zero[3], 0.0, epsilon = 1e-12);

        let at_one = set.evaluate_all(1.0).unwrap();
        assert_relative_eq!(at_one[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(at_one[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(at_one[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tension_c2_hat_count_enforced() {
        let one_hat: Vec<Box<dyn BasisFunction>> =
            vec![Box::new(HyperbolicTension::new(1.0).unwrap())];
        assert!(BasisFunctionSet::tension_c2(1.0, one_hat).is_err());

        let three: Vec<Box<dyn BasisFunction>> = (0..3)
            .map(|_| Box::new(HyperbolicTension::new(1.0).unwrap()) as Box<dyn BasisFunction>)
            .collect();
        assert!(BasisFunctionSet::tension_c2(1.0, three).is_err());
    }

    #[test]
    fn test_tension_c2_rejects_bad_tension() {
        assert!(BasisFamily::HyperbolicTensionC2 { tension: 0.0 }.build().is_err());
        assert!(BasisFamily::HyperbolicTensionC2 { tension: f64::NAN }.build().is_err());
    }

    #[test]
    fn test_polynomial_family() {
        let family = BasisFamily::Polynomial { num_basis: 4 };
        let set = family.build().unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.tension(), None);

        // {1, x, x², x³} at x = 2
        let row = set.evaluate_all(2.0).unwrap();
        assert_eq!(row, vec![1.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn test_polynomial_needs_two_members() {
        assert!(BasisFamily::Polynomial { num_basis: 1 }.build().is_err());
        assert!(BasisFamily::Polynomial { num_basis: 0 }.build().is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(BasisFunctionSet::new(Vec::new()).is_err());
    }

    #[test]
    fn test_family_display() {
        let family = BasisFamily::HyperbolicTensionC2 { tension: 2.0 };
        assert!(family.to_string().contains("t=2"));
        assert_eq!(family.num_basis(), 4);
        assert!(family.is_tension());
    }
}

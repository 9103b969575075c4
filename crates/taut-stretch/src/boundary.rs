//! Boundary settings for the starting segment of a calibration pass.

use serde::{Deserialize, Serialize};

/// Boundary condition applied at the left extreme of a stretch.
///
/// Sequential left-to-right calibration pins every condition at the left
/// extreme of the starting segment; settings that would couple the far
/// (right) extreme back into earlier segments are not expressible without
/// relaxing the continuity contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum BoundarySetting {
    /// Zero second derivative at the left extreme.
    #[default]
    Natural,

    /// Curvature matched to the hyperbolic roll-off of the supplied market
    /// slope: `H''(left) = −t · leftSlope` for tension `t`. Collapses to
    /// [`Natural`](Self::Natural) for tension-free basis families.
    FinancialMatchedSlope,

    /// Explicit derivative pin `H^(order)(left) = value`, with
    /// `order >= 2`; orders 0 and 1 are owned by the leading constraint
    /// and the left slope.
    Prescribed {
        /// Derivative order to pin.
        order: usize,
        /// Pinned derivative value.
        value: f64,
    },
}

impl BoundarySetting {
    /// Returns true if the setting depends on the basis family's tension.
    #[must_use]
    pub fn is_tension_dependent(&self) -> bool {
        matches!(self, Self::FinancialMatchedSlope)
    }
}

impl std::fmt::Display for BoundarySetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Natural => write!(f, "Natural"),
            Self::FinancialMatchedSlope => write!(f, "Financial (matched slope)"),
            Self::Prescribed { order, value } => {
                write!(f, "Prescribed (order {order} = {value})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_natural() {
        assert_eq!(BoundarySetting::default(), BoundarySetting::Natural);
    }

    #[test]
    fn test_display() {
        assert_eq!(BoundarySetting::Natural.to_string(), "Natural");
        let pinned = BoundarySetting::Prescribed {
            order: 2,
            value: 0.5,
        };
        assert!(pinned.to_string().contains("order 2"));
    }
}

//! Calibratable spline segments.
//!
//! A segment spans one knot interval `[left, right]` and represents its
//! response as a weighted sum of basis functions over the local coordinate
//! `u = (x − left) / (right − left)`. Calibration assembles one linear row
//! per continuity or constraint condition and solves for the coefficient
//! vector; evaluation maps back through the chain rule, so derivative
//! conditions are always expressed in global (predictor-space) units.

use nalgebra::{DMatrix, DVector};

use taut_math::basis::BasisFunctionSet;
use taut_math::linear_algebra::{solve_constrained_least_squares, solve_linear_system};

use crate::boundary::BoundarySetting;
use crate::constraint::{BestFitWeighting, ResponseValueConstraint};
use crate::error::{StretchError, StretchResult};

/// One linear calibration condition over the coefficient vector.
struct ConditionRow {
    coefficients: Vec<f64>,
    target: f64,
}

/// One calibratable interval of a multi-segment stretch.
///
/// Owns its basis set and coefficient vector. The coefficient vector is
/// empty until the first successful calibration and is replaced atomically:
/// a failed calibration leaves previously fitted coefficients untouched.
pub struct Segment {
    left: f64,
    right: f64,
    basis: BasisFunctionSet,
    coefficients: Vec<f64>,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("basis", &self.basis)
            .field("calibrated", &self.is_calibrated())
            .finish()
    }
}

impl Segment {
    /// Creates an uncalibrated segment over `[left, right]`.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::InvalidInput`] unless both knots are finite
    /// and `left < right`.
    pub fn new(left: f64, right: f64, basis: BasisFunctionSet) -> StretchResult<Self> {
        if !left.is_finite() || !right.is_finite() {
            return Err(StretchError::invalid_input(format!(
                "Segment knots must be finite, got [{left}, {right}]"
            )));
        }
        if left >= right {
            return Err(StretchError::invalid_input(format!(
                "Segment left knot {left} must be below right knot {right}"
            )));
        }
        Ok(Self {
            left,
            right,
            basis,
            coefficients: Vec::new(),
        })
    }

    /// Returns the left knot.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Returns the right knot.
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Returns the knot-interval width.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Returns the segment's basis set.
    pub fn basis(&self) -> &BasisFunctionSet {
        &self.basis
    }

    /// Returns the fitted coefficients (empty before calibration).
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Returns true once a calibration pass has succeeded.
    pub fn is_calibrated(&self) -> bool {
        !self.coefficients.is_empty()
    }

    /// Returns true if `x` lies within `[left, right]`.
    pub fn in_range(&self, x: f64) -> bool {
        x >= self.left && x <= self.right
    }

    /// Maps a global ordinate into the local coordinate `[0, 1]`.
    fn localize(&self, x: f64) -> StretchResult<f64> {
        if !x.is_finite() {
            return Err(StretchError::invalid_input(format!(
                "Predictor must be finite, got {x}"
            )));
        }
        if !self.in_range(x) {
            return Err(StretchError::predictor_out_of_range(
                x, self.left, self.right,
            ));
        }
        Ok((x - self.left) / self.width())
    }

    /// Returns the fitted response at `x`.
    pub fn response(&self, x: f64) -> StretchResult<f64> {
        self.response_derivative(x, 0)
    }

    /// Returns the `order`-th derivative of the fitted response at `x`.
    pub fn response_derivative(&self, x: f64, order: usize) -> StretchResult<f64> {
        if !self.is_calibrated() {
            return Err(StretchError::NotCalibrated);
        }
        let u = self.localize(x)?;
        let row = self.global_derivative_row(u, order)?;
        Ok(dot(&self.coefficients, &row))
    }

    /// Integrates the fitted response over `[a, b]` (both within range).
    pub fn integrate(&self, a: f64, b: f64) -> StretchResult<f64> {
        if !self.is_calibrated() {
            return Err(StretchError::NotCalibrated);
        }
        let ua = self.localize(a)?;
        let ub = self.localize(b)?;
        let members = self.basis.integrate_all(ua, ub)?;
        Ok(self.width() * dot(&self.coefficients, &members))
    }

    /// Basis derivative row at local `u`, rescaled to global units.
    fn global_derivative_row(&self, u: f64, order: usize) -> StretchResult<Vec<f64>> {
        let mut row = self.basis.derivative_all(u, order)?;
        let scale = self.width().powi(order as i32).recip();
        for entry in &mut row {
            *entry *= scale;
        }
        Ok(row)
    }

    /// Builds the row for a response-value constraint whose ordinates must
    /// all fall inside this segment.
    fn constraint_row(&self, constraint: &ResponseValueConstraint) -> StretchResult<ConditionRow> {
        let mut coefficients = vec![0.0; self.basis.len()];
        for (&x, &w) in constraint.ordinates().iter().zip(constraint.weights()) {
            let u = self.localize(x)?;
            let member_row = self.global_derivative_row(u, constraint.derivative_order())?;
            for (acc, m) in coefficients.iter_mut().zip(&member_row) {
                *acc += w * m;
            }
        }
        Ok(ConditionRow {
            coefficients,
            target: constraint.value(),
        })
    }

    /// Continuity rows matching this segment's head to the previous
    /// segment's tail, up to derivative order `ck`.
    fn continuity_rows(&self, previous: &Segment, ck: usize) -> StretchResult<Vec<ConditionRow>> {
        let mut rows = Vec::with_capacity(ck + 1);
        for order in 0..=ck {
            rows.push(ConditionRow {
                coefficients: self.global_derivative_row(0.0, order)?,
                target: previous.response_derivative(previous.right, order)?,
            });
        }
        Ok(rows)
    }

    /// Calibrates the starting segment of a sequence.
    ///
    /// Head conditions: the leading constraint (response anchor at the
    /// left extreme), the left-boundary slope, then one condition per
    /// remaining continuity order supplied by the boundary setting. The
    /// segment's own constraint pins the tail exactly, or joins the
    /// best-fit residual when a weighting is present.
    pub fn calibrate_leading(
        &mut self,
        leading: Option<&ResponseValueConstraint>,
        left_slope: f64,
        boundary: BoundarySetting,
        constraint: Option<&ResponseValueConstraint>,
        best_fit: Option<&BestFitWeighting>,
    ) -> StretchResult<()> {
        if !left_slope.is_finite() {
            return Err(StretchError::invalid_input(format!(
                "Left slope must be finite, got {left_slope}"
            )));
        }

        let n = self.basis.len();
        let ck = n.saturating_sub(2);
        let mut hard = Vec::with_capacity(n);

        if let Some(leading) = leading {
            hard.push(self.constraint_row(leading)?);
        }

        if ck >= 1 {
            hard.push(ConditionRow {
                coefficients: self.global_derivative_row(0.0, 1)?,
                target: left_slope,
            });
        }

        for order in 2..=ck {
            hard.push(ConditionRow {
                coefficients: self.global_derivative_row(0.0, order)?,
                target: self.boundary_target(boundary, order, left_slope)?,
            });
        }

        self.solve(hard, constraint, best_fit)
    }

    /// Calibrates this segment against its already-calibrated predecessor.
    ///
    /// Inherits value and derivative continuity up to order
    /// `num_basis − 2` at the shared knot, then resolves the remaining
    /// freedom from the segment's own constraint or best-fit weighting.
    pub fn calibrate_onward(
        &mut self,
        previous: &Segment,
        constraint: Option<&ResponseValueConstraint>,
        best_fit: Option<&BestFitWeighting>,
    ) -> StretchResult<()> {
        let n = self.basis.len();
        let hard = self.continuity_rows(previous, n.saturating_sub(2))?;
        self.solve(hard, constraint, best_fit)
    }

    /// Supplementary head-condition target for `order >= 2`.
    fn boundary_target(
        &self,
        boundary: BoundarySetting,
        order: usize,
        left_slope: f64,
    ) -> StretchResult<f64> {
        match boundary {
            BoundarySetting::Natural => Ok(0.0),
            BoundarySetting::FinancialMatchedSlope => {
                if order == 2 {
                    let tension = self.basis.tension().unwrap_or(0.0);
                    Ok(-tension * left_slope)
                } else {
                    Ok(0.0)
                }
            }
            BoundarySetting::Prescribed {
                order: pinned_order,
                value,
            } => {
                if pinned_order < 2 || pinned_order > self.basis.len().saturating_sub(2) {
                    return Err(StretchError::invalid_input(format!(
                        "Prescribed boundary order {pinned_order} outside calibratable range"
                    )));
                }
                Ok(if order == pinned_order { value } else { 0.0 })
            }
        }
    }

    /// Solves the assembled system and installs coefficients on success.
    fn solve(
        &mut self,
        hard: Vec<ConditionRow>,
        constraint: Option<&ResponseValueConstraint>,
        best_fit: Option<&BestFitWeighting>,
    ) -> StretchResult<()> {
        let n = self.basis.len();

        let fitted = if let Some(best_fit) = best_fit {
            self.solve_best_fit(&hard, constraint, best_fit)?
        } else {
            let mut rows = hard;
            if let Some(constraint) = constraint {
                rows.push(self.constraint_row(constraint)?);
            }
            if rows.len() != n {
                return Err(StretchError::invalid_input(format!(
                    "Segment system has {} conditions for {} coefficients",
                    rows.len(),
                    n
                )));
            }
            let a = DMatrix::from_fn(n, n, |i, j| rows[i].coefficients[j]);
            let b = DVector::from_fn(n, |i, _| rows[i].target);
            solve_linear_system(&a, &b)?
        };

        log::trace!(
            "segment [{}, {}] calibrated with {} coefficients",
            self.left,
            self.right,
            n
        );
        self.coefficients = fitted.iter().copied().collect();
        Ok(())
    }

    /// Constrained least-squares path: hard rows stay exact, the best-fit
    /// observations (and the segment constraint, when present) form the
    /// weighted residual.
    fn solve_best_fit(
        &self,
        hard: &[ConditionRow],
        constraint: Option<&ResponseValueConstraint>,
        best_fit: &BestFitWeighting,
    ) -> StretchResult<DVector<f64>> {
        let n = self.basis.len();

        let mut residual_rows: Vec<ConditionRow> = Vec::with_capacity(best_fit.len() + 1);
        let mut weights: Vec<f64> = Vec::with_capacity(best_fit.len() + 1);

        for ((&x, &y), &w) in best_fit
            .ordinates()
            .iter()
            .zip(best_fit.responses())
            .zip(best_fit.weights())
        {
            let u = self.localize(x)?;
            residual_rows.push(ConditionRow {
                coefficients: self.basis.evaluate_all(u)?,
                target: y,
            });
            weights.push(w);
        }

        if let Some(constraint) = constraint {
            residual_rows.push(self.constraint_row(constraint)?);
            weights.push(1.0);
        }

        let m = residual_rows.len();
        let a = DMatrix::from_fn(m, n, |i, j| residual_rows[i].coefficients[j]);
        let y = DVector::from_fn(m, |i, _| residual_rows[i].target);
        let c = DMatrix::from_fn(hard.len(), n, |i, j| hard[i].coefficients[j]);
        let d = DVector::from_fn(hard.len(), |i, _| hard[i].target);

        Ok(solve_constrained_least_squares(&a, &y, &weights, &c, &d)?)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use taut_math::basis::BasisFamily;

    fn tension_segment(left: f64, right: f64) -> Segment {
        let basis = BasisFamily::HyperbolicTensionC2 { tension: 2.0 }
            .build()
            .unwrap();
        Segment::new(left, right, basis).unwrap()
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let basis = BasisFamily::Polynomial { num_basis: 4 }.build().unwrap();
        assert!(Segment::new(1.0, 1.0, basis).is_err());

        let basis = BasisFamily::Polynomial { num_basis: 4 }.build().unwrap();
        assert!(Segment::new(2.0, 1.0, basis).is_err());

        let basis = BasisFamily::Polynomial { num_basis: 4 }.build().unwrap();
        assert!(Segment::new(f64::NAN, 1.0, basis).is_err());
    }

    #[test]
    fn test_uncalibrated_segment_refuses_queries() {
        let seg = tension_segment(0.0, 1.0);
        assert!(matches!(
            seg.response(0.5),
            Err(StretchError::NotCalibrated)
        ));
        assert!(seg.integrate(0.0, 1.0).is_err());
    }

    #[test]
    fn test_leading_calibration_hits_anchors() {
        let mut seg = tension_segment(0.0, 2.0);
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        let tail = ResponseValueConstraint::at(2.0, 0.9).unwrap();

        seg.calibrate_leading(
            Some(&leading),
            -0.04,
            BoundarySetting::Natural,
            Some(&tail),
            None,
        )
        .unwrap();

        assert_relative_eq!(seg.response(0.0).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(seg.response(2.0).unwrap(), 0.9, epsilon = 1e-10);
        assert_relative_eq!(seg.response_derivative(0.0, 1).unwrap(), -0.04, epsilon = 1e-9);
        // Natural boundary: zero curvature at the left extreme
        assert_relative_eq!(seg.response_derivative(0.0, 2).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_onward_calibration_inherits_continuity() {
        let mut first = tension_segment(0.0, 1.0);
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        let mid = ResponseValueConstraint::at(1.0, 0.96).unwrap();
        first
            .calibrate_leading(Some(&leading), -0.05, BoundarySetting::Natural, Some(&mid), None)
            .unwrap();

        let mut second = tension_segment(1.0, 2.0);
        let tail = ResponseValueConstraint::at(2.0, 0.91).unwrap();
        second.calibrate_onward(&first, Some(&tail), None).unwrap();

        for order in 0..=2 {
            assert_relative_eq!(
                second.response_derivative(1.0, order).unwrap(),
                first.response_derivative(1.0, order).unwrap(),
                epsilon = 1e-8
            );
        }
        assert_relative_eq!(second.response(2.0).unwrap(), 0.91, epsilon = 1e-10);
    }

    #[test]
    fn test_failed_calibration_keeps_previous_coefficients() {
        let mut seg = tension_segment(0.0, 1.0);
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        let tail = ResponseValueConstraint::at(1.0, 0.95).unwrap();
        seg.calibrate_leading(Some(&leading), -0.04, BoundarySetting::Natural, Some(&tail), None)
            .unwrap();
        let before = seg.coefficients().to_vec();

        // Under-determined follow-up pass: no tail condition at all
        let result =
            seg.calibrate_leading(Some(&leading), -0.04, BoundarySetting::Natural, None, None);
        assert!(result.is_err());
        assert_eq!(seg.coefficients(), before.as_slice());
    }

    #[test]
    fn test_constraint_outside_segment_rejected() {
        let mut seg = tension_segment(0.0, 1.0);
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        let outside = ResponseValueConstraint::at(5.0, 0.5).unwrap();

        assert!(seg
            .calibrate_leading(
                Some(&leading),
                0.0,
                BoundarySetting::Natural,
                Some(&outside),
                None
            )
            .is_err());
    }

    #[test]
    fn test_best_fit_calibration_balances_observations() {
        let mut seg = tension_segment(0.0, 1.0);
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        // Observations pulled off any exact spline solution
        let cloud = BestFitWeighting::uniform(
            vec![0.25, 0.5, 0.75, 1.0],
            vec![0.99, 0.975, 0.962, 0.95],
        )
        .unwrap();

        seg.calibrate_leading(Some(&leading), -0.05, BoundarySetting::Natural, None, Some(&cloud))
            .unwrap();

        // Hard conditions still hold exactly
        assert_relative_eq!(seg.response(0.0).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(seg.response_derivative(0.0, 1).unwrap(), -0.05, epsilon = 1e-9);

        // The fit stays close to the observation cloud
        let fitted = seg.response(0.5).unwrap();
        assert!((fitted - 0.975).abs() < 0.01);
    }

    #[test]
    fn test_polynomial_segment_reproduces_cubic() {
        // A cubic basis must recover an exact cubic through its conditions
        let basis = BasisFamily::Polynomial { num_basis: 4 }.build().unwrap();
        let mut seg = Segment::new(0.0, 1.0, basis).unwrap();
        // Target: f(x) = 1 + x over the segment (slope 1, zero curvature)
        let leading = ResponseValueConstraint::at(0.0, 1.0).unwrap();
        let tail = ResponseValueConstraint::at(1.0, 2.0).unwrap();
        seg.calibrate_leading(Some(&leading), 1.0, BoundarySetting::Natural, Some(&tail), None)
            .unwrap();

        assert_relative_eq!(seg.response(0.3).unwrap(), 1.3, epsilon = 1e-9);
        assert_relative_eq!(seg.integrate(0.0, 1.0).unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_scaling_on_wide_segment() {
        // Width 4: global slope must come back in global units
        let basis = BasisFamily::Polynomial { num_basis: 4 }.build().unwrap();
        let mut seg = Segment::new(0.0, 4.0, basis).unwrap();
        let leading = ResponseValueConstraint::at(0.0, 0.0).unwrap();
        let tail = ResponseValueConstraint::at(4.0, 8.0).unwrap();
        // f(x) = 2x: slope 2 everywhere
        seg.calibrate_leading(Some(&leading), 2.0, BoundarySetting::Natural, Some(&tail), None)
            .unwrap();

        assert_relative_eq!(seg.response_derivative(2.0, 1).unwrap(), 2.0, epsilon = 1e-9);
    }
}

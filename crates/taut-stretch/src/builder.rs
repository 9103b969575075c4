//! Sequence-calibration strategies.
//!
//! A [`SequenceBuilder`] decides how a stretch is calibrated: where the
//! leading anchor comes from, which constraint and best-fit weighting each
//! segment receives, and which boundary condition seeds the starting
//! segment. The walk itself is always the same strict left-to-right fold —
//! each segment's fit depends on the previously calibrated segment's value
//! and derivatives at the shared knot, so there is no out-of-order or
//! parallel calibration.
//!
//! Builders are transient strategy objects: [`SequenceBuilder::attach`]
//! borrows the target sequence for the duration of one calibration pass
//! and returns an [`AttachedBuilder`] driving the two-phase protocol
//! (starting segment, then the remaining sequence).

use crate::boundary::BoundarySetting;
use crate::constraint::{BestFitWeighting, ResponseValueConstraint};
use crate::error::{StretchError, StretchResult};
use crate::stretch::MultiSegmentSequence;

/// Calibration strategy for a multi-segment sequence.
///
/// Implementations supply the constraint layout; the provided
/// [`calibrate`](SequenceBuilder::calibrate) drives the standard two-phase
/// protocol and can be overridden by strategies with a different
/// calibration philosophy.
pub trait SequenceBuilder {
    /// Boundary condition for the starting segment.
    fn boundary(&self) -> BoundarySetting {
        BoundarySetting::Natural
    }

    /// The leading constraint anchoring the left extreme, if any.
    fn leading_constraint(&self) -> Option<&ResponseValueConstraint>;

    /// The constraint assigned to segment `index`, if any.
    fn segment_constraint(&self, index: usize) -> Option<&ResponseValueConstraint>;

    /// The best-fit weighting assigned to segment `index`, if any.
    fn segment_best_fit(&self, index: usize) -> Option<&BestFitWeighting> {
        let _ = index;
        None
    }

    /// Binds this builder to a sequence for one calibration pass.
    ///
    /// The returned [`AttachedBuilder`] holds the only reference to the
    /// sequence until it is dropped; the attachment is calibration-scoped,
    /// not an ownership relation.
    fn attach<'a>(
        &'a self,
        sequence: &'a mut MultiSegmentSequence,
    ) -> StretchResult<AttachedBuilder<'a>>
    where
        Self: Sized,
    {
        AttachedBuilder::new(self, sequence)
    }

    /// Runs a full calibration pass: starting segment, then the rest.
    fn calibrate(
        &self,
        sequence: &mut MultiSegmentSequence,
        left_slope: f64,
    ) -> StretchResult<CalibrationReport>
    where
        Self: Sized,
    {
        let mut attached = self.attach(sequence)?;
        attached.calibrate_starting_segment(left_slope)?;
        attached.calibrate_sequence(1)?;
        attached.report()
    }
}

/// A builder bound to one sequence for the duration of a pass.
///
/// Created by [`SequenceBuilder::attach`]. Holding the exclusive borrow
/// means a sequence is mutably owned by exactly one calibration pass at a
/// time; concurrent calibration of the same sequence does not compile.
pub struct AttachedBuilder<'a> {
    builder: &'a dyn SequenceBuilder,
    sequence: &'a mut MultiSegmentSequence,
    /// Slope used by a successful starting phase, for restarts from 0.
    starting_slope: Option<f64>,
}

impl<'a> AttachedBuilder<'a> {
    /// Binds `builder` to `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::InvalidInput`] if the sequence has no
    /// segments.
    pub fn new(
        builder: &'a dyn SequenceBuilder,
        sequence: &'a mut MultiSegmentSequence,
    ) -> StretchResult<Self> {
        if sequence.segment_count() == 0 {
            return Err(StretchError::invalid_input(
                "Cannot attach builder to a sequence with no segments",
            ));
        }
        Ok(Self {
            builder,
            sequence,
            starting_slope: None,
        })
    }

    /// Calibrates segment 0 from the leading constraint, the left-boundary
    /// slope, the first best-fit entry, and the boundary condition.
    ///
    /// Marks the sequence not-ready: from here until a sequence pass
    /// completes, evaluation queries are refused.
    pub fn calibrate_starting_segment(&mut self, left_slope: f64) -> StretchResult<()> {
        self.sequence.mark_not_ready();
        let boundary = self.builder.boundary();
        let leading = self.builder.leading_constraint();
        let constraint = self.builder.segment_constraint(0);
        let best_fit = self.builder.segment_best_fit(0);

        self.sequence
            .segment_mut(0)
            .calibrate_leading(leading, left_slope, boundary, constraint, best_fit)
            .map_err(|e| StretchError::calibration_failure(0, e.to_string()))?;

        log::debug!("starting segment calibrated (left slope {left_slope})");
        self.starting_slope = Some(left_slope);
        Ok(())
    }

    /// Calibrates segments from `start_index` through the last.
    ///
    /// Each segment uses the previously calibrated segment as its
    /// left-continuity reference; segment 0, when included, is recalibrated
    /// with the leading/left-boundary conditions of the starting phase.
    /// Stops on the first failure with no partial recovery — the sequence
    /// stays not-ready until a later pass completes.
    pub fn calibrate_sequence(&mut self, start_index: usize) -> StretchResult<()> {
        let count = self.sequence.segment_count();
        if start_index >= count {
            return Err(StretchError::invalid_input(format!(
                "Start index {start_index} outside segment range 0..{count}"
            )));
        }
        self.sequence.mark_not_ready();

        for index in start_index..count {
            if index == 0 {
                let Some(slope) = self.starting_slope else {
                    return Err(StretchError::invalid_input(
                        "Run calibrate_starting_segment before a sequence pass from index 0",
                    ));
                };
                self.calibrate_starting_segment(slope)?;
                continue;
            }

            let constraint = self.builder.segment_constraint(index);
            let best_fit = self.builder.segment_best_fit(index);
            let (previous, segment) = self.sequence.segment_pair_mut(index);
            segment
                .calibrate_onward(previous, constraint, best_fit)
                .map_err(|e| StretchError::calibration_failure(index, e.to_string()))?;
            log::debug!("segment {index} calibrated");
        }

        if self.starting_slope.is_some() {
            self.sequence.mark_ready();
        }
        Ok(())
    }

    /// Recomputes calibration sensitivity to a left-slope perturbation.
    ///
    /// This strategy carries no quote-sensitivity state, so the pass
    /// validates its input and reports success without altering any
    /// coefficients. It always succeeds on an attached sequence.
    pub fn manifest_measure_sensitivity(
        &mut self,
        left_slope_sensitivity: f64,
    ) -> StretchResult<()> {
        if !left_slope_sensitivity.is_finite() {
            return Err(StretchError::invalid_input(format!(
                "Left slope sensitivity must be finite, got {left_slope_sensitivity}"
            )));
        }
        log::debug!(
            "sensitivity pass acknowledged (d slope = {left_slope_sensitivity}); no propagation configured"
        );
        Ok(())
    }

    /// Builds the continuity report for a completed pass.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::NotCalibrated`] if the pass has not
    /// completed successfully.
    pub fn report(&self) -> StretchResult<CalibrationReport> {
        self.sequence.continuity_report()
    }
}

/// Diagnostics for a completed calibration pass.
///
/// Records the worst value and slope mismatch across all shared knots;
/// both stay at numerical-noise levels after a successful pass.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    /// Number of calibrated segments.
    pub segments: usize,
    /// Largest response mismatch across shared knots.
    pub max_value_gap: f64,
    /// Largest first-derivative mismatch across shared knots.
    pub max_slope_gap: f64,
}

impl CalibrationReport {
    /// Returns true if every knot gap is within `tolerance`.
    #[must_use]
    pub fn is_continuous(&self, tolerance: f64) -> bool {
        self.max_value_gap <= tolerance && self.max_slope_gap <= tolerance
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Calibrated {} segments: max knot gap {:.2e} (value), {:.2e} (slope)",
            self.segments, self.max_value_gap, self.max_slope_gap
        )
    }
}

/// Custom-constrained calibration strategy.
///
/// Carries an optional leading constraint, per-segment-index constraints
/// and best-fit weightings, and a boundary setting.
///
/// # Example
///
/// ```rust
/// use taut_math::basis::BasisFamily;
/// use taut_stretch::prelude::*;
///
/// let mut stretch = MultiSegmentSequence::new(
///     vec![0.0, 1.0, 2.0],
///     BasisFamily::HyperbolicTensionC2 { tension: 1.5 },
/// )
/// .unwrap();
///
/// let builder = CkSequenceBuilder::new()
///     .with_leading_constraint(ResponseValueConstraint::at(0.0, 1.0).unwrap())
///     .with_constraint(0, ResponseValueConstraint::at(1.0, 0.96).unwrap())
///     .with_constraint(1, ResponseValueConstraint::at(2.0, 0.91).unwrap());
///
/// let report = stretch.calibrate(&builder, -0.04).unwrap();
/// assert!(report.is_continuous(1e-8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CkSequenceBuilder {
    leading: Option<ResponseValueConstraint>,
    constraints: Vec<Option<ResponseValueConstraint>>,
    best_fits: Vec<Option<BestFitWeighting>>,
    boundary: BoundarySetting,
}

impl CkSequenceBuilder {
    /// Creates an empty strategy with a natural boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the leading constraint anchoring the left extreme.
    #[must_use]
    pub fn with_leading_constraint(mut self, constraint: ResponseValueConstraint) -> Self {
        self.leading = Some(constraint);
        self
    }

    /// Assigns a constraint to segment `index`.
    #[must_use]
    pub fn with_constraint(mut self, index: usize, constraint: ResponseValueConstraint) -> Self {
        if self.constraints.len() <= index {
            self.constraints.resize(index + 1, None);
        }
        self.constraints[index] = Some(constraint);
        self
    }

    /// Assigns a best-fit weighting to segment `index`.
    #[must_use]
    pub fn with_best_fit(mut self, index: usize, weighting: BestFitWeighting) -> Self {
        if self.best_fits.len() <= index {
            self.best_fits.resize(index + 1, None);
        }
        self.best_fits[index] = Some(weighting);
        self
    }

    /// Sets the boundary condition.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundarySetting) -> Self {
        self.boundary = boundary;
        self
    }
}

impl SequenceBuilder for CkSequenceBuilder {
    fn boundary(&self) -> BoundarySetting {
        self.boundary
    }

    fn leading_constraint(&self) -> Option<&ResponseValueConstraint> {
        self.leading.as_ref()
    }

    fn segment_constraint(&self, index: usize) -> Option<&ResponseValueConstraint> {
        self.constraints.get(index).and_then(Option::as_ref)
    }

    fn segment_best_fit(&self, index: usize) -> Option<&BestFitWeighting> {
        self.best_fits.get(index).and_then(Option::as_ref)
    }
}

/// Natural-spline calibration strategy over per-knot response values.
///
/// The common interpolating case: one observed response per knot, lowered
/// onto a leading anchor at the first knot and a point constraint at each
/// segment's right knot.
#[derive(Debug, Clone)]
pub struct KnotAnchoredSequenceBuilder {
    inner: CkSequenceBuilder,
}

impl KnotAnchoredSequenceBuilder {
    /// Creates the strategy from parallel knot and response arrays.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::InvalidInput`] on mismatched lengths and
    /// [`StretchError::InsufficientKnots`] for fewer than two knots;
    /// non-finite entries are rejected by the constraint constructors.
    pub fn new(knots: &[f64], values: &[f64]) -> StretchResult<Self> {
        if knots.len() < 2 {
            return Err(StretchError::insufficient_knots(2, knots.len()));
        }
        if knots.len() != values.len() {
            return Err(StretchError::invalid_input(format!(
                "Knots and values must have same length: {} vs {}",
                knots.len(),
                values.len()
            )));
        }

        let mut inner =
            CkSequenceBuilder::new().with_leading_constraint(ResponseValueConstraint::at(
                knots[0], values[0],
            )?);
        for (segment, (&knot, &value)) in knots[1..].iter().zip(&values[1..]).enumerate() {
            inner = inner.with_constraint(segment, ResponseValueConstraint::at(knot, value)?);
        }

        Ok(Self { inner })
    }

    /// Sets the boundary condition.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundarySetting) -> Self {
        self.inner = self.inner.with_boundary(boundary);
        self
    }
}

impl SequenceBuilder for KnotAnchoredSequenceBuilder {
    fn boundary(&self) -> BoundarySetting {
        self.inner.boundary()
    }

    fn leading_constraint(&self) -> Option<&ResponseValueConstraint> {
        self.inner.leading_constraint()
    }

    fn segment_constraint(&self, index: usize) -> Option<&ResponseValueConstraint> {
        self.inner.segment_constraint(index)
    }
}

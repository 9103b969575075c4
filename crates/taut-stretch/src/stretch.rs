//! The multi-segment stretch.
//!
//! A [`MultiSegmentSequence`] owns an ordered array of segments sharing
//! contiguous knots. Calibration is delegated to a [`SequenceBuilder`];
//! global evaluate/derivative/integrate queries locate the covering
//! segment by knot-ordered search and delegate to it.

use taut_math::basis::BasisFamily;

use crate::builder::{AttachedBuilder, CalibrationReport, KnotAnchoredSequenceBuilder, SequenceBuilder};
use crate::boundary::BoundarySetting;
use crate::error::{StretchError, StretchResult};
use crate::segment::Segment;

/// The full ordered chain of spline segments spanning a knot domain.
///
/// Invariants: knots are finite and strictly increasing;
/// `segments[i].right() == segments[i + 1].left()` for every adjacent
/// pair. The segment array is exclusively owned, and calibration state is
/// tracked sequence-wide: a failed pass leaves the stretch refusing
/// evaluation until a later pass completes.
///
/// # Example
///
/// ```rust
/// use taut_math::basis::BasisFamily;
/// use taut_stretch::prelude::*;
///
/// let mut stretch = MultiSegmentSequence::new(
///     vec![0.0, 1.0, 2.0, 5.0],
///     BasisFamily::HyperbolicTensionC2 { tension: 2.0 },
/// )
/// .unwrap();
///
/// let builder = KnotAnchoredSequenceBuilder::new(
///     &[0.0, 1.0, 2.0, 5.0],
///     &[1.0, 0.962, 0.925, 0.82],
/// )
/// .unwrap();
///
/// stretch.calibrate(&builder, -0.04).unwrap();
/// let df = stretch.response(3.0).unwrap();
/// assert!(df > 0.82 && df < 0.925);
/// ```
pub struct MultiSegmentSequence {
    knots: Vec<f64>,
    segments: Vec<Segment>,
    ready: bool,
}

impl std::fmt::Debug for MultiSegmentSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSegmentSequence")
            .field("n_segments", &self.segments.len())
            .field("span", &(self.knots.first(), self.knots.last()))
            .field("calibrated", &self.ready)
            .finish()
    }
}

impl MultiSegmentSequence {
    /// Creates an uncalibrated stretch over strictly increasing knots,
    /// with one basis set per segment built from `family`.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::InsufficientKnots`] for fewer than two
    /// knots, [`StretchError::InvalidInput`] for non-finite knots, and
    /// [`StretchError::NonMonotonicKnots`] when ordering breaks.
    pub fn new(knots: Vec<f64>, family: BasisFamily) -> StretchResult<Self> {
        if knots.len() < 2 {
            return Err(StretchError::insufficient_knots(2, knots.len()));
        }
        if let Some(bad) = knots.iter().find(|k| !k.is_finite()) {
            return Err(StretchError::invalid_input(format!(
                "Knots must be finite, got {bad}"
            )));
        }
        for i in 1..knots.len() {
            if knots[i] <= knots[i - 1] {
                return Err(StretchError::non_monotonic_knots(
                    i,
                    knots[i - 1],
                    knots[i],
                ));
            }
        }

        let mut segments = Vec::with_capacity(knots.len() - 1);
        for window in knots.windows(2) {
            segments.push(Segment::new(window[0], window[1], family.build()?)?);
        }

        Ok(Self {
            knots,
            segments,
            ready: false,
        })
    }

    /// Returns the knot array.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Returns the segment array.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the covered domain `(first knot, last knot)`.
    pub fn span(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Returns true once a calibration pass has completed successfully.
    pub fn is_calibrated(&self) -> bool {
        self.ready
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn mark_not_ready(&mut self) {
        self.ready = false;
    }

    pub(crate) fn segment_mut(&mut self, index: usize) -> &mut Segment {
        &mut self.segments[index]
    }

    /// Splits out `(&segments[index - 1], &mut segments[index])`.
    pub(crate) fn segment_pair_mut(&mut self, index: usize) -> (&Segment, &mut Segment) {
        let (head, tail) = self.segments.split_at_mut(index);
        (&head[index - 1], &mut tail[0])
    }

    /// Calibrates the stretch with the given builder strategy.
    ///
    /// Delegates entirely to the builder's two-phase protocol: starting
    /// segment (leading constraint, left slope, boundary condition), then
    /// the remaining segments left to right.
    pub fn calibrate<B: SequenceBuilder>(
        &mut self,
        builder: &B,
        left_slope: f64,
    ) -> StretchResult<CalibrationReport> {
        builder.calibrate(self, left_slope)
    }

    /// Finds the index of the segment covering `x`.
    ///
    /// Knots are half-open to the left, except the final knot which maps
    /// to the last segment.
    fn find_segment(&self, x: f64) -> StretchResult<usize> {
        if !x.is_finite() {
            return Err(StretchError::invalid_input(format!(
                "Predictor must be finite, got {x}"
            )));
        }
        let (min, max) = self.span();
        if x < min || x > max {
            return Err(StretchError::predictor_out_of_range(x, min, max));
        }

        let index = match self
            .knots
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Ok(index.min(self.segments.len() - 1))
    }

    /// Returns the calibrated response at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`StretchError::NotCalibrated`] before a successful pass
    /// and [`StretchError::PredictorOutOfRange`] outside the knot span —
    /// there is no silent clamping or extrapolation.
    pub fn response(&self, x: f64) -> StretchResult<f64> {
        self.guard_ready()?;
        let index = self.find_segment(x)?;
        self.segments[index].response(x)
    }

    /// Returns the `order`-th derivative of the calibrated response at `x`.
    pub fn response_derivative(&self, x: f64, order: usize) -> StretchResult<f64> {
        self.guard_ready()?;
        let index = self.find_segment(x)?;
        self.segments[index].response_derivative(x, order)
    }

    /// Integrates the calibrated response over `[a, b]`.
    ///
    /// Both bounds must lie within the knot span; the integral is summed
    /// across every covered segment. Swapped bounds negate the result.
    pub fn integrate(&self, a: f64, b: f64) -> StretchResult<f64> {
        self.guard_ready()?;
        if b < a {
            return Ok(-self.integrate(b, a)?);
        }

        let first = self.find_segment(a)?;
        let last = self.find_segment(b)?;

        let mut total = 0.0;
        for index in first..=last {
            let segment = &self.segments[index];
            let lo = a.max(segment.left());
            let hi = b.min(segment.right());
            if hi > lo {
                total += segment.integrate(lo, hi)?;
            }
        }
        Ok(total)
    }

    /// Builds the knot-continuity report for a calibrated stretch.
    pub fn continuity_report(&self) -> StretchResult<CalibrationReport> {
        self.guard_ready()?;

        let mut max_value_gap = 0.0_f64;
        let mut max_slope_gap = 0.0_f64;
        for index in 1..self.segments.len() {
            let knot = self.segments[index].left();
            let value_gap = (self.segments[index - 1].response(knot)?
                - self.segments[index].response(knot)?)
            .abs();
            let slope_gap = (self.segments[index - 1].response_derivative(knot, 1)?
                - self.segments[index].response_derivative(knot, 1)?)
            .abs();
            max_value_gap = max_value_gap.max(value_gap);
            max_slope_gap = max_slope_gap.max(slope_gap);
        }

        Ok(CalibrationReport {
            segments: self.segments.len(),
            max_value_gap,
            max_slope_gap,
        })
    }

    fn guard_ready(&self) -> StretchResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(StretchError::NotCalibrated)
        }
    }
}

/// Fluent construction of a calibrated interpolating stretch.
///
/// Wraps sequence construction, the knot-anchored builder strategy, and
/// the calibration pass in one expression. The left slope defaults to the
/// secant of the first two responses when not supplied.
///
/// # Example
///
/// ```rust
/// use taut_math::basis::BasisFamily;
/// use taut_stretch::prelude::*;
///
/// let stretch = StretchBuilder::new(BasisFamily::Polynomial { num_basis: 4 })
///     .knots(vec![0.0, 1.0, 2.0])
///     .values(vec![0.02, 0.025, 0.03])
///     .build()
///     .unwrap();
///
/// assert!(stretch.is_calibrated());
/// ```
#[derive(Debug, Clone)]
pub struct StretchBuilder {
    family: BasisFamily,
    knots: Vec<f64>,
    values: Vec<f64>,
    boundary: BoundarySetting,
    left_slope: Option<f64>,
}

impl StretchBuilder {
    /// Creates a builder for the given basis family.
    #[must_use]
    pub fn new(family: BasisFamily) -> Self {
        Self {
            family,
            knots: Vec::new(),
            values: Vec::new(),
            boundary: BoundarySetting::default(),
            left_slope: None,
        }
    }

    /// Sets the knot array.
    #[must_use]
    pub fn knots(mut self, knots: Vec<f64>) -> Self {
        self.knots = knots;
        self
    }

    /// Sets the per-knot response values.
    #[must_use]
    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Sets the boundary condition.
    #[must_use]
    pub fn boundary(mut self, boundary: BoundarySetting) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the left-boundary slope.
    #[must_use]
    pub fn left_slope(mut self, slope: f64) -> Self {
        self.left_slope = Some(slope);
        self
    }

    /// Builds and calibrates the stretch.
    pub fn build(self) -> StretchResult<MultiSegmentSequence> {
        let mut sequence = MultiSegmentSequence::new(self.knots.clone(), self.family)?;
        let builder = KnotAnchoredSequenceBuilder::new(&self.knots, &self.values)?
            .with_boundary(self.boundary);

        let left_slope = match self.left_slope {
            Some(slope) => slope,
            None => (self.values[1] - self.values[0]) / (self.knots[1] - self.knots[0]),
        };

        let mut attached = AttachedBuilder::new(&builder, &mut sequence)?;
        attached.calibrate_starting_segment(left_slope)?;
        attached.calibrate_sequence(1)?;
        let report = attached.report()?;
        log::debug!("{}", report.summary());

        Ok(sequence)
    }
}

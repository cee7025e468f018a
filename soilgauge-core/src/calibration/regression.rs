//! Least-squares line through calibration points
//!
//! Smooths noisy characterisations instead of passing through every knot.
//! The result is floored at 0%: a negative water content is never reported,
//! however far the reading lies outside the calibrated range.

use crate::{
    errors::{EstimateError, EstimateResult},
    estimator::{MoistureEstimate, Validity},
    traits::CalibrationStrategy,
};

use super::{check_finite, CalibrationPoint, CalibrationSet, LinearFit};

/// Regression calibration with a zero floor
///
/// Construction can fail on a valid `CalibrationSet` whose raw values are
/// distinct but too close relative to their magnitude for a stable slope;
/// see [`LinearFit::least_squares`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    set: CalibrationSet,
    fit: LinearFit,
}

impl LinearRegression {
    /// Validate points and fit the line
    pub fn new(points: &[CalibrationPoint]) -> EstimateResult<Self> {
        Self::from_set(CalibrationSet::new(points)?)
    }

    /// Build from `(raw, percent)` tuples
    pub fn from_pairs(pairs: &[(f64, f64)]) -> EstimateResult<Self> {
        Self::from_set(CalibrationSet::from_pairs(pairs)?)
    }

    /// Fit an already validated set
    pub fn from_set(set: CalibrationSet) -> EstimateResult<Self> {
        let fit = LinearFit::least_squares(set.points())?;
        log_debug!(
            "regression fit: slope={} intercept={} r2={}",
            fit.slope,
            fit.intercept,
            fit.r_squared(set.points())
        );
        Ok(Self { set, fit })
    }

    /// Fitted coefficients
    pub fn fit(&self) -> LinearFit {
        self.fit
    }

    /// Points the line was fitted to
    pub fn set(&self) -> &CalibrationSet {
        &self.set
    }
}

impl CalibrationStrategy for LinearRegression {
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
        check_finite(raw)?;

        let percent = self.fit.predict(raw).max(0.0);
        if !percent.is_finite() {
            let (min, max) = self.set.raw_range();
            return Err(EstimateError::OutOfRange { value: raw, min, max });
        }

        let (low, high) = self.set.raw_range();
        let validity = if raw < low || raw > high {
            Validity::Extrapolated
        } else {
            Validity::Valid
        };

        Ok(MoistureEstimate {
            percent,
            raw,
            validity,
        })
    }

    fn domain(&self) -> (f64, f64) {
        self.set.raw_range()
    }

    fn name(&self) -> &'static str {
        "LinearRegression"
    }
}

//! Calibration Transforms
//!
//! ## Overview
//!
//! A calibration turns a conditioned scalar (an ADC code or a mean gray level)
//! into a water content percentage. Three strategies are supported, all behind
//! the [`CalibrationStrategy`] trait:
//!
//! | Strategy                 | Built from                     | Between knots        | Outside the domain          |
//! |--------------------------|--------------------------------|----------------------|-----------------------------|
//! | [`PiecewiseLinear`]      | ≥ 2 measured points            | linear interpolation | clamps to the end point     |
//! | [`LinearRegression`]     | ≥ 2 measured points            | least-squares line   | line, floored at 0%         |
//! | [`ClosedFormSaturation`] | dry / saturated gray, ceiling  | square-root model    | strict error or clamp       |
//!
//! ## Calibration Points
//!
//! A point pairs a raw reading with a gravimetric reference:
//!
//! ```text
//! raw 220 ⇒ 3.0 %     raw 365 ⇒ 7.5 %     raw 680 ⇒ 15.0 %
//! ```
//!
//! Points are sorted by raw value when a [`CalibrationSet`] is built. A set
//! needs at least two points and pairwise distinct raw values; anything else
//! leaves the transform undefined and is rejected with
//! `EstimateError::InvalidCalibration` before a single estimate is made.
//!
//! ## Immutability
//!
//! Every type here is read-only after construction. To recalibrate, build a new
//! strategy and swap it in (see `estimator::EstimatorCell`); never mutate
//! points while estimates are in flight.

mod fit;
mod piecewise;
mod regression;
mod saturation;

pub use fit::LinearFit;
pub use piecewise::PiecewiseLinear;
pub use regression::LinearRegression;
pub use saturation::{ClosedFormSaturation, EndpointConvention, PhysicalConstants};

use heapless::Vec;

use crate::{
    constants::MAX_CALIBRATION_POINTS,
    errors::{EstimateError, EstimateResult},
    estimator::MoistureEstimate,
    traits::CalibrationStrategy,
};

/// What to do with a measurement outside the calibrated domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutOfRangePolicy {
    /// Return `EstimateError::OutOfRange`
    #[default]
    Strict,
    /// Evaluate at the nearest domain edge and flag the estimate extrapolated
    #[cfg_attr(feature = "serde", serde(alias = "lenient"))]
    Clamp,
}

/// One measured (raw reading, reference percentage) pair
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationPoint {
    /// Raw reading in acquisition units
    pub raw: f64,
    /// Reference water content (%)
    pub percent: f64,
}

impl CalibrationPoint {
    /// Reference point: `raw` reads correspond to `percent` water content
    pub const fn new(raw: f64, percent: f64) -> Self {
        Self { raw, percent }
    }

    /// Point from repeated readings of the same reference sample
    ///
    /// The raw value is the arithmetic mean of the replicates, which is how the
    /// probe was characterised: four reads per gravimetric level.
    pub fn from_replicates(readings: &[f64], percent: f64) -> EstimateResult<Self> {
        if readings.is_empty() {
            return Err(EstimateError::InvalidCalibration {
                reason: "no replicate readings",
            });
        }
        let mean = readings.iter().sum::<f64>() / readings.len() as f64;
        if !mean.is_finite() || !percent.is_finite() {
            return Err(EstimateError::InvalidCalibration {
                reason: "calibration point is not finite",
            });
        }
        Ok(Self::new(mean, percent))
    }
}

impl From<(f64, f64)> for CalibrationPoint {
    fn from((raw, percent): (f64, f64)) -> Self {
        Self::new(raw, percent)
    }
}

/// Validated calibration points, sorted ascending by raw value
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSet {
    points: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>,
}

impl CalibrationSet {
    /// Validate and sort a set of points
    ///
    /// Rejects sets with fewer than two points, more than
    /// `MAX_CALIBRATION_POINTS`, non-finite values or duplicate raw values.
    pub fn new(points: &[CalibrationPoint]) -> EstimateResult<Self> {
        if points.len() < 2 {
            return Err(EstimateError::InvalidCalibration {
                reason: "at least two calibration points required",
            });
        }

        if points.iter().any(|p| !p.raw.is_finite() || !p.percent.is_finite()) {
            return Err(EstimateError::InvalidCalibration {
                reason: "calibration point is not finite",
            });
        }

        let mut sorted: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS> = Vec::from_slice(points)
            .map_err(|_| EstimateError::InvalidCalibration {
                reason: "too many calibration points",
            })?;
        sorted.sort_unstable_by(|a, b| a.raw.total_cmp(&b.raw));

        if sorted.windows(2).any(|pair| pair[0].raw == pair[1].raw) {
            return Err(EstimateError::InvalidCalibration {
                reason: "duplicate raw values in calibration set",
            });
        }

        Ok(Self { points: sorted })
    }

    /// Build from `(raw, percent)` tuples
    pub fn from_pairs(pairs: &[(f64, f64)]) -> EstimateResult<Self> {
        let mut points: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS> = Vec::new();
        for &pair in pairs {
            points.push(pair.into()).map_err(|_| EstimateError::InvalidCalibration {
                reason: "too many calibration points",
            })?;
        }
        Self::new(&points)
    }

    /// Points in ascending raw order
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Number of points (always ≥ 2)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point with the smallest raw value
    pub fn first(&self) -> CalibrationPoint {
        self.points[0]
    }

    /// Point with the largest raw value
    pub fn last(&self) -> CalibrationPoint {
        self.points[self.points.len() - 1]
    }

    /// `(smallest raw, largest raw)`
    pub fn raw_range(&self) -> (f64, f64) {
        (self.first().raw, self.last().raw)
    }

    /// True when reference values never decrease as raw values increase
    pub fn is_monotonic(&self) -> bool {
        self.points.windows(2).all(|pair| pair[0].percent <= pair[1].percent)
    }
}

/// Any of the supported strategies, statically dispatched
#[derive(Debug, Clone)]
pub enum Calibration {
    /// Interpolation between measured points
    PiecewiseLinear(PiecewiseLinear),
    /// Least-squares line through measured points
    LinearRegression(LinearRegression),
    /// Square-root saturation model on gray levels
    ClosedFormSaturation(ClosedFormSaturation),
}

impl CalibrationStrategy for Calibration {
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
        match self {
            Self::PiecewiseLinear(s) => s.calibrate(raw),
            Self::LinearRegression(s) => s.calibrate(raw),
            Self::ClosedFormSaturation(s) => s.calibrate(raw),
        }
    }

    fn domain(&self) -> (f64, f64) {
        match self {
            Self::PiecewiseLinear(s) => s.domain(),
            Self::LinearRegression(s) => s.domain(),
            Self::ClosedFormSaturation(s) => s.domain(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::PiecewiseLinear(s) => s.name(),
            Self::LinearRegression(s) => s.name(),
            Self::ClosedFormSaturation(s) => s.name(),
        }
    }
}

impl From<PiecewiseLinear> for Calibration {
    fn from(strategy: PiecewiseLinear) -> Self {
        Self::PiecewiseLinear(strategy)
    }
}

impl From<LinearRegression> for Calibration {
    fn from(strategy: LinearRegression) -> Self {
        Self::LinearRegression(strategy)
    }
}

impl From<ClosedFormSaturation> for Calibration {
    fn from(strategy: ClosedFormSaturation) -> Self {
        Self::ClosedFormSaturation(strategy)
    }
}

/// Reject NaN and infinities before any calibration math
pub(crate) fn check_finite(raw: f64) -> EstimateResult<()> {
    if raw.is_finite() {
        Ok(())
    } else {
        Err(EstimateError::InvalidInput {
            reason: "measurement is not a finite number",
        })
    }
}

//! Piecewise-linear interpolation between calibration points
//!
//! Inside `[x_first, x_last]` the value on the segment containing `raw`:
//!
//! ```text
//! y = y0 + (y1 - y0) · (raw - x0) / (x1 - x0)
//! ```
//!
//! Outside, the nearest end point's percentage, flagged extrapolated. Exact
//! knots return the measured percentage unchanged.

use crate::{
    constants::DEFAULT_ADC_CALIBRATION,
    errors::EstimateResult,
    estimator::MoistureEstimate,
    traits::CalibrationStrategy,
};

use super::{check_finite, CalibrationPoint, CalibrationSet};

/// Interpolating calibration over a sorted point set
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    set: CalibrationSet,
}

impl PiecewiseLinear {
    /// Validate points and build the interpolator
    pub fn new(points: &[CalibrationPoint]) -> EstimateResult<Self> {
        Ok(Self {
            set: CalibrationSet::new(points)?,
        })
    }

    /// Build from `(raw, percent)` tuples
    pub fn from_pairs(pairs: &[(f64, f64)]) -> EstimateResult<Self> {
        Ok(Self {
            set: CalibrationSet::from_pairs(pairs)?,
        })
    }

    /// Wrap an already validated set
    pub fn from_set(set: CalibrationSet) -> Self {
        Self { set }
    }

    /// The underlying points
    pub fn set(&self) -> &CalibrationSet {
        &self.set
    }

    fn interpolate(&self, raw: f64) -> f64 {
        let points = self.set.points();
        // Index of the first knot strictly above raw; raw is inside the domain
        // so this lands in 1..len
        let upper = points.partition_point(|p| p.raw <= raw).min(points.len() - 1);
        let lower = upper - 1;
        let (p0, p1) = (points[lower], points[upper]);
        if raw == p0.raw {
            return p0.percent;
        }
        p0.percent + (p1.percent - p0.percent) * (raw - p0.raw) / (p1.raw - p0.raw)
    }
}

impl Default for PiecewiseLinear {
    /// The three-point analog probe calibration
    fn default() -> Self {
        match Self::from_pairs(&DEFAULT_ADC_CALIBRATION) {
            Ok(table) => table,
            Err(_) => unreachable!("built-in ADC calibration is sorted with distinct codes"),
        }
    }
}

impl CalibrationStrategy for PiecewiseLinear {
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
        check_finite(raw)?;

        let first = self.set.first();
        let last = self.set.last();

        if raw < first.raw {
            log_debug!("raw {} below calibration range, clamped to {}", raw, first.raw);
            return Ok(MoistureEstimate::extrapolated(raw, first.percent));
        }
        if raw > last.raw {
            log_debug!("raw {} above calibration range, clamped to {}", raw, last.raw);
            return Ok(MoistureEstimate::extrapolated(raw, last.percent));
        }
        if raw == last.raw {
            return Ok(MoistureEstimate::valid(raw, last.percent));
        }

        Ok(MoistureEstimate::valid(raw, self.interpolate(raw)))
    }

    fn domain(&self) -> (f64, f64) {
        self.set.raw_range()
    }

    fn name(&self) -> &'static str {
        "PiecewiseLinear"
    }
}

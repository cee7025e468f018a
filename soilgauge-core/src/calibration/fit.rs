//! Ordinary least-squares line fit
//!
//! ```text
//! slope     = Σ(x - x̄)(y - ȳ) / Σ(x - x̄)²
//! intercept = ȳ - slope · x̄
//! ```
//!
//! Centering before summing keeps the denominator accurate for raw codes in
//! the hundreds, where the textbook `nΣx² - (Σx)²` form loses digits.

use crate::{
    constants::calibration::FIT_DEGENERACY_EPSILON,
    errors::{EstimateError, EstimateResult},
};

use super::CalibrationPoint;

/// Straight line `percent = slope · raw + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearFit {
    /// Change in percent per raw unit
    pub slope: f64,
    /// Percent at raw = 0
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through the points by ordinary least squares
    ///
    /// Fails with `InvalidCalibration` for fewer than two points or when the
    /// raw values barely vary. The test is relative: the centred spread
    /// `Σ(x - x̄)²` must exceed `FIT_DEGENERACY_EPSILON · max(Σx², 1)`, so raw
    /// values that are distinct but differ only in the last few digits of
    /// their magnitude (1e12 and 1e12 + 1) are refused even though a
    /// `CalibrationSet` accepts them.
    pub fn least_squares(points: &[CalibrationPoint]) -> EstimateResult<Self> {
        if points.len() < 2 {
            return Err(EstimateError::InvalidCalibration {
                reason: "at least two points required for a fit",
            });
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.raw).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.percent).sum::<f64>() / n;

        let (sxx, sxy, sum_sq) = points.iter().fold((0.0, 0.0, 0.0), |(sxx, sxy, sq), p| {
            let dx = p.raw - mean_x;
            (sxx + dx * dx, sxy + dx * (p.percent - mean_y), sq + p.raw * p.raw)
        });

        if !(sxx > FIT_DEGENERACY_EPSILON * sum_sq.max(1.0)) {
            return Err(EstimateError::InvalidCalibration {
                reason: "raw values do not vary, fit is vertical",
            });
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(EstimateError::InvalidCalibration {
                reason: "fit coefficients are not finite",
            });
        }

        Ok(Self { slope, intercept })
    }

    /// Value of the line at `raw`
    #[inline]
    pub fn predict(&self, raw: f64) -> f64 {
        self.slope * raw + self.intercept
    }

    /// Coefficient of determination over `points`
    ///
    /// 1.0 for a perfect fit. Returns 1.0 when the reference values are all
    /// equal and the line reproduces them.
    pub fn r_squared(&self, points: &[CalibrationPoint]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let mean_y = points.iter().map(|p| p.percent).sum::<f64>() / points.len() as f64;
        let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), p| {
            let residual = p.percent - self.predict(p.raw);
            let spread = p.percent - mean_y;
            (res + residual * residual, tot + spread * spread)
        });
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

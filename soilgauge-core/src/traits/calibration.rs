//! Calibration Strategy Trait
//!
//! One interface for every way of turning a conditioned scalar into a water
//! content percentage. Implementations are immutable after construction, so a
//! strategy can be shared between threads and queried concurrently without
//! synchronization.

use crate::errors::EstimateResult;
use crate::estimator::MoistureEstimate;

/// Maps a conditioned raw scalar to a physical percentage
///
/// ## Contract
///
/// - `calibrate` is a pure function of `raw` and the construction-time
///   configuration
/// - It never returns NaN: it either yields a well-formed estimate (possibly
///   flagged extrapolated) or a typed error
/// - Configuration problems are caught at construction, not per call
///
/// ## Example Implementation
///
/// ```rust
/// use soilgauge_core::traits::CalibrationStrategy;
/// use soilgauge_core::estimator::MoistureEstimate;
/// use soilgauge_core::EstimateResult;
///
/// /// Uncalibrated 0-100% display scale
/// struct RawPercent;
///
/// impl CalibrationStrategy for RawPercent {
///     fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
///         Ok(MoistureEstimate::valid(raw, (raw / 10.24).round()))
///     }
///
///     fn domain(&self) -> (f64, f64) {
///         (0.0, 1023.0)
///     }
///
///     fn name(&self) -> &'static str {
///         "RawPercent"
///     }
/// }
/// ```
pub trait CalibrationStrategy: Send + Sync {
    /// Convert a conditioned raw value to a moisture estimate
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate>;

    /// Raw-value interval the calibration was established over `(low, high)`
    fn domain(&self) -> (f64, f64);

    /// Strategy name for logs and reports
    fn name(&self) -> &'static str;
}

impl<T: CalibrationStrategy + ?Sized> CalibrationStrategy for &T {
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
        (**self).calibrate(raw)
    }

    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

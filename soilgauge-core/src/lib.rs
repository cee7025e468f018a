//! Calibrated soil moisture estimation
//!
//! Turns raw probe readings (10-bit ADC codes) and camera frames (mean gray
//! level of a soil patch) into volumetric water content percentages.
//! Designed for small boards as well as desktops.
//!
//! Key constraints:
//! - `no_std` + `alloc` capable; images are the only heap buffers
//! - Calibration math never allocates and never returns NaN
//! - Calibrations are immutable; recalibration swaps whole estimators
//!
//! ```no_run
//! use soilgauge_core::{calibration::PiecewiseLinear, estimator::MoistureEstimator, RawSample};
//!
//! let estimator = MoistureEstimator::analog(PiecewiseLinear::default());
//!
//! match RawSample::adc(492).and_then(|s| estimator.estimate(s)) {
//!     Ok(estimate) => {}, // publish estimate.percent
//!     Err(e) => {},       // skip this reading
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod acquisition;
pub mod calibration;
pub mod conditioning;
pub mod constants;
pub mod errors;
pub mod estimator;
pub mod history;
pub mod report;
pub mod sample;
pub mod session;
pub mod time;
pub mod traits;

#[cfg(feature = "std")]
pub mod config;

// Public API
pub use calibration::{Calibration, CalibrationPoint, OutOfRangePolicy};
pub use errors::{AcquisitionError, AcquisitionResult, EstimateError, EstimateResult};
pub use estimator::{MoistureEstimate, MoistureEstimator, Validity};
pub use sample::{Channel, RawSample};
pub use traits::CalibrationStrategy;

#[cfg(feature = "std")]
pub use config::{ConfigError, EstimatorConfig};
#[cfg(feature = "std")]
pub use estimator::EstimatorCell;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}

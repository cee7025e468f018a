//! Error Types for Moisture Estimation Failures
//!
//! ## Design Philosophy
//!
//! The estimator runs on small boards (Raspberry Pi class and below) as well as
//! on desktops, so errors follow the same rules as the rest of the crate:
//!
//! 1. **Small Size**: every variant is a handful of words, cheap to return from
//!    the hot path and to store alongside a logged reading.
//!
//! 2. **No Heap Allocation**: messages are `&'static str`, never `String`.
//!
//! 3. **Copy Semantics**: errors are `Copy` so they can be stored, compared and
//!    re-emitted without lifetime gymnastics.
//!
//! ## Error Categories
//!
//! ### Input Problems (per sample)
//! - `InvalidInput`: empty or constant image, NaN reading, sample from the
//!   wrong channel. Skip the sample or retry acquisition.
//!
//! ### Configuration Problems (fatal at construction)
//! - `InvalidCalibration`: fewer than two points, duplicate raw values, a
//!   vertical least-squares line, inconsistent physical constants.
//!
//! ### Domain Problems (per sample, policy dependent)
//! - `OutOfRange`: the conditioned measurement lies outside the calibrated
//!   domain and the strict policy is active.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use soilgauge_core::{EstimateError, RawSample};
//! use soilgauge_core::calibration::PiecewiseLinear;
//! use soilgauge_core::estimator::MoistureEstimator;
//!
//! let estimator = MoistureEstimator::analog(PiecewiseLinear::default());
//!
//! match RawSample::adc(512).and_then(|sample| estimator.estimate(sample)) {
//!     Ok(estimate) => {
//!         // publish(estimate.percent);
//!         assert!(estimate.percent > 0.0);
//!     }
//!     Err(EstimateError::InvalidInput { .. }) => {
//!         // re-read the probe
//!     }
//!     Err(EstimateError::OutOfRange { .. }) => {
//!         // reading outside the calibrated band
//!     }
//!     Err(EstimateError::InvalidCalibration { .. }) => {
//!         // configuration bug, never recoverable at runtime
//!     }
//! }
//! ```
//!
//! None of these errors touch the calibration configuration: a failed estimate
//! leaves the estimator exactly as it was.

use thiserror_no_std::Error;

/// Result type for estimation operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Result type for acquisition operations
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Estimation errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimateError {
    /// Raw image/buffer/sample unusable for this estimate
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: &'static str,
    },

    /// Calibration configuration cannot define a transform
    #[error("Invalid calibration: {reason}")]
    InvalidCalibration {
        /// Which construction rule was violated
        reason: &'static str,
    },

    /// Measurement outside the calibrated domain
    #[error("Value {value} outside calibrated range [{min}, {max}]")]
    OutOfRange {
        /// The conditioned measurement
        value: f64,
        /// Lower edge of the calibrated domain
        min: f64,
        /// Upper edge of the calibrated domain
        max: f64,
    },
}

/// Errors raised by sample sources
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AcquisitionError {
    /// Underlying bus transfer failed
    #[error("Bus transfer failed: {reason}")]
    Bus {
        /// Driver-supplied description
        reason: &'static str,
    },

    /// Requested ADC channel does not exist on the converter
    #[error("Invalid channel {channel}")]
    InvalidChannel {
        /// The rejected channel number
        channel: u8,
    },

    /// Replay or capture source has no more samples
    #[error("End of data")]
    EndOfData,

    /// Frame captured but could not be reduced to a gray level
    #[error("Conditioning failed: {0}")]
    Conditioning(EstimateError),
}

impl From<EstimateError> for AcquisitionError {
    fn from(error: EstimateError) -> Self {
        Self::Conditioning(error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EstimateError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidInput { reason } =>
                defmt::write!(fmt, "Invalid input: {}", reason),
            Self::InvalidCalibration { reason } =>
                defmt::write!(fmt, "Invalid calibration: {}", reason),
            Self::OutOfRange { value, min, max } =>
                defmt::write!(fmt, "Value {} outside [{}, {}]", value, min, max),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AcquisitionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus { reason } =>
                defmt::write!(fmt, "Bus: {}", reason),
            Self::InvalidChannel { channel } =>
                defmt::write!(fmt, "Invalid channel {}", channel),
            Self::EndOfData =>
                defmt::write!(fmt, "End of data"),
            Self::Conditioning(error) =>
                defmt::write!(fmt, "Conditioning: {}", error),
        }
    }
}

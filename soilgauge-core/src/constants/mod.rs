//! Constants for SoilGauge Core
//!
//! Centralized numeric defaults used across the estimator. Every value here
//! is either a hardware limit, a constant measured during a calibration run,
//! or a conditioning default taken from the capture setup.
//!
//! ## Organization
//!
//! - **Calibration**: default calibration points and physical constants
//! - **Imaging**: gray-level range and conditioning defaults
//! - **Acquisition**: ADC geometry, sampling intervals, history length
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Record where a measured constant came from
//! 3. Use descriptive names that include units

/// Calibration points and closed-form constants from field measurements.
pub mod calibration;

/// Gray-level range and image conditioning defaults.
pub mod imaging;

/// ADC geometry, sampling intervals and buffer sizes.
pub mod acquisition;

pub use calibration::{
    DEFAULT_ADC_CALIBRATION, DRY_GRAY_LEVEL, SATURATED_GRAY_LEVEL, SATURATED_MOISTURE_PCT,
    MAX_CALIBRATION_POINTS,
};

pub use imaging::{
    GRAY_LEVEL_MIN, GRAY_LEVEL_MAX, DEFAULT_GLOSS_THRESHOLD, DEFAULT_GLOSS_MARGIN,
    DEFAULT_PERCENTILE_LOW, DEFAULT_PERCENTILE_HIGH, DEFAULT_ROI_SIZE,
};

pub use acquisition::{
    ADC_MAX_CODE, ADC_COUNTS_PER_PERCENT, DEFAULT_HISTORY_LEN, SHUTDOWN_COMMAND,
};

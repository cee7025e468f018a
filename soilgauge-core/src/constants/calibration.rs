//! Calibration Constants
//!
//! Defaults measured on the reference setup: a capacitive probe behind an
//! MCP3008 for the analog channel, and a phone camera over potting soil for
//! the gray-level channel.

// ===== ANALOG PROBE =====

/// Default ADC calibration points as `(raw code, water content %)`.
///
/// Gravimetric reference measurements of the same pot at three moisture
/// levels. Raw codes are 10-bit MCP3008 readings.
pub const DEFAULT_ADC_CALIBRATION: [(f64, f64); 3] = [(220.0, 3.0), (365.0, 7.5), (680.0, 15.0)];

/// Upper bound on calibration points held by one set.
///
/// Sets live in a fixed-capacity vector so calibration never allocates.
pub const MAX_CALIBRATION_POINTS: usize = 32;

// ===== CLOSED-FORM GRAY LEVEL MODEL =====

/// Gray level of oven-dry soil (0% water content).
///
/// Mean of the percentile-normalized, gloss-removed ROI of the dry sample.
pub const DRY_GRAY_LEVEL: f64 = 120.0;

/// Gray level of saturated soil.
pub const SATURATED_GRAY_LEVEL: f64 = 95.0;

/// Saturated moisture content of the reference substrate (%).
pub const SATURATED_MOISTURE_PCT: f64 = 17.0;

/// Constants from the min/max-normalized capture run: `(dry, saturated, ceiling %)`.
///
/// Dry soil at 157, saturated at 75, ceiling 50%.
pub const MIN_MAX_RUN_CONSTANTS: (f64, f64, f64) = (157.0, 75.0, 50.0);

// ===== NUMERICS =====

/// Relative tolerance below which a least-squares denominator is treated as zero.
pub const FIT_DEGENERACY_EPSILON: f64 = 1e-12;

//! Imaging Constants
//!
//! Gray-level range and the conditioning defaults used for phone captures.

/// Darkest 8-bit gray level.
pub const GRAY_LEVEL_MIN: f64 = 0.0;

/// Brightest 8-bit gray level.
pub const GRAY_LEVEL_MAX: f64 = 255.0;

/// Absolute threshold above which a normalized pixel counts as specular.
///
/// Flash reflections on wet soil saturate well above this after percentile
/// stretching; soil texture rarely does.
pub const DEFAULT_GLOSS_THRESHOLD: u8 = 230;

/// Margin above the image mean for the replace-with-mean gloss filter.
pub const DEFAULT_GLOSS_MARGIN: f64 = 10.0;

/// Lower percentile for brightness normalization.
pub const DEFAULT_PERCENTILE_LOW: f64 = 1.0;

/// Upper percentile for brightness normalization.
pub const DEFAULT_PERCENTILE_HIGH: f64 = 99.0;

/// Default centered ROI `(width, height)` in pixels.
pub const DEFAULT_ROI_SIZE: (u32, u32) = (256, 256);

/// ITU-R BT.601 luma weights `(red, green, blue)`.
pub const LUMA_WEIGHTS: (f64, f64, f64) = (0.299, 0.587, 0.114);

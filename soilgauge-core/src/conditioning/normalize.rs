//! Lighting normalization
//!
//! Both stretches map the image's own dynamic range onto the full 8-bit scale
//! so that gray levels from different exposures are comparable. Results are
//! truncated toward zero when stored back as `u8`.

use crate::{
    constants::{DEFAULT_PERCENTILE_HIGH, DEFAULT_PERCENTILE_LOW, GRAY_LEVEL_MAX},
    errors::{EstimateError, EstimateResult},
};

use super::GrayImage;

/// Lighting normalization stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "kind"))]
pub enum Normalization {
    /// Leave pixels as captured
    None,
    /// Linear stretch of `[min, max]` onto `[black, white]`
    MinMax {
        /// Output value for the darkest pixel
        black: u8,
        /// Output value for the brightest pixel
        white: u8,
    },
    /// `(g - p_low) · 255 / (p_high - p_low)`, clipped to `[0, 255]`
    Percentile {
        /// Lower percentile in `[0, 100)`
        low: f64,
        /// Upper percentile in `(low, 100]`
        high: f64,
    },
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Percentile {
            low: DEFAULT_PERCENTILE_LOW,
            high: DEFAULT_PERCENTILE_HIGH,
        }
    }
}

impl Normalization {
    /// Stretch with the default reference points (black 0, white 255)
    pub const fn min_max() -> Self {
        Self::MinMax {
            black: 0,
            white: 255,
        }
    }

    /// Normalize `image` in place
    ///
    /// Fails with `InvalidInput` on an empty image or when the image has no
    /// dynamic range between the reference points.
    pub fn apply(&self, image: &mut GrayImage) -> EstimateResult<()> {
        match *self {
            Self::None => Ok(()),
            Self::MinMax { black, white } => stretch_min_max(image, black, white),
            Self::Percentile { low, high } => stretch_percentile(image, low, high),
        }
    }
}

fn stretch_min_max(image: &mut GrayImage, black: u8, white: u8) -> EstimateResult<()> {
    let pixels = image.pixels_mut();
    let (min, max) = pixels
        .iter()
        .fold(None, |acc: Option<(u8, u8)>, &p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
        .ok_or(EstimateError::InvalidInput {
            reason: "empty image",
        })?;

    if min == max {
        return Err(EstimateError::InvalidInput {
            reason: "image has no dynamic range",
        });
    }

    let span = (max - min) as f64;
    let out_span = white as f64 - black as f64;
    for p in pixels.iter_mut() {
        let v = (*p - min) as f64 / span * out_span + black as f64;
        *p = v.clamp(0.0, GRAY_LEVEL_MAX) as u8;
    }
    Ok(())
}

fn stretch_percentile(image: &mut GrayImage, low: f64, high: f64) -> EstimateResult<()> {
    if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
        return Err(EstimateError::InvalidInput {
            reason: "percentiles must satisfy 0 <= low < high <= 100",
        });
    }

    let p_low = percentile(image, low)?;
    let p_high = percentile(image, high)?;
    let range = p_high - p_low;
    if !(range > 0.0) {
        return Err(EstimateError::InvalidInput {
            reason: "image has no dynamic range",
        });
    }

    for p in image.pixels_mut().iter_mut() {
        let v = (*p as f64 - p_low) * GRAY_LEVEL_MAX / range;
        *p = v.clamp(0.0, GRAY_LEVEL_MAX) as u8;
    }
    Ok(())
}

/// `q`-th percentile of the pixel values, linearly interpolated between ranks
///
/// For sorted values `a` and `r = q/100 · (n - 1)`, returns
/// `a[⌊r⌋] + (r - ⌊r⌋) · (a[⌊r⌋ + 1] - a[⌊r⌋])`. Computed from a histogram, so
/// no sort and no allocation.
pub fn percentile(image: &GrayImage, q: f64) -> EstimateResult<f64> {
    let n = image.len();
    if n == 0 {
        return Err(EstimateError::InvalidInput {
            reason: "empty image",
        });
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(EstimateError::InvalidInput {
            reason: "percentile outside [0, 100]",
        });
    }

    let mut histogram = [0usize; 256];
    for &p in image.pixels() {
        histogram[p as usize] += 1;
    }

    let rank = q / 100.0 * (n - 1) as f64;
    let lower = libm::floor(rank) as usize;
    let frac = rank - lower as f64;

    let a = nth_value(&histogram, lower);
    if frac == 0.0 || lower + 1 >= n {
        return Ok(a);
    }
    let b = nth_value(&histogram, lower + 1);
    Ok(a + frac * (b - a))
}

/// Value of the `k`-th smallest pixel (0-based)
fn nth_value(histogram: &[usize; 256], k: usize) -> f64 {
    let mut seen = 0;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > k {
            return value as f64;
        }
    }
    GRAY_LEVEL_MAX
}

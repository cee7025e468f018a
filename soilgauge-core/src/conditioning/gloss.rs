//! Specular highlight removal
//!
//! Wet soil reflects light sources as small saturated patches that would pull
//! the mean gray level toward white. Two pixel-wise filters are available; no
//! connected-component analysis is done.

use crate::{
    constants::{DEFAULT_GLOSS_MARGIN, DEFAULT_GLOSS_THRESHOLD},
    errors::{EstimateError, EstimateResult},
};

use super::GrayImage;

/// Gloss handling stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "kind"))]
pub enum GlossFilter {
    /// Keep every pixel
    None,
    /// Pixels brighter than `mean + margin` become the (truncated) mean
    ReplaceWithMean {
        /// Allowed excess over the image mean
        margin: f64,
    },
    /// Pixels brighter than `threshold` become 0 and drop out of
    /// [`Reduction::ExcludeZero`](super::Reduction::ExcludeZero)
    RemoveAbove {
        /// Brightest pixel kept
        threshold: u8,
    },
}

impl Default for GlossFilter {
    fn default() -> Self {
        Self::RemoveAbove {
            threshold: DEFAULT_GLOSS_THRESHOLD,
        }
    }
}

impl GlossFilter {
    /// Mean replacement with the default 10-level margin
    pub const fn replace_with_mean() -> Self {
        Self::ReplaceWithMean {
            margin: DEFAULT_GLOSS_MARGIN,
        }
    }

    /// Filter `image` in place
    pub fn apply(&self, image: &mut GrayImage) -> EstimateResult<()> {
        match *self {
            Self::None => Ok(()),
            Self::RemoveAbove { threshold } => {
                for p in image.pixels_mut().iter_mut().filter(|p| **p > threshold) {
                    *p = 0;
                }
                Ok(())
            }
            Self::ReplaceWithMean { margin } => {
                if !margin.is_finite() {
                    return Err(EstimateError::InvalidInput {
                        reason: "gloss margin is not finite",
                    });
                }
                let mean = image.mean()?;
                let limit = mean + margin;
                let replacement = mean as u8;
                for p in image.pixels_mut().iter_mut().filter(|p| **p as f64 > limit) {
                    *p = replacement;
                }
                Ok(())
            }
        }
    }
}

//! Buffer to scalar reduction

use crate::errors::{EstimateError, EstimateResult};

use super::GrayImage;

/// How the conditioned buffer collapses to one gray level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Reduction {
    /// Mean of the non-zero pixels; exactly 0.0 when every pixel is zero
    #[default]
    ExcludeZero,
    /// Mean of every pixel
    AllPixels,
}

impl Reduction {
    /// Reduce `image` to a gray level in `[0, 255]`
    pub fn apply(&self, image: &GrayImage) -> EstimateResult<f64> {
        if image.is_empty() {
            return Err(EstimateError::InvalidInput {
                reason: "empty image",
            });
        }
        match self {
            Self::AllPixels => image.mean(),
            Self::ExcludeZero => {
                let (sum, count) = image
                    .pixels()
                    .iter()
                    .filter(|&&p| p > 0)
                    .fold((0u64, 0u64), |(s, c), &p| (s + p as u64, c + 1));
                if count == 0 {
                    return Ok(0.0);
                }
                Ok(sum as f64 / count as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn exclude_zero_skips_black() {
        let img = GrayImage::new(4, 1, vec![0, 100, 0, 120]).unwrap();
        assert_eq!(Reduction::ExcludeZero.apply(&img).unwrap(), 110.0);
        assert_eq!(Reduction::AllPixels.apply(&img).unwrap(), 55.0);
    }

    #[test]
    fn all_black_is_zero() {
        let img = GrayImage::filled(3, 3, 0).unwrap();
        assert_eq!(Reduction::ExcludeZero.apply(&img).unwrap(), 0.0);
    }

    #[test]
    fn empty_rejected() {
        let img = GrayImage::new(0, 4, vec![]).unwrap();
        assert!(Reduction::AllPixels.apply(&img).is_err());
        assert!(Reduction::ExcludeZero.apply(&img).is_err());
    }
}

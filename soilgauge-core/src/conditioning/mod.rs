//! Signal Conditioning for Camera Frames
//!
//! ## Overview
//!
//! Turns an 8-bit grayscale frame into the single gray level the closed-form
//! calibration consumes. The stages run in a fixed order:
//!
//! ```text
//! GrayImage → crop (ROI) → normalize → remove gloss → reduce → f64 in [0, 255]
//! ```
//!
//! Cropping first means normalization statistics describe the soil patch, not
//! the pot rim or the background around it.
//!
//! ## Stages
//!
//! - [`RoiSelection`]: full frame, an explicit [`Rectangle`] or a centred crop
//! - [`Normalization`]: min/max stretch or 1st/99th percentile stretch
//! - [`GlossFilter`]: replace specular pixels with the mean, or zero them
//! - [`Reduction`]: mean of non-zero pixels or of every pixel
//!
//! Each stage is also usable on its own; [`Conditioner`] just chains them
//! according to a [`ConditioningConfig`].
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::conditioning::{Conditioner, ConditioningConfig, GrayImage};
//!
//! let frame = GrayImage::new(4, 1, vec![10, 50, 90, 130]).unwrap();
//! let conditioner = Conditioner::new(ConditioningConfig::default());
//! let level = conditioner.condition(&frame).unwrap();
//! assert!((0.0..=255.0).contains(&level));
//! ```

mod gloss;
mod normalize;
mod reduce;
mod roi;

pub use gloss::GlossFilter;
pub use normalize::{percentile, Normalization};
pub use reduce::Reduction;
pub use roi::{fit_within, Rectangle, RoiSelection};

use alloc::vec::Vec;

use crate::{
    constants::imaging::LUMA_WEIGHTS,
    errors::{EstimateError, EstimateResult},
};

/// Owned 8-bit single-channel image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayImage {
    /// Wrap a row-major pixel buffer
    ///
    /// Fails when `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> EstimateResult<Self> {
        if pixels.len() != pixel_count(width, height)? {
            return Err(EstimateError::InvalidInput {
                reason: "pixel buffer does not match image dimensions",
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image with every pixel set to `value`
    pub fn filled(width: u32, height: u32, value: u8) -> EstimateResult<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: alloc::vec![value; len],
        })
    }

    /// Convert interleaved BGR (OpenCV channel order)
    pub fn from_bgr8(width: u32, height: u32, data: &[u8]) -> EstimateResult<Self> {
        Self::from_interleaved(width, height, data, [2, 1, 0])
    }

    /// Convert interleaved RGB
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> EstimateResult<Self> {
        Self::from_interleaved(width, height, data, [0, 1, 2])
    }

    /// `order` gives the offsets of R, G and B inside each pixel
    fn from_interleaved(
        width: u32,
        height: u32,
        data: &[u8],
        order: [usize; 3],
    ) -> EstimateResult<Self> {
        let len = pixel_count(width, height)?;
        if data.len() != len * 3 {
            return Err(EstimateError::InvalidInput {
                reason: "colour buffer does not match image dimensions",
            });
        }
        let (wr, wg, wb) = LUMA_WEIGHTS;
        let pixels = data
            .chunks_exact(3)
            .map(|px| {
                let luma = wr * px[order[0]] as f64 + wg * px[order[1]] as f64 + wb * px[order[2]] as f64;
                libm::round(luma).clamp(0.0, 255.0) as u8
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True for a zero-area image
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at `(x, y)`, `None` outside the image
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Copy of the part of the image under `rect`
    ///
    /// The rectangle is clamped to the image first; an empty intersection is
    /// `InvalidInput`.
    pub fn crop(&self, rect: &Rectangle) -> EstimateResult<GrayImage> {
        let r = rect.clamp_to(self.width, self.height)?;
        let stride = self.width as usize;
        let mut pixels = Vec::with_capacity(r.area());
        for row in r.y..r.y + r.height {
            let start = row as usize * stride + r.x as usize;
            pixels.extend_from_slice(&self.pixels[start..start + r.width as usize]);
        }
        Ok(GrayImage {
            width: r.width,
            height: r.height,
            pixels,
        })
    }

    /// Arithmetic mean of every pixel
    pub fn mean(&self) -> EstimateResult<f64> {
        if self.pixels.is_empty() {
            return Err(EstimateError::InvalidInput {
                reason: "empty image",
            });
        }
        let sum: u64 = self.pixels.iter().map(|&p| p as u64).sum();
        Ok(sum as f64 / self.pixels.len() as f64)
    }
}

fn pixel_count(width: u32, height: u32) -> EstimateResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(EstimateError::InvalidInput {
            reason: "image dimensions overflow",
        })
}

/// Stage selection for a [`Conditioner`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConditioningConfig {
    /// Region to keep
    pub roi: RoiSelection,
    /// Lighting normalization
    pub normalization: Normalization,
    /// Specular highlight handling
    pub gloss: GlossFilter,
    /// Buffer to scalar
    pub reduction: Reduction,
}

impl Default for ConditioningConfig {
    /// Centred 256×256 crop, 1/99 percentile stretch, pixels above 230
    /// dropped, mean of the remaining non-zero pixels
    fn default() -> Self {
        Self {
            roi: RoiSelection::default(),
            normalization: Normalization::default(),
            gloss: GlossFilter::default(),
            reduction: Reduction::default(),
        }
    }
}

/// Crop → normalize → gloss → reduce
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Conditioner {
    config: ConditioningConfig,
}

impl Conditioner {
    /// Pipeline running the stages in `config`
    pub fn new(config: ConditioningConfig) -> Self {
        Self { config }
    }

    /// Active stage selection
    pub fn config(&self) -> &ConditioningConfig {
        &self.config
    }

    /// Run every stage on a copy of `image` and return the gray level
    ///
    /// The input is never modified.
    pub fn condition(&self, image: &GrayImage) -> EstimateResult<f64> {
        if image.is_empty() {
            return Err(EstimateError::InvalidInput {
                reason: "empty image",
            });
        }

        let rect = self.config.roi.resolve(image.width(), image.height())?;
        let mut work = image.crop(&rect)?;

        self.config.normalization.apply(&mut work)?;
        self.config.gloss.apply(&mut work)?;
        let level = self.config.reduction.apply(&work)?;

        log_debug!(
            "conditioned {}x{} roi to gray level {}",
            rect.width,
            rect.height,
            level
        );
        Ok(level)
    }
}

//! Region of interest selection
//!
//! Interactive selection (drawing a box on a preview) belongs to the caller;
//! it hands over an `Option<Rectangle>` in preview coordinates. This module
//! maps that back onto the captured frame and clamps it.

use crate::{
    constants::DEFAULT_ROI_SIZE,
    errors::{EstimateError, EstimateResult},
};

/// Axis-aligned pixel rectangle, `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    /// Left edge (px)
    pub x: u32,
    /// Top edge (px)
    pub y: u32,
    /// Width (px)
    pub width: u32,
    /// Height (px)
    pub height: u32,
}

impl Rectangle {
    /// Rectangle with its top-left corner at `(x, y)`
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Intersection with a `width × height` image
    ///
    /// A zero-size rectangle or one lying entirely outside the image is
    /// `InvalidInput`.
    pub fn clamp_to(&self, width: u32, height: u32) -> EstimateResult<Rectangle> {
        if self.width == 0 || self.height == 0 {
            return Err(EstimateError::InvalidInput {
                reason: "region of interest has zero size",
            });
        }
        let x_end = self.x.saturating_add(self.width).min(width);
        let y_end = self.y.saturating_add(self.height).min(height);
        if self.x >= x_end || self.y >= y_end {
            return Err(EstimateError::InvalidInput {
                reason: "region of interest does not intersect the image",
            });
        }
        Ok(Rectangle::new(self.x, self.y, x_end - self.x, y_end - self.y))
    }

    /// Map a rectangle drawn on a scaled preview back to source pixels
    ///
    /// `sx`/`sy` are source size divided by preview size. Each coordinate is
    /// scaled and truncated.
    pub fn rescaled(&self, sx: f64, sy: f64) -> Rectangle {
        let scale = |v: u32, s: f64| {
            let scaled = v as f64 * s;
            if scaled.is_finite() && scaled > 0.0 {
                scaled.min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        Rectangle::new(
            scale(self.x, sx),
            scale(self.y, sy),
            scale(self.width, sx),
            scale(self.height, sy),
        )
    }
}

/// Preview size that fits `max_dimension` while keeping the aspect ratio
///
/// Images already small enough are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    if height > width {
        let w = (width as f64 * (max_dimension as f64 / height as f64)) as u32;
        (w, max_dimension)
    } else {
        let h = (height as f64 * (max_dimension as f64 / width as f64)) as u32;
        (max_dimension, h)
    }
}

/// Which part of the frame feeds the reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "kind"))]
pub enum RoiSelection {
    /// The whole frame
    Full,
    /// A caller-supplied rectangle
    Rect(Rectangle),
    /// A `width × height` window around the frame centre
    Centered {
        width: u32,
        height: u32,
    },
}

impl Default for RoiSelection {
    fn default() -> Self {
        let (width, height) = DEFAULT_ROI_SIZE;
        Self::Centered { width, height }
    }
}

impl From<Option<Rectangle>> for RoiSelection {
    /// No selection means the whole frame
    fn from(selection: Option<Rectangle>) -> Self {
        selection.map_or(Self::Full, Self::Rect)
    }
}

impl RoiSelection {
    /// Concrete rectangle inside a `width × height` frame
    pub fn resolve(&self, width: u32, height: u32) -> EstimateResult<Rectangle> {
        match *self {
            Self::Full => Rectangle::new(0, 0, width, height).clamp_to(width, height),
            Self::Rect(rect) => rect.clamp_to(width, height),
            Self::Centered {
                width: roi_w,
                height: roi_h,
            } => {
                let x = (width / 2).saturating_sub(roi_w / 2);
                let y = (height / 2).saturating_sub(roi_h / 2);
                Rectangle::new(x, y, roi_w, roi_h).clamp_to(width, height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_inside_large_frame() {
        let rect = RoiSelection::default().resolve(1024, 768).unwrap();
        assert_eq!(rect, Rectangle::new(384, 256, 256, 256));
    }

    #[test]
    fn centered_larger_than_frame() {
        let rect = RoiSelection::default().resolve(100, 60).unwrap();
        assert_eq!(rect, Rectangle::new(0, 0, 100, 60));
    }

    #[test]
    fn centered_odd_sizes() {
        // centre 2, start 2 - 1 = 1, end min(5, 4)
        let sel = RoiSelection::Centered { width: 3, height: 1 };
        assert_eq!(sel.resolve(5, 1).unwrap(), Rectangle::new(1, 0, 3, 1));
    }

    #[test]
    fn rect_is_clamped() {
        let sel = RoiSelection::Rect(Rectangle::new(8, 8, 10, 10));
        assert_eq!(sel.resolve(10, 10).unwrap(), Rectangle::new(8, 8, 2, 2));
    }

    #[test]
    fn zero_size_rejected() {
        assert!(Rectangle::new(0, 0, 0, 5).clamp_to(10, 10).is_err());
        assert!(RoiSelection::Full.resolve(0, 0).is_err());
    }

    #[test]
    fn disjoint_rejected() {
        assert!(Rectangle::new(20, 0, 5, 5).clamp_to(10, 10).is_err());
    }

    #[test]
    fn optional_selection() {
        assert_eq!(RoiSelection::from(None), RoiSelection::Full);
        let r = Rectangle::new(1, 2, 3, 4);
        assert_eq!(RoiSelection::from(Some(r)), RoiSelection::Rect(r));
    }

    #[test]
    fn preview_round_trip() {
        let (pw, ph) = fit_within(4000, 3000, 800);
        assert_eq!((pw, ph), (800, 600));
        assert_eq!(fit_within(640, 480, 800), (640, 480));

        let preview = Rectangle::new(100, 50, 200, 100);
        let source = preview.rescaled(4000.0 / pw as f64, 3000.0 / ph as f64);
        assert_eq!(source, Rectangle::new(500, 250, 1000, 500));
    }
}

//! Moisture Estimator
//!
//! ## Overview
//!
//! The estimator ties one calibration strategy to one acquisition channel:
//!
//! ```text
//! RawSample ──channel check──► CalibrationStrategy ──► MoistureEstimate
//! GrayImage ──Conditioner────► gray level ─┘
//! ```
//!
//! It holds no mutable state. Every call is a pure function of its input and
//! the configuration fixed at construction, so one estimator can be shared
//! across threads. Recalibration means building a new estimator and swapping
//! it into an [`EstimatorCell`].
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::calibration::PiecewiseLinear;
//! use soilgauge_core::estimator::{MoistureEstimator, Validity};
//! use soilgauge_core::RawSample;
//!
//! let estimator = MoistureEstimator::analog(PiecewiseLinear::default());
//!
//! let estimate = estimator.estimate(RawSample::adc(365).unwrap()).unwrap();
//! assert_eq!(estimate.percent, 7.5);
//! assert_eq!(estimate.validity, Validity::Valid);
//!
//! // Gray levels belong to the camera channel
//! assert!(estimator.estimate(RawSample::gray(100.0).unwrap()).is_err());
//! ```

use crate::{
    conditioning::{Conditioner, ConditioningConfig, GrayImage},
    errors::{EstimateError, EstimateResult},
    sample::{Channel, RawSample},
    traits::CalibrationStrategy,
};

/// Whether the estimate came from inside the calibrated domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Validity {
    /// Raw value within the calibration domain
    #[default]
    Valid,
    /// Raw value outside the domain; percent is a clamped or extended value
    Extrapolated,
}

impl Validity {
    /// Lower-case name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Extrapolated => "extrapolated",
        }
    }
}

/// Calibrated water content
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoistureEstimate {
    /// Water content (%), never NaN
    pub percent: f64,
    /// Conditioned raw value the estimate was computed from
    pub raw: f64,
    /// Domain flag
    pub validity: Validity,
}

impl MoistureEstimate {
    /// Estimate from inside the calibrated domain
    pub const fn valid(raw: f64, percent: f64) -> Self {
        Self {
            percent,
            raw,
            validity: Validity::Valid,
        }
    }

    /// Estimate from outside the calibrated domain
    pub const fn extrapolated(raw: f64, percent: f64) -> Self {
        Self {
            percent,
            raw,
            validity: Validity::Extrapolated,
        }
    }

    /// True unless the estimate was extrapolated
    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }
}

/// Channel-bound calibration with optional image conditioning
#[derive(Debug, Clone)]
pub struct MoistureEstimator<C> {
    strategy: C,
    conditioner: Conditioner,
    channel: Channel,
}

impl<C: CalibrationStrategy> MoistureEstimator<C> {
    /// Estimator for `channel` with an explicit conditioning pipeline
    pub fn new(strategy: C, channel: Channel, conditioning: ConditioningConfig) -> Self {
        Self {
            strategy,
            conditioner: Conditioner::new(conditioning),
            channel,
        }
    }

    /// Estimator for ADC samples
    pub fn analog(strategy: C) -> Self {
        Self::new(strategy, Channel::Analog, ConditioningConfig::default())
    }

    /// Estimator for camera frames with the default conditioning pipeline
    pub fn camera(strategy: C) -> Self {
        Self::new(strategy, Channel::CameraRoi, ConditioningConfig::default())
    }

    /// Channel accepted by [`estimate`](Self::estimate)
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The calibration in use
    pub fn strategy(&self) -> &C {
        &self.strategy
    }

    /// The conditioning pipeline used by [`estimate_image`](Self::estimate_image)
    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }

    /// Calibrate one raw sample
    ///
    /// A sample from the other channel is `InvalidInput`; it would be
    /// meaningless under this calibration.
    pub fn estimate(&self, sample: RawSample) -> EstimateResult<MoistureEstimate> {
        if sample.channel() != self.channel {
            return Err(EstimateError::InvalidInput {
                reason: "sample channel does not match estimator",
            });
        }
        self.strategy.calibrate(sample.value())
    }

    /// Condition a frame to a gray level and calibrate it
    pub fn estimate_image(&self, image: &GrayImage) -> EstimateResult<MoistureEstimate> {
        if self.channel != Channel::CameraRoi {
            return Err(EstimateError::InvalidInput {
                reason: "image given to an analog estimator",
            });
        }
        let level = self.conditioner.condition(image)?;
        self.estimate(RawSample::gray(level)?)
    }
}

#[cfg(feature = "std")]
pub use cell::EstimatorCell;

#[cfg(feature = "std")]
mod cell {
    use std::sync::{Arc, RwLock};

    use super::MoistureEstimator;

    /// Shared estimator slot supporting hot recalibration
    ///
    /// Readers take a snapshot `Arc` and estimate without holding the lock;
    /// [`swap`](Self::swap) replaces the whole estimator at once, so no reader
    /// ever observes a half-updated calibration.
    #[derive(Debug)]
    pub struct EstimatorCell<C> {
        current: RwLock<Arc<MoistureEstimator<C>>>,
    }

    impl<C> EstimatorCell<C> {
        /// Share `estimator` behind a swappable cell
        pub fn new(estimator: MoistureEstimator<C>) -> Self {
            Self {
                current: RwLock::new(Arc::new(estimator)),
            }
        }

        /// Estimator in effect right now
        pub fn snapshot(&self) -> Arc<MoistureEstimator<C>> {
            match self.current.read() {
                Ok(guard) => Arc::clone(&guard),
                Err(poisoned) => Arc::clone(&poisoned.into_inner()),
            }
        }

        /// Install a new estimator and return the previous one
        pub fn swap(&self, estimator: MoistureEstimator<C>) -> Arc<MoistureEstimator<C>> {
            let next = Arc::new(estimator);
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            log_info!("estimator recalibrated");
            core::mem::replace(&mut *guard, next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{ClosedFormSaturation, PiecewiseLinear};
    use crate::conditioning::{GlossFilter, Normalization, Reduction, RoiSelection};

    fn plain_conditioning() -> ConditioningConfig {
        ConditioningConfig {
            roi: RoiSelection::Full,
            normalization: Normalization::None,
            gloss: GlossFilter::None,
            reduction: Reduction::AllPixels,
        }
    }

    #[test]
    fn analog_estimate() {
        let est = MoistureEstimator::analog(PiecewiseLinear::default());
        let out = est.estimate(RawSample::adc(220).unwrap()).unwrap();
        assert_eq!(out, MoistureEstimate::valid(220.0, 3.0));
    }

    #[test]
    fn channel_mismatch_rejected() {
        let est = MoistureEstimator::camera(ClosedFormSaturation::default());
        assert!(matches!(
            est.estimate(RawSample::adc(100).unwrap()),
            Err(EstimateError::InvalidInput { .. })
        ));

        let analog = MoistureEstimator::analog(PiecewiseLinear::default());
        let img = GrayImage::filled(2, 2, 100).unwrap();
        assert!(analog.estimate_image(&img).is_err());
    }

    #[test]
    fn image_estimate() {
        let est = MoistureEstimator::new(
            ClosedFormSaturation::default(),
            Channel::CameraRoi,
            plain_conditioning(),
        );
        let img = GrayImage::filled(4, 4, 120).unwrap();
        let out = est.estimate_image(&img).unwrap();
        assert_eq!(out.percent, 0.0);
        assert_eq!(out.raw, 120.0);
    }

    #[test]
    fn image_out_of_domain_is_error() {
        let est = MoistureEstimator::new(
            ClosedFormSaturation::default(),
            Channel::CameraRoi,
            plain_conditioning(),
        );
        let img = GrayImage::filled(4, 4, 200).unwrap();
        assert!(matches!(
            est.estimate_image(&img),
            Err(EstimateError::OutOfRange { .. })
        ));
    }

    #[test]
    fn validity_names() {
        assert_eq!(Validity::Valid.as_str(), "valid");
        assert_eq!(Validity::Extrapolated.as_str(), "extrapolated");
        assert!(!MoistureEstimate::extrapolated(1.0, 2.0).is_valid());
    }

    #[cfg(feature = "std")]
    #[test]
    fn cell_swaps_atomically() {
        let cell = EstimatorCell::new(MoistureEstimator::analog(
            PiecewiseLinear::from_pairs(&[(0.0, 0.0), (1000.0, 10.0)]).unwrap(),
        ));
        let before = cell.snapshot();

        cell.swap(MoistureEstimator::analog(
            PiecewiseLinear::from_pairs(&[(0.0, 0.0), (1000.0, 20.0)]).unwrap(),
        ));

        let sample = RawSample::adc(500).unwrap();
        assert_eq!(before.estimate(sample).unwrap().percent, 5.0);
        assert_eq!(cell.snapshot().estimate(sample).unwrap().percent, 10.0);
    }
}

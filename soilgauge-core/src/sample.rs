//! Raw measurements handed from acquisition to the estimator
//!
//! A sample is one scalar. Its variant doubles as the channel identity, which
//! decides the calibration that applies: ADC codes go through point-based
//! calibrations, gray levels through the closed-form model.

use crate::{
    constants::{ADC_MAX_CODE, GRAY_LEVEL_MAX, GRAY_LEVEL_MIN},
    errors::{EstimateError, EstimateResult},
};

/// Acquisition channel a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    /// Analog probe read through a 10-bit ADC
    Analog,
    /// Mean gray level of a camera region of interest
    CameraRoi,
}

/// Single raw measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSample {
    /// 10-bit ADC code in `[0, 1023]`
    AdcCode(u16),
    /// Mean 8-bit gray level in `[0, 255]`
    GrayLevel(f64),
}

impl RawSample {
    /// ADC code, rejected above the 10-bit range
    pub fn adc(code: u16) -> EstimateResult<Self> {
        if code > ADC_MAX_CODE {
            return Err(EstimateError::InvalidInput {
                reason: "ADC code exceeds 10-bit range",
            });
        }
        Ok(Self::AdcCode(code))
    }

    /// Gray level, rejected when non-finite or outside `[0, 255]`
    pub fn gray(level: f64) -> EstimateResult<Self> {
        if !level.is_finite() {
            return Err(EstimateError::InvalidInput {
                reason: "gray level is not a finite number",
            });
        }
        if !(GRAY_LEVEL_MIN..=GRAY_LEVEL_MAX).contains(&level) {
            return Err(EstimateError::InvalidInput {
                reason: "gray level outside 8-bit range",
            });
        }
        Ok(Self::GrayLevel(level))
    }

    /// Channel implied by the variant
    pub fn channel(&self) -> Channel {
        match self {
            Self::AdcCode(_) => Channel::Analog,
            Self::GrayLevel(_) => Channel::CameraRoi,
        }
    }

    /// Scalar value in acquisition units
    pub fn value(&self) -> f64 {
        match *self {
            Self::AdcCode(code) => f64::from(code),
            Self::GrayLevel(level) => level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_range() {
        assert_eq!(RawSample::adc(0).unwrap().value(), 0.0);
        assert_eq!(RawSample::adc(1023).unwrap().value(), 1023.0);
        assert!(matches!(
            RawSample::adc(1024),
            Err(EstimateError::InvalidInput { .. })
        ));
    }

    #[test]
    fn gray_range() {
        assert!(RawSample::gray(0.0).is_ok());
        assert!(RawSample::gray(255.0).is_ok());
        assert!(RawSample::gray(-0.5).is_err());
        assert!(RawSample::gray(255.5).is_err());
        assert!(RawSample::gray(f64::NAN).is_err());
    }

    #[test]
    fn channel_follows_variant() {
        assert_eq!(RawSample::AdcCode(10).channel(), Channel::Analog);
        assert_eq!(RawSample::GrayLevel(10.0).channel(), Channel::CameraRoi);
    }
}

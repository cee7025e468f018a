//! Closed-Form Saturation Model
//!
//! ## Physics Background
//!
//! Wet soil absorbs more light than dry soil, and the darkening saturates as
//! pore water fills the surface. Over the usable range the measured gray level
//! `G` falls off with the square of water content, which inverts to:
//!
//! ```text
//! ratio = (G - GL_s) / (GL_0 - GL_s)
//! θ     = θ_s · (1 - √ratio)
//!
//! Where:
//! - GL_0 = gray level of dry soil (θ = 0)
//! - GL_s = gray level of saturated soil (θ = θ_s)
//! - θ_s  = saturated moisture content (%)
//! ```
//!
//! `G = GL_0` gives exactly 0% and `G = GL_s` gives exactly `θ_s`.
//!
//! ## Endpoint Conventions
//!
//! Under normal lighting dry soil is the brighter end (`GL_s < GL_0`). Some
//! captures (backlit, inverted normalization) report the opposite ordering;
//! [`EndpointConvention`] states which one the constants follow and
//! construction rejects constants that contradict it.
//!
//! ## Domain
//!
//! The model is only defined for `G` between the two endpoints. Outside,
//! [`OutOfRangePolicy::Strict`] fails with `OutOfRange`, while
//! [`OutOfRangePolicy::Clamp`] evaluates at the nearer endpoint, flags the
//! estimate extrapolated and logs a warning.

use libm::sqrt;

use crate::{
    constants::{DRY_GRAY_LEVEL, SATURATED_GRAY_LEVEL, SATURATED_MOISTURE_PCT},
    errors::{EstimateError, EstimateResult},
    estimator::{MoistureEstimate, Validity},
    traits::CalibrationStrategy,
};

use super::{check_finite, OutOfRangePolicy};

/// Which endpoint is brighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EndpointConvention {
    /// Dry soil is brighter: `GL_s < GL_0`
    #[default]
    DryBright,
    /// Saturated soil is brighter: `GL_0 < GL_s`
    WetBright,
}

/// Physical constants of the closed-form model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalConstants {
    /// Dry soil gray level `GL_0`
    pub gl_0: f64,
    /// Saturated soil gray level `GL_s`
    pub gl_s: f64,
    /// Saturated moisture content `θ_s` (%)
    pub theta_s: f64,
    /// Endpoint ordering the constants follow
    pub convention: EndpointConvention,
}

impl PhysicalConstants {
    /// Constants as measured; validated by `ClosedFormSaturation::new`
    pub const fn new(gl_0: f64, gl_s: f64, theta_s: f64, convention: EndpointConvention) -> Self {
        Self {
            gl_0,
            gl_s,
            theta_s,
            convention,
        }
    }

    /// Check the constants describe a usable model
    pub fn validate(&self) -> EstimateResult<()> {
        if !self.gl_0.is_finite() || !self.gl_s.is_finite() || !self.theta_s.is_finite() {
            return Err(EstimateError::InvalidCalibration {
                reason: "physical constants must be finite",
            });
        }
        if self.theta_s <= 0.0 {
            return Err(EstimateError::InvalidCalibration {
                reason: "saturated moisture content must be positive",
            });
        }
        if self.gl_0 == self.gl_s {
            return Err(EstimateError::InvalidCalibration {
                reason: "dry and saturated gray levels must differ",
            });
        }
        let ordered = match self.convention {
            EndpointConvention::DryBright => self.gl_s < self.gl_0,
            EndpointConvention::WetBright => self.gl_0 < self.gl_s,
        };
        if !ordered {
            return Err(EstimateError::InvalidCalibration {
                reason: "gray level endpoints contradict the endpoint convention",
            });
        }
        Ok(())
    }

    /// `(darker endpoint, brighter endpoint)`
    pub fn domain(&self) -> (f64, f64) {
        if self.gl_0 < self.gl_s {
            (self.gl_0, self.gl_s)
        } else {
            (self.gl_s, self.gl_0)
        }
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::new(
            DRY_GRAY_LEVEL,
            SATURATED_GRAY_LEVEL,
            SATURATED_MOISTURE_PCT,
            EndpointConvention::DryBright,
        )
    }
}

/// Gray level to moisture through the square-root saturation model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedFormSaturation {
    constants: PhysicalConstants,
    policy: OutOfRangePolicy,
}

impl ClosedFormSaturation {
    /// Validate the constants and build the model
    pub fn new(constants: PhysicalConstants, policy: OutOfRangePolicy) -> EstimateResult<Self> {
        constants.validate()?;
        Ok(Self { constants, policy })
    }

    /// The model's constants
    pub fn constants(&self) -> PhysicalConstants {
        self.constants
    }

    /// Active out-of-range policy
    pub fn policy(&self) -> OutOfRangePolicy {
        self.policy
    }

    /// Same constants, different policy
    pub fn with_policy(self, policy: OutOfRangePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Gray level the model predicts for a moisture percentage
    ///
    /// Inverse of [`calibrate`](CalibrationStrategy::calibrate) on
    /// `[0, θ_s]`: `G = GL_s + (GL_0 - GL_s) · (1 - θ/θ_s)²`.
    pub fn expected_gray_level(&self, percent: f64) -> EstimateResult<f64> {
        check_finite(percent)?;
        let c = &self.constants;
        if !(0.0..=c.theta_s).contains(&percent) {
            return Err(EstimateError::OutOfRange {
                value: percent,
                min: 0.0,
                max: c.theta_s,
            });
        }
        let root = 1.0 - percent / c.theta_s;
        Ok(c.gl_s + (c.gl_0 - c.gl_s) * root * root)
    }

    fn evaluate(&self, gray: f64) -> EstimateResult<f64> {
        let c = &self.constants;
        let ratio = (gray - c.gl_s) / (c.gl_0 - c.gl_s);
        if !(0.0..=1.0).contains(&ratio) {
            let (min, max) = c.domain();
            return Err(EstimateError::OutOfRange { value: gray, min, max });
        }
        Ok(c.theta_s * (1.0 - sqrt(ratio)))
    }
}

impl Default for ClosedFormSaturation {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            policy: OutOfRangePolicy::Strict,
        }
    }
}

impl CalibrationStrategy for ClosedFormSaturation {
    fn calibrate(&self, raw: f64) -> EstimateResult<MoistureEstimate> {
        check_finite(raw)?;

        let (min, max) = self.constants.domain();
        if (min..=max).contains(&raw) {
            return Ok(MoistureEstimate::valid(raw, self.evaluate(raw)?));
        }

        match self.policy {
            OutOfRangePolicy::Strict => Err(EstimateError::OutOfRange { value: raw, min, max }),
            OutOfRangePolicy::Clamp => {
                let edge = raw.clamp(min, max);
                log_warn!(
                    "gray level {} outside [{}, {}], evaluated at {}",
                    raw,
                    min,
                    max,
                    edge
                );
                Ok(MoistureEstimate {
                    percent: self.evaluate(edge)?,
                    raw,
                    validity: Validity::Extrapolated,
                })
            }
        }
    }

    fn domain(&self) -> (f64, f64) {
        self.constants.domain()
    }

    fn name(&self) -> &'static str {
        "ClosedFormSaturation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::calibration::MIN_MAX_RUN_CONSTANTS;

    fn min_max_run(policy: OutOfRangePolicy) -> ClosedFormSaturation {
        let (gl_0, gl_s, theta_s) = MIN_MAX_RUN_CONSTANTS;
        ClosedFormSaturation::new(
            PhysicalConstants::new(gl_0, gl_s, theta_s, EndpointConvention::DryBright),
            policy,
        )
        .unwrap()
    }

    #[test]
    fn endpoints_are_exact() {
        let model = ClosedFormSaturation::default();
        assert_eq!(model.calibrate(DRY_GRAY_LEVEL).unwrap().percent, 0.0);
        assert_eq!(
            model.calibrate(SATURATED_GRAY_LEVEL).unwrap().percent,
            SATURATED_MOISTURE_PCT
        );
    }

    #[test]
    fn midpoint_of_min_max_run() {
        let est = min_max_run(OutOfRangePolicy::Strict).calibrate(116.0).unwrap();
        let expected = 50.0 * (1.0 - sqrt(0.5));
        assert!((est.percent - expected).abs() < 1e-12);
        assert!((est.percent - 14.64).abs() < 0.01);
        assert_eq!(est.validity, Validity::Valid);
    }

    #[test]
    fn strict_rejects_outside() {
        let model = min_max_run(OutOfRangePolicy::Strict);
        assert_eq!(
            model.calibrate(160.0),
            Err(EstimateError::OutOfRange {
                value: 160.0,
                min: 75.0,
                max: 157.0
            })
        );
        assert!(model.calibrate(70.0).is_err());
    }

    #[test]
    fn clamp_evaluates_at_edge() {
        let model = min_max_run(OutOfRangePolicy::Clamp);

        let bright = model.calibrate(160.0).unwrap();
        assert_eq!(bright.percent, 0.0);
        assert_eq!(bright.validity, Validity::Extrapolated);
        assert_eq!(bright.raw, 160.0);

        let dark = model.calibrate(60.0).unwrap();
        assert_eq!(dark.percent, 50.0);
        assert_eq!(dark.validity, Validity::Extrapolated);
    }

    #[test]
    fn wet_bright_convention() {
        let model = ClosedFormSaturation::new(
            PhysicalConstants::new(80.0, 180.0, 40.0, EndpointConvention::WetBright),
            OutOfRangePolicy::Strict,
        )
        .unwrap();
        assert_eq!(model.calibrate(80.0).unwrap().percent, 0.0);
        assert_eq!(model.calibrate(180.0).unwrap().percent, 40.0);
        let mid = model.calibrate(130.0).unwrap().percent;
        assert!((mid - 40.0 * (1.0 - sqrt(0.5))).abs() < 1e-12);
    }

    #[test]
    fn convention_mismatch_rejected() {
        let result = ClosedFormSaturation::new(
            PhysicalConstants::new(95.0, 120.0, 17.0, EndpointConvention::DryBright),
            OutOfRangePolicy::Strict,
        );
        assert!(matches!(result, Err(EstimateError::InvalidCalibration { .. })));
    }

    #[test]
    fn degenerate_constants_rejected() {
        let equal = PhysicalConstants::new(100.0, 100.0, 17.0, EndpointConvention::DryBright);
        assert!(ClosedFormSaturation::new(equal, OutOfRangePolicy::Strict).is_err());

        let zero_ceiling = PhysicalConstants::new(120.0, 95.0, 0.0, EndpointConvention::DryBright);
        assert!(ClosedFormSaturation::new(zero_ceiling, OutOfRangePolicy::Strict).is_err());

        let nan = PhysicalConstants::new(f64::NAN, 95.0, 17.0, EndpointConvention::DryBright);
        assert!(ClosedFormSaturation::new(nan, OutOfRangePolicy::Strict).is_err());
    }

    #[test]
    fn inverse_round_trips() {
        let model = ClosedFormSaturation::default();
        let gray = model.expected_gray_level(8.5).unwrap();
        let back = model.calibrate(gray).unwrap().percent;
        assert!((back - 8.5).abs() < 1e-9);
        assert!(model.expected_gray_level(18.0).is_err());
    }
}

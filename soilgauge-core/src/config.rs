//! Estimator Configuration
//!
//! ## Overview
//!
//! A JSON document selects the calibration strategy, its parameters and the
//! conditioning pipeline. Every key is optional; missing keys take the
//! defaults from [`crate::constants`]. Unknown keys are rejected so a typo
//! never silently falls back to a default.
//!
//! ```json
//! {
//!   "strategy": "closed_form",
//!   "gl_0": 157.0, "gl_s": 75.0, "theta_s": 50.0,
//!   "convention": "dry_bright",
//!   "policy": "clamp",
//!   "roi_size": [256, 256],
//!   "gloss_threshold": 230,
//!   "normalization": "min_max"
//! }
//! ```
//!
//! Interpolation and regression configs build analog estimators; closed-form
//! configs build camera estimators. `channel` overrides that choice, e.g. to
//! interpolate measured gray levels.
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::config::EstimatorConfig;
//! use soilgauge_core::RawSample;
//!
//! let config = EstimatorConfig::from_json(r#"{ "strategy": "regression" }"#).unwrap();
//! let estimator = config.build().unwrap();
//! let estimate = estimator.estimate(RawSample::adc(450).unwrap()).unwrap();
//! assert!(estimate.percent > 0.0);
//! ```

use std::{fs, path::Path};
use crate::traits::CalibrationStrategy;

use thiserror_no_std::Error;

use crate::{
    calibration::{
        Calibration, CalibrationPoint, ClosedFormSaturation, EndpointConvention, LinearRegression,
        OutOfRangePolicy, PhysicalConstants, PiecewiseLinear,
    },
    conditioning::{ConditioningConfig, GlossFilter, Normalization, Rectangle, Reduction, RoiSelection},
    constants::{
        DEFAULT_ADC_CALIBRATION, DEFAULT_GLOSS_MARGIN, DEFAULT_GLOSS_THRESHOLD,
        DEFAULT_PERCENTILE_HIGH, DEFAULT_PERCENTILE_LOW, DEFAULT_ROI_SIZE, DRY_GRAY_LEVEL,
        SATURATED_GRAY_LEVEL, SATURATED_MOISTURE_PCT,
    },
    errors::EstimateError,
    estimator::MoistureEstimator,
    sample::Channel,
};

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Document is not valid JSON or has unexpected keys/values
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Values parsed but do not define a usable estimator
    #[error("Config rejected: {0}")]
    Calibration(#[from] EstimateError),
}

/// Calibration strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Piecewise-linear interpolation over `points`
    #[default]
    Interpolation,
    /// Least-squares line over `points`, floored at 0%
    Regression,
    /// Square-root model over `gl_0`, `gl_s`, `theta_s`
    ClosedForm,
}

/// Normalization selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationKind {
    /// Stretch between `percentiles`
    #[default]
    Percentile,
    /// Stretch between the image minimum and maximum
    MinMax,
    /// No normalization
    None,
}

/// Gloss filter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlossKind {
    /// Zero pixels above `gloss_threshold`
    #[default]
    RemoveAbove,
    /// Replace pixels above mean + `gloss_margin` with the mean
    ReplaceWithMean,
    /// Keep every pixel
    None,
}

/// Everything needed to build a [`MoistureEstimator`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Calibration strategy to build
    pub strategy: StrategyKind,
    /// `(raw, percent)` pairs for interpolation and regression
    pub points: Vec<(f64, f64)>,
    /// Dry soil gray level
    pub gl_0: f64,
    /// Saturated soil gray level
    pub gl_s: f64,
    /// Saturated moisture content (%)
    pub theta_s: f64,
    /// Which endpoint is the dry one
    pub convention: EndpointConvention,
    /// Behaviour outside `[gl_s, gl_0]`
    pub policy: OutOfRangePolicy,
    /// Overrides the channel implied by `strategy`
    pub channel: Option<Channel>,
    /// Centred crop size `[width, height]`
    pub roi_size: (u32, u32),
    /// Explicit crop; takes precedence over `roi_size`
    pub roi: Option<Rectangle>,
    /// Contrast stretch before gloss removal
    pub normalization: NormalizationKind,
    /// `[low, high]` for percentile normalization
    pub percentiles: (f64, f64),
    /// Specular highlight handling
    pub gloss: GlossKind,
    /// Gray level treated as a highlight
    pub gloss_threshold: u8,
    /// Margin above the frame mean for mean replacement
    pub gloss_margin: f64,
    /// How the conditioned frame becomes one gray level
    pub reduction: Reduction,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            points: DEFAULT_ADC_CALIBRATION.to_vec(),
            gl_0: DRY_GRAY_LEVEL,
            gl_s: SATURATED_GRAY_LEVEL,
            theta_s: SATURATED_MOISTURE_PCT,
            convention: EndpointConvention::default(),
            policy: OutOfRangePolicy::default(),
            channel: None,
            roi_size: DEFAULT_ROI_SIZE,
            roi: None,
            normalization: NormalizationKind::default(),
            percentiles: (DEFAULT_PERCENTILE_LOW, DEFAULT_PERCENTILE_HIGH),
            gloss: GlossKind::default(),
            gloss_threshold: DEFAULT_GLOSS_THRESHOLD,
            gloss_margin: DEFAULT_GLOSS_MARGIN,
            reduction: Reduction::default(),
        }
    }
}

impl EstimatorConfig {
    /// Parse a JSON document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log_info!("loaded estimator config from {}", path.display());
        Ok(config)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Channel the built estimator accepts
    pub fn channel(&self) -> Channel {
        self.channel.unwrap_or(match self.strategy {
            StrategyKind::Interpolation | StrategyKind::Regression => Channel::Analog,
            StrategyKind::ClosedForm => Channel::CameraRoi,
        })
    }

    /// The calibration strategy alone
    pub fn calibration(&self) -> Result<Calibration, ConfigError> {
        let calibration: Calibration = match self.strategy {
            StrategyKind::Interpolation => PiecewiseLinear::new(&self.calibration_points())?.into(),
            StrategyKind::Regression => LinearRegression::new(&self.calibration_points())?.into(),
            StrategyKind::ClosedForm => ClosedFormSaturation::new(
                PhysicalConstants::new(self.gl_0, self.gl_s, self.theta_s, self.convention),
                self.policy,
            )?
            .into(),
        };
        Ok(calibration)
    }

    /// The conditioning pipeline alone
    pub fn conditioning(&self) -> Result<ConditioningConfig, ConfigError> {
        let roi = match self.roi {
            Some(rect) => RoiSelection::Rect(rect),
            None => {
                let (width, height) = self.roi_size;
                if width == 0 || height == 0 {
                    return Err(EstimateError::InvalidInput {
                        reason: "roi_size must be non-zero",
                    }
                    .into());
                }
                RoiSelection::Centered { width, height }
            }
        };

        let normalization = match self.normalization {
            NormalizationKind::None => Normalization::None,
            NormalizationKind::MinMax => Normalization::min_max(),
            NormalizationKind::Percentile => {
                let (low, high) = self.percentiles;
                if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
                    return Err(EstimateError::InvalidInput {
                        reason: "percentiles must satisfy 0 <= low < high <= 100",
                    }
                    .into());
                }
                Normalization::Percentile { low, high }
            }
        };

        let gloss = match self.gloss {
            GlossKind::None => GlossFilter::None,
            GlossKind::RemoveAbove => GlossFilter::RemoveAbove {
                threshold: self.gloss_threshold,
            },
            GlossKind::ReplaceWithMean => {
                if !self.gloss_margin.is_finite() {
                    return Err(EstimateError::InvalidInput {
                        reason: "gloss_margin must be finite",
                    }
                    .into());
                }
                GlossFilter::ReplaceWithMean {
                    margin: self.gloss_margin,
                }
            }
        };

        Ok(ConditioningConfig {
            roi,
            normalization,
            gloss,
            reduction: self.reduction,
        })
    }

    /// Validate everything and build the estimator
    pub fn build(&self) -> Result<MoistureEstimator<Calibration>, ConfigError> {
        let calibration = self.calibration()?;
        let conditioning = self.conditioning()?;
        log_debug!(
            "building {} estimator on {:?} channel",
            calibration.name(),
            self.channel()
        );
        Ok(MoistureEstimator::new(calibration, self.channel(), conditioning))
    }

    fn calibration_points(&self) -> Vec<CalibrationPoint> {
        self.points.iter().map(|&pair| pair.into()).collect()
    }
}

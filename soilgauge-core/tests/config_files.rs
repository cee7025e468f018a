//! Loading estimator configurations from disk

#![cfg(feature = "std")]

use std::io::Write;

use soilgauge_core::{
    config::{EstimatorConfig, StrategyKind},
    conditioning::{GlossFilter, GrayImage, Normalization, RoiSelection},
    CalibrationStrategy, Channel, ConfigError, EstimateError, RawSample, Validity,
};
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn probe_config_from_file() {
    let file = write_config(
        r#"{
            "strategy": "interpolation",
            "points": [[680, 15.0], [220, 3.0], [365, 7.5]]
        }"#,
    );

    let estimator = EstimatorConfig::from_file(file.path()).unwrap().build().unwrap();
    assert_eq!(estimator.channel(), Channel::Analog);

    let est = estimator.estimate(RawSample::adc(522).unwrap()).unwrap();
    let expected = 7.5 + 7.5 * (522.0 - 365.0) / 315.0;
    assert!((est.percent - expected).abs() < 1e-12);
}

#[test]
fn regression_config_from_file() {
    let file = write_config(
        r#"{
            "strategy": "regression",
            "points": [[649, 20], [494.5, 15], [286, 10], [84, 5]]
        }"#,
    );

    let estimator = EstimatorConfig::from_file(file.path()).unwrap().build().unwrap();
    assert_eq!(estimator.strategy().name(), "LinearRegression");

    let floor = estimator.estimate(RawSample::adc(0).unwrap()).unwrap();
    assert!(floor.percent >= 0.0);
    assert_eq!(floor.validity, Validity::Extrapolated);
}

#[test]
fn camera_config_drives_conditioning() {
    let file = write_config(
        r#"{
            "strategy": "closed_form",
            "gl_0": 157, "gl_s": 75, "theta_s": 50,
            "roi": { "x": 0, "y": 0, "width": 8, "height": 8 },
            "normalization": "none",
            "gloss": "none",
            "reduction": "all_pixels"
        }"#,
    );

    let config = EstimatorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.strategy, StrategyKind::ClosedForm);

    let estimator = config.build().unwrap();
    let cond = estimator.conditioner().config();
    assert!(matches!(cond.roi, RoiSelection::Rect(_)));
    assert_eq!(cond.normalization, Normalization::None);
    assert_eq!(cond.gloss, GlossFilter::None);

    // Soil patch in the top-left corner of a bright tray
    let mut pixels = vec![250u8; 32 * 32];
    for y in 0..8 {
        for x in 0..8 {
            pixels[y * 32 + x] = 116;
        }
    }
    let frame = GrayImage::new(32, 32, pixels).unwrap();

    let est = estimator.estimate_image(&frame).unwrap();
    assert!((est.percent - 14.64).abs() < 0.01);
}

#[test]
fn saved_config_reloads() {
    let config = EstimatorConfig {
        strategy: StrategyKind::ClosedForm,
        gl_0: 157.0,
        gl_s: 75.0,
        theta_s: 50.0,
        ..EstimatorConfig::default()
    };

    let file = write_config(&config.to_json_pretty().unwrap());
    assert_eq!(EstimatorConfig::from_file(file.path()).unwrap(), config);
}

#[test]
fn malformed_file_is_parse_error() {
    let file = write_config(r#"{ "strategy": "closed_form", "#);
    assert!(matches!(
        EstimatorConfig::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));

    let file = write_config(r#"{ "strategy": "spline" }"#);
    assert!(matches!(
        EstimatorConfig::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn duplicate_points_fail_at_build() {
    let file = write_config(r#"{ "points": [[300, 5.0], [300, 6.0], [500, 9.0]] }"#);
    let config = EstimatorConfig::from_file(file.path()).unwrap();
    assert!(matches!(
        config.build(),
        Err(ConfigError::Calibration(EstimateError::InvalidCalibration { .. }))
    ));
}

//! Camera Gray Level Example
//!
//! Estimates water content from a photo of a soil sample: the frame is
//! cropped, normalized, cleaned of specular highlights and reduced to one
//! gray level, which the square-root saturation model turns into percent.
//!
//! ## What You'll Learn
//!
//! - Converting a BGR capture into a gray image
//! - Choosing conditioning stages
//! - Strict versus clamping behaviour outside the calibrated band
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_gray_level
//! ```

use soilgauge_core::{
    calibration::{ClosedFormSaturation, EndpointConvention, OutOfRangePolicy, PhysicalConstants},
    conditioning::{
        ConditioningConfig, GlossFilter, GrayImage, Normalization, Reduction, RoiSelection,
    },
    estimator::MoistureEstimator,
    CalibrationStrategy, Channel, EstimateError,
};

/// Simulated 320×240 capture: soil of `level` with a few glints, on a white tray
fn capture(level: u8) -> Vec<u8> {
    let (width, height) = (320u32, 240u32);
    let mut bgr = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let on_soil = (60..260).contains(&x) && (40..200).contains(&y);
            let glint = on_soil && x % 37 == 0 && y % 23 == 0;
            let v = match (on_soil, glint) {
                (true, true) => 255,
                (true, false) => level.saturating_add(((x + y) % 5) as u8).saturating_sub(2),
                (false, _) => 240,
            };
            bgr.extend_from_slice(&[v, v, v]);
        }
    }
    bgr
}

fn main() -> Result<(), EstimateError> {
    println!("SoilGauge Gray Level Example");
    println!("============================\n");

    let constants = PhysicalConstants::new(157.0, 75.0, 50.0, EndpointConvention::DryBright);
    let strict = ClosedFormSaturation::new(constants, OutOfRangePolicy::Strict)?;
    let clamp = strict.with_policy(OutOfRangePolicy::Clamp);

    println!("Model: dry {} / saturated {} / ceiling {}%", constants.gl_0, constants.gl_s, constants.theta_s);
    for percent in [0.0, 10.0, 25.0, 50.0] {
        println!("  {:>4.1}% looks like gray {:.1}", percent, strict.expected_gray_level(percent)?);
    }
    println!();

    let conditioning = ConditioningConfig {
        roi: RoiSelection::Centered { width: 160, height: 120 },
        normalization: Normalization::None,
        gloss: GlossFilter::RemoveAbove { threshold: 230 },
        reduction: Reduction::ExcludeZero,
    };
    let estimator = MoistureEstimator::new(strict, Channel::CameraRoi, conditioning);

    for level in [150u8, 116, 90] {
        let frame = GrayImage::from_bgr8(320, 240, &capture(level))?;
        let gray = estimator.conditioner().condition(&frame)?;
        let estimate = estimator.estimate_image(&frame)?;
        println!("soil at {:3}: gray {:6.2} -> {:5.2}%", level, gray, estimate.percent);
    }
    println!();

    println!("Outside the calibrated band [75, 157]:");
    for gray in [60.0, 170.0] {
        match strict.calibrate(gray) {
            Ok(est) => println!("  strict {gray}: {:.2}%", est.percent),
            Err(e) => println!("  strict {gray}: {e}"),
        }
        let est = clamp.calibrate(gray)?;
        println!("  clamp  {gray}: {:.2}% ({})", est.percent, est.validity.as_str());
    }

    Ok(())
}

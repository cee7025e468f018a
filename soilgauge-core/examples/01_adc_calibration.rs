//! Analog Probe Calibration Example
//!
//! Converts 10-bit ADC codes from a capacitive soil probe into water content
//! with the two point-based calibrations.
//!
//! ## What You'll Learn
//!
//! - Building a piecewise-linear table from gravimetric reference points
//! - Fitting a least-squares line to replicate readings
//! - Telling valid estimates from extrapolated ones
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_adc_calibration
//! ```

use soilgauge_core::{
    calibration::{LinearRegression, PiecewiseLinear},
    estimator::MoistureEstimator,
    CalibrationPoint, EstimateError, RawSample,
};

fn main() -> Result<(), EstimateError> {
    println!("SoilGauge ADC Calibration Example");
    println!("=================================\n");

    // Three gravimetric reference levels of the same pot
    let table = PiecewiseLinear::from_pairs(&[(220.0, 3.0), (365.0, 7.5), (680.0, 15.0)])?;
    println!("Interpolation table:");
    for point in table.set().points() {
        println!("  raw {:6.1} -> {:5.2}%", point.raw, point.percent);
    }
    println!();

    // Four reads per level, averaged into one point each
    let replicates = [
        (20.0, [650.0, 648.0, 646.0, 652.0]),
        (15.0, [480.0, 506.0, 510.0, 482.0]),
        (10.0, [280.0, 305.0, 295.0, 264.0]),
        (5.0, [80.0, 91.0, 88.0, 77.0]),
    ];
    let points = replicates
        .iter()
        .map(|(percent, reads)| CalibrationPoint::from_replicates(reads, *percent))
        .collect::<Result<Vec<_>, _>>()?;
    let regression = LinearRegression::new(&points)?;

    let fit = regression.fit();
    println!("Regression line:");
    println!("  percent = {:.5} * raw + {:.4}", fit.slope, fit.intercept);
    println!("  R² = {:.4}", fit.r_squared(regression.set().points()));
    println!();

    let by_table = MoistureEstimator::analog(table);
    let by_line = MoistureEstimator::analog(regression);

    println!("{:>6}  {:>16}  {:>16}", "code", "interpolation", "regression");
    for code in [0u16, 150, 220, 365, 492, 680, 900, 1023] {
        let sample = RawSample::adc(code)?;
        let a = by_table.estimate(sample)?;
        let b = by_line.estimate(sample)?;
        println!(
            "{:>6}  {:>6.2}% {:<9}  {:>6.2}% {:<9}",
            code,
            a.percent,
            a.validity.as_str(),
            b.percent,
            b.validity.as_str()
        );
    }

    println!();
    match RawSample::adc(2048) {
        Ok(_) => println!("unexpected: 2048 accepted"),
        Err(e) => println!("Code 2048 rejected: {}", e),
    }

    Ok(())
}

//! Shared fixtures for integration tests
//!
//! - Reference calibrations measured on the bench setup
//! - Synthetic soil frames with deterministic noise and specular spots
//! - A scripted SPI bus standing in for the MCP3008

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use soilgauge_core::{
    calibration::{
        ClosedFormSaturation, EndpointConvention, LinearRegression, OutOfRangePolicy,
        PhysicalConstants, PiecewiseLinear,
    },
    conditioning::GrayImage,
    traits::SpiBus,
    AcquisitionError,
};

/// Three-point probe calibration `(raw, %)`
pub const PROBE_POINTS: [(f64, f64); 3] = [(220.0, 3.0), (365.0, 7.5), (680.0, 15.0)];

/// Four-level characterisation run, four replicate reads per level
pub const REPLICATE_RUN: [(f64, [f64; 4]); 4] = [
    (20.0, [650.0, 648.0, 646.0, 652.0]),
    (15.0, [480.0, 506.0, 510.0, 482.0]),
    (10.0, [280.0, 305.0, 295.0, 264.0]),
    (5.0, [80.0, 91.0, 88.0, 77.0]),
];

pub fn probe_interpolation() -> PiecewiseLinear {
    PiecewiseLinear::from_pairs(&PROBE_POINTS).unwrap()
}

pub fn replicate_regression() -> LinearRegression {
    let points: Vec<_> = REPLICATE_RUN
        .iter()
        .map(|(pct, reads)| {
            soilgauge_core::CalibrationPoint::from_replicates(reads, *pct).unwrap()
        })
        .collect();
    LinearRegression::new(&points).unwrap()
}

/// Dry 157, saturated 75, ceiling 50%
pub fn min_max_model(policy: OutOfRangePolicy) -> ClosedFormSaturation {
    ClosedFormSaturation::new(
        PhysicalConstants::new(157.0, 75.0, 50.0, EndpointConvention::DryBright),
        policy,
    )
    .unwrap()
}

/// Small deterministic generator for pixel noise
pub struct Lcg(u32);

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self(seed)
    }

    pub fn next_u8(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 24) as u8
    }

    /// Uniform in `[-spread, spread]`
    pub fn jitter(&mut self, spread: i16) -> i16 {
        let span = (2 * spread + 1) as u16;
        (self.next_u8() as u16 % span) as i16 - spread
    }
}

/// Soil patch around `level` with ±`spread` noise
pub fn soil_frame(width: u32, height: u32, level: u8, spread: i16, seed: u32) -> GrayImage {
    let mut rng = Lcg::new(seed);
    let pixels = (0..width * height)
        .map(|_| (level as i16 + rng.jitter(spread)).clamp(0, 255) as u8)
        .collect();
    GrayImage::new(width, height, pixels).unwrap()
}

/// Same frame with a square specular highlight of `size` pixels at `(x, y)`
pub fn with_glare(image: &GrayImage, x: u32, y: u32, size: u32) -> GrayImage {
    let mut pixels = image.pixels().to_vec();
    for row in y..(y + size).min(image.height()) {
        for col in x..(x + size).min(image.width()) {
            pixels[(row * image.width() + col) as usize] = 255;
        }
    }
    GrayImage::new(image.width(), image.height(), pixels).unwrap()
}

/// Interleaved BGR frame of a uniform colour
pub fn bgr_frame(width: u32, height: u32, bgr: [u8; 3]) -> Vec<u8> {
    (0..width * height).flat_map(|_| bgr).collect()
}

/// Observable state of a [`ScriptedBus`]
#[derive(Debug, Default)]
pub struct BusLog {
    pub frames_sent: Vec<[u8; 3]>,
    pub closed: u32,
}

/// SPI bus answering with a scripted sequence of 10-bit codes
pub struct ScriptedBus {
    codes: Vec<u16>,
    next: usize,
    log: Rc<RefCell<BusLog>>,
}

impl ScriptedBus {
    pub fn new(codes: &[u16]) -> (Self, Rc<RefCell<BusLog>>) {
        let log = Rc::new(RefCell::new(BusLog::default()));
        let bus = Self {
            codes: codes.to_vec(),
            next: 0,
            log: Rc::clone(&log),
        };
        (bus, log)
    }
}

impl SpiBus for ScriptedBus {
    fn transfer(&mut self, frame: &mut [u8; 3]) -> Result<(), AcquisitionError> {
        let code = *self
            .codes
            .get(self.next)
            .ok_or(AcquisitionError::Bus { reason: "script exhausted" })?;
        self.next += 1;
        self.log.borrow_mut().frames_sent.push(*frame);
        *frame = [0x00, (code >> 8) as u8 & 0x03, code as u8];
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

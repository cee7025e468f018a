//! Core Traits and Abstractions for SoilGauge
//!
//! The estimator is three layers composed left to right. Each seam between a
//! layer and the outside world is a trait defined here, so calibration math can
//! be exercised without hardware and hardware can be swapped without touching
//! calibration.
//!
//! ## Module Organization
//!
//! - [`calibration`] - `CalibrationStrategy`, the conditioned-scalar → percent map
//! - [`acquisition`] - `SampleSource`, `SpiBus`, `FrameSource` collaborators
//! - [`report`] - `ReportSink`, where finished estimates go
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::traits::CalibrationStrategy;
//! use soilgauge_core::calibration::{CalibrationPoint, PiecewiseLinear};
//!
//! let strategy = PiecewiseLinear::new(&[
//!     CalibrationPoint::new(220.0, 3.0),
//!     CalibrationPoint::new(680.0, 15.0),
//! ])?;
//!
//! let estimate = strategy.calibrate(450.0)?;
//! assert_eq!(estimate.percent, 9.0);
//! # Ok::<(), soilgauge_core::EstimateError>(())
//! ```

pub mod calibration;
pub mod acquisition;
pub mod report;

pub use calibration::CalibrationStrategy;
pub use acquisition::{SampleSource, SpiBus, FrameSource};
pub use report::ReportSink;
pub use crate::time::TimeSource;

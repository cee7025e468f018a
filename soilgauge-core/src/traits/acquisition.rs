//! Acquisition Traits
//!
//! Hardware and capture collaborators. The estimator consumes plain scalars
//! and buffers; anything that may block (a bus transfer, a camera capture)
//! sits behind these traits and reports "not ready yet" through
//! `nb::Error::WouldBlock` instead of blocking inside the calibration path.
//!
//! ## Error Handling
//!
//! Sources use the two-level `nb` model:
//! - `nb::Error::WouldBlock` - no sample ready, poll again later
//! - `nb::Error::Other(e)` - the read failed
//!
//! Retrying a flaky bus is the caller's decision; the estimator never retries.

use crate::{
    conditioning::GrayImage,
    errors::AcquisitionError,
    sample::{Channel, RawSample},
};

/// Source of raw samples for one acquisition channel
///
/// ## Example Implementation
///
/// ```rust
/// use soilgauge_core::traits::SampleSource;
/// use soilgauge_core::{AcquisitionError, Channel, RawSample};
///
/// struct ConstantProbe(u16);
///
/// impl SampleSource for ConstantProbe {
///     fn channel(&self) -> Channel {
///         Channel::Analog
///     }
///
///     fn poll_sample(&mut self) -> nb::Result<RawSample, AcquisitionError> {
///         RawSample::adc(self.0).map_err(|e| nb::Error::Other(e.into()))
///     }
/// }
/// ```
pub trait SampleSource {
    /// Channel this source produces samples for
    fn channel(&self) -> Channel;

    /// Try to take one sample
    fn poll_sample(&mut self) -> nb::Result<RawSample, AcquisitionError>;

    /// Release the underlying device
    ///
    /// Called exactly once by the owning session on teardown. The default
    /// does nothing.
    fn release(&mut self) {}
}

/// Full-duplex SPI transfer of one MCP3008 frame
///
/// `frame` holds the bytes to clock out and is overwritten with the bytes
/// clocked in.
pub trait SpiBus {
    /// Exchange three bytes with the converter
    fn transfer(&mut self, frame: &mut [u8; 3]) -> Result<(), AcquisitionError>;

    /// Close the bus
    fn close(&mut self) {}
}

/// Camera or storage collaborator producing grayscale frames
pub trait FrameSource {
    /// Try to obtain the next frame
    fn poll_frame(&mut self) -> nb::Result<GrayImage, AcquisitionError>;
}

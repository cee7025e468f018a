//! Sample Sources
//!
//! ## Overview
//!
//! Concrete [`SampleSource`] implementations:
//!
//! - [`Mcp3008`]: 10-bit SPI converter in front of a capacitive probe
//! - [`ReplaySource`]: recorded samples, for tests and offline replay
//! - [`CameraSource`]: frames from a [`FrameSource`] reduced to gray levels
//!
//! ## MCP3008 Protocol
//!
//! A single-ended conversion is one 3-byte full-duplex transfer:
//!
//! ```text
//! out: 0000_0001  1ccc_0000  xxxx_xxxx     start bit, single-ended + channel
//! in:  ????_????  ????_?0dd  dddd_dddd     10-bit result in the low bits
//!
//! code = ((in[1] & 0x03) << 8) | in[2]
//! ```

use alloc::vec::Vec;

use crate::{
    conditioning::Conditioner,
    constants::{
        acquisition::{MCP3008_CHANNELS, MCP3008_SINGLE_ENDED, MCP3008_START_BIT},
        ADC_COUNTS_PER_PERCENT,
    },
    errors::{AcquisitionError, AcquisitionResult, EstimateError, EstimateResult},
    sample::{Channel, RawSample},
    traits::{FrameSource, SampleSource, SpiBus},
};

/// MCP3008 analog-to-digital converter on an SPI bus
#[derive(Debug)]
pub struct Mcp3008<B> {
    bus: B,
    channel: u8,
}

impl<B: SpiBus> Mcp3008<B> {
    /// Bind to `channel` (0-7) on `bus`
    pub fn new(bus: B, channel: u8) -> AcquisitionResult<Self> {
        if channel >= MCP3008_CHANNELS {
            return Err(AcquisitionError::InvalidChannel { channel });
        }
        Ok(Self { bus, channel })
    }

    /// Request frame for a single-ended read of `channel`
    ///
    /// Only the low three bits of `channel` select the input.
    pub const fn request_frame(channel: u8) -> [u8; 3] {
        [
            MCP3008_START_BIT,
            (MCP3008_SINGLE_ENDED | (channel & 0x07)) << 4,
            0x00,
        ]
    }

    /// Extract the 10-bit code from a response frame
    pub const fn decode(frame: &[u8; 3]) -> u16 {
        (((frame[1] & 0x03) as u16) << 8) | frame[2] as u16
    }

    /// One conversion on the bound channel
    pub fn read_raw(&mut self) -> AcquisitionResult<u16> {
        let mut frame = Self::request_frame(self.channel);
        self.bus.transfer(&mut frame)?;
        Ok(Self::decode(&frame))
    }

    /// Uncalibrated 0-100% display value, `round(code / 10.24)`
    pub fn read_percent(&mut self) -> AcquisitionResult<u8> {
        let raw = self.read_raw()?;
        Ok(raw_to_percent(raw))
    }

    /// Bound input channel (0-7)
    pub fn channel_index(&self) -> u8 {
        self.channel
    }

    /// Give the bus back
    pub fn into_inner(self) -> B {
        self.bus
    }
}

/// Coarse linear percentage of full scale
pub fn raw_to_percent(raw: u16) -> u8 {
    libm::round(raw as f64 / ADC_COUNTS_PER_PERCENT) as u8
}

impl<B: SpiBus> SampleSource for Mcp3008<B> {
    fn channel(&self) -> Channel {
        Channel::Analog
    }

    fn poll_sample(&mut self) -> nb::Result<RawSample, AcquisitionError> {
        let code = self.read_raw().map_err(nb::Error::Other)?;
        Ok(RawSample::AdcCode(code))
    }

    fn release(&mut self) {
        log_info!("closing SPI bus for MCP3008 channel {}", self.channel);
        self.bus.close();
    }
}

/// Replays a recorded sequence of samples
///
/// Returns `AcquisitionError::EndOfData` once exhausted.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    channel: Channel,
    samples: Vec<RawSample>,
    position: usize,
    released: bool,
}

impl ReplaySource {
    /// Replay `samples` in order on `channel`
    pub fn new(channel: Channel, samples: Vec<RawSample>) -> Self {
        Self {
            channel,
            samples,
            position: 0,
            released: false,
        }
    }

    /// Replay ADC codes, validating each
    pub fn from_adc_codes(codes: &[u16]) -> EstimateResult<Self> {
        let samples = codes
            .iter()
            .map(|&code| RawSample::adc(code))
            .collect::<EstimateResult<Vec<_>>>()?;
        Ok(Self::new(Channel::Analog, samples))
    }

    /// Replay the `raw` column of a recorded CSV log
    ///
    /// Rows look like `timestamp,raw,...`; lines that do not start with a
    /// digit (headers, blanks, comments) are skipped.
    pub fn from_csv(channel: Channel, text: &str) -> EstimateResult<Self> {
        let mut samples = Vec::new();
        for line in text.lines().map(str::trim) {
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let raw = line
                .split(',')
                .nth(1)
                .and_then(|field| field.trim().parse::<f64>().ok())
                .ok_or(EstimateError::InvalidInput {
                    reason: "malformed replay row",
                })?;
            let sample = match channel {
                Channel::Analog => {
                    if !(raw >= 0.0 && raw <= u16::MAX as f64) || raw - libm::trunc(raw) != 0.0 {
                        return Err(EstimateError::InvalidInput {
                            reason: "replayed ADC code is not an integer code",
                        });
                    }
                    RawSample::adc(raw as u16)?
                }
                Channel::CameraRoi => RawSample::gray(raw)?,
            };
            samples.push(sample);
        }
        Ok(Self::new(channel, samples))
    }

    /// Rewind to the first sample
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Samples not yet replayed
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }

    /// True once every sample has been handed out
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }

    /// True once the owning session released the source
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl SampleSource for ReplaySource {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn poll_sample(&mut self) -> nb::Result<RawSample, AcquisitionError> {
        let sample = self
            .samples
            .get(self.position)
            .copied()
            .ok_or(nb::Error::Other(AcquisitionError::EndOfData))?;
        self.position += 1;
        Ok(sample)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Frame source adapted into a gray-level sample source
#[derive(Debug)]
pub struct CameraSource<F> {
    frames: F,
    conditioner: Conditioner,
}

impl<F: FrameSource> CameraSource<F> {
    /// Reduce frames from `frames` with `conditioner`
    pub fn new(frames: F, conditioner: Conditioner) -> Self {
        Self {
            frames,
            conditioner,
        }
    }

    /// Conditioning applied to each frame
    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }

    /// Give back the frame source
    pub fn into_inner(self) -> F {
        self.frames
    }
}

impl<F: FrameSource> SampleSource for CameraSource<F> {
    fn channel(&self) -> Channel {
        Channel::CameraRoi
    }

    fn poll_sample(&mut self) -> nb::Result<RawSample, AcquisitionError> {
        let frame = self.frames.poll_frame()?;
        let level = self
            .conditioner
            .condition(&frame)
            .and_then(RawSample::gray)
            .map_err(|e| nb::Error::Other(e.into()))?;
        Ok(level)
    }
}

//! Sensor Session
//!
//! ## Overview
//!
//! A session is the explicit context a probe runs in: it owns the sample
//! source, the estimator, a clock, the recent-reading log and the shutdown
//! flag. Nothing lives in globals, so two probes can run side by side and a
//! test can drive a session without hardware.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► sample / handle_read / handle_write ... ──► close (or drop)
//!                                   │
//!                      write 0x0F ──┴──► ShutdownSignal raised
//! ```
//!
//! `close` releases the source exactly once; dropping an open session closes
//! it. The shutdown signal only asks the outer loop to stop; the session
//! itself keeps working until it is closed.
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::acquisition::ReplaySource;
//! use soilgauge_core::calibration::PiecewiseLinear;
//! use soilgauge_core::estimator::MoistureEstimator;
//! use soilgauge_core::session::{SensorSession, SessionCommand};
//! use soilgauge_core::time::FixedTime;
//!
//! let source = ReplaySource::from_adc_codes(&[365, 680]).unwrap();
//! let estimator = MoistureEstimator::analog(PiecewiseLinear::default());
//! let mut session: SensorSession<_, _, _> =
//!     SensorSession::open(source, estimator, FixedTime::new(0)).unwrap();
//!
//! session.sample().unwrap();
//! assert_eq!(session.handle_read(), b"7.50");
//!
//! assert_eq!(session.handle_write(&[0x0F]), SessionCommand::Shutdown);
//! assert!(session.shutdown_signal().is_requested());
//! session.close();
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{
    constants::{acquisition::PAYLOAD_CAPACITY, DEFAULT_HISTORY_LEN, SHUTDOWN_COMMAND},
    errors::{AcquisitionError, AcquisitionResult, EstimateError},
    estimator::MoistureEstimator,
    history::{LoggedEstimate, ReadingLog},
    report::percent_payload,
    traits::{CalibrationStrategy, ReportSink, SampleSource, TimeSource},
};

/// Initial characteristic value before the first estimate
const INITIAL_PAYLOAD: &[u8] = b"0.00";

/// Cloneable stop flag shared between a session and its outer loop
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Signal that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True once any holder asked to stop
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Re-arm after a handled shutdown
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Outcome of a client write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// The single byte `0x0F`: stop the session
    Shutdown,
    /// Anything else; kept as the characteristic value
    Stored,
}

/// Context object for one probe
pub struct SensorSession<S: SampleSource, C, T, const N: usize = DEFAULT_HISTORY_LEN> {
    source: S,
    estimator: MoistureEstimator<C>,
    clock: T,
    log: ReadingLog<N>,
    shutdown: ShutdownSignal,
    value: heapless::Vec<u8, PAYLOAD_CAPACITY>,
    open: bool,
}

impl<S, C, T, const N: usize> SensorSession<S, C, T, N>
where
    S: SampleSource,
    C: CalibrationStrategy,
    T: TimeSource,
{
    /// Start a session
    ///
    /// Fails when the source produces samples for a different channel than
    /// the estimator accepts.
    pub fn open(source: S, estimator: MoistureEstimator<C>, clock: T) -> AcquisitionResult<Self> {
        if source.channel() != estimator.channel() {
            return Err(AcquisitionError::Conditioning(EstimateError::InvalidInput {
                reason: "source channel does not match estimator",
            }));
        }

        log_info!(
            "sensor session opened: {:?} channel, {} calibration",
            estimator.channel(),
            estimator.strategy().name()
        );

        let mut value = heapless::Vec::new();
        let _ = value.extend_from_slice(INITIAL_PAYLOAD);

        Ok(Self {
            source,
            estimator,
            clock,
            log: ReadingLog::new(),
            shutdown: ShutdownSignal::new(),
            value,
            open: true,
        })
    }

    /// Poll the source once and log the estimate
    ///
    /// `Ok(None)` when the source has nothing ready. Estimation failures are
    /// returned as `AcquisitionError::Conditioning` and leave the log as is.
    pub fn sample(&mut self) -> AcquisitionResult<Option<LoggedEstimate>> {
        let raw = match self.source.poll_sample() {
            Ok(raw) => raw,
            Err(nb::Error::WouldBlock) => return Ok(None),
            Err(nb::Error::Other(e)) => return Err(e),
        };

        let estimate = self.estimator.estimate(raw)?;
        let entry = LoggedEstimate::new(self.clock.now(), estimate);
        self.log.push(entry);

        match percent_payload(&estimate) {
            Ok(text) => {
                self.value.clear();
                let _ = self.value.extend_from_slice(text.as_bytes());
            }
            Err(_e) => {
                log_warn!("estimate not publishable: {}", _e);
            }
        }

        log_debug!("raw {} -> {:.2}%", estimate.raw, estimate.percent);
        Ok(Some(entry))
    }

    /// Characteristic value for a client read
    ///
    /// Takes a fresh sample first; when none is available (or it fails) the
    /// previous value is returned.
    pub fn handle_read(&mut self) -> &[u8] {
        if let Err(_e) = self.sample() {
            log_warn!("read request served stale value: {}", _e);
        }
        &self.value
    }

    /// Apply a client write
    pub fn handle_write(&mut self, data: &[u8]) -> SessionCommand {
        self.value.clear();
        let kept = data.len().min(PAYLOAD_CAPACITY);
        let _ = self.value.extend_from_slice(&data[..kept]);

        if data == [SHUTDOWN_COMMAND] {
            log_info!("shutdown command received");
            self.shutdown.request();
            return SessionCommand::Shutdown;
        }
        SessionCommand::Stored
    }

    /// Send every logged estimate, oldest first, to `sink`
    pub fn publish_history<R: ReportSink + ?Sized>(&self, sink: &mut R) {
        for entry in self.log.iter() {
            sink.report(entry);
        }
    }

    /// Current characteristic value
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Readings taken so far
    pub fn log(&self) -> &ReadingLog<N> {
        &self.log
    }

    /// Estimator in use
    pub fn estimator(&self) -> &MoistureEstimator<C> {
        &self.estimator
    }

    /// Handle for the outer loop to watch or raise
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// False after `close`
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Underlying sample source
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SampleSource, C, T, const N: usize> SensorSession<S, C, T, N> {
    /// Release the source; later calls do nothing
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.source.release();
        log_info!("sensor session closed after {} logged readings", self.log.len());
    }
}

impl<S: SampleSource, C, T, const N: usize> Drop for SensorSession<S, C, T, N> {
    fn drop(&mut self) {
        self.close();
    }
}

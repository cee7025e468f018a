//! Time management for probe sessions
//!
//! Readings in the session log are stamped with a millisecond timestamp.
//! Where it comes from depends on the platform:
//! - System clock (when `std` is available)
//! - A fixed, manually advanced clock (tests and replays)
//! - A board RTC or tick counter (implemented by the firmware)

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// Source of time for the system
///
/// ## Implementation Requirements
///
/// - `now()` must be cheap; it is called once per logged reading
/// - Timestamp overflow must be handled gracefully
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing and replay
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the clock to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Seconds with millisecond fraction, the unit the history payload uses
pub fn as_unix_seconds(timestamp: Timestamp) -> f64 {
    timestamp as f64 / 1000.0
}

//! Bounded Reading Log
//!
//! ## Overview
//!
//! A probe session keeps the last `N` stamped estimates so a client that
//! connects late can fetch recent history (24 entries by default: one day at
//! hourly notifications). The log is a fixed-size ring: no heap allocation,
//! constant-time append, and the oldest entry is dropped when full.
//!
//! ```text
//! ReadingLog<4> after six pushes (e0..e5):
//! ┌────┬────┬────┬────┐
//! │ e4 │ e5 │ e2 │ e3 │   physical slots
//! └────┴────┴────┴────┘
//!           ↑ write_pos = 2, oldest entry
//!
//! iter(): e2, e3, e4, e5
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use soilgauge_core::estimator::MoistureEstimate;
//! use soilgauge_core::history::{LoggedEstimate, ReadingLog};
//!
//! let mut log: ReadingLog<2> = ReadingLog::new();
//! log.push(LoggedEstimate::new(1_000, MoistureEstimate::valid(300.0, 5.0)));
//! log.push(LoggedEstimate::new(2_000, MoistureEstimate::valid(400.0, 8.0)));
//! log.push(LoggedEstimate::new(3_000, MoistureEstimate::valid(500.0, 11.0)));
//!
//! let stamps: Vec<u64> = log.iter().map(|e| e.timestamp).collect();
//! assert_eq!(stamps, [2_000, 3_000]);
//! ```

use crate::{constants::DEFAULT_HISTORY_LEN, estimator::MoistureEstimate, time::Timestamp};

/// Estimate stamped with the time it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggedEstimate {
    /// Milliseconds from the session clock
    pub timestamp: Timestamp,
    /// The estimate itself
    pub estimate: MoistureEstimate,
}

impl LoggedEstimate {
    /// Pair an estimate with the time it was taken
    pub const fn new(timestamp: Timestamp, estimate: MoistureEstimate) -> Self {
        Self {
            timestamp,
            estimate,
        }
    }
}

/// Session log with the default 24-entry capacity
pub type DailyLog = ReadingLog<DEFAULT_HISTORY_LEN>;

/// Fixed-capacity ring of logged estimates, oldest first on iteration
///
/// Invariants: `write_pos < N` and `len <= N`.
#[derive(Debug, Clone)]
pub struct ReadingLog<const N: usize> {
    data: [Option<LoggedEstimate>; N],
    write_pos: usize,
    len: usize,
}

impl<const N: usize> ReadingLog<N> {
    /// Empty log
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Append an entry, overwriting the oldest when full
    pub fn push(&mut self, entry: LoggedEstimate) {
        if N == 0 {
            return;
        }
        self.data[self.write_pos] = Some(entry);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Readings currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the next push overwrites the oldest reading
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Maximum number of entries kept
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&LoggedEstimate> {
        if self.is_empty() {
            return None;
        }
        let idx = if self.write_pos == 0 {
            N - 1
        } else {
            self.write_pos - 1
        };
        self.data[idx].as_ref()
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LoggedEstimate> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Mean percentage over the logged entries
    pub fn mean_percent(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let sum: f64 = self.iter().map(|e| e.estimate.percent).sum();
        Some(sum / self.len as f64)
    }

    /// Drop every reading
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Entry by logical index, 0 = oldest
    fn get(&self, index: usize) -> Option<&LoggedEstimate> {
        if index >= self.len {
            return None;
        }
        let physical = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };
        self.data[physical].as_ref()
    }
}

impl<const N: usize> Default for ReadingLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

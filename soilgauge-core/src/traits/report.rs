//! Report sink trait
//!
//! Where finished estimates go: a console, a CSV recorder, a wireless
//! characteristic. Formatting helpers live in [`crate::report`].

use crate::history::LoggedEstimate;

/// Consumer of logged estimates
pub trait ReportSink {
    /// Accept one stamped estimate
    fn report(&mut self, entry: &LoggedEstimate);
}

#[cfg(feature = "std")]
impl ReportSink for std::vec::Vec<LoggedEstimate> {
    fn report(&mut self, entry: &LoggedEstimate) {
        self.push(*entry);
    }
}

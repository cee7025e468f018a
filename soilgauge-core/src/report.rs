//! Report Formatting
//!
//! Text forms of an estimate for the outside world:
//!
//! | Form                 | Example                        | Used by                    |
//! |----------------------|--------------------------------|----------------------------|
//! | [`percent_payload`]  | `10.54`                        | wireless characteristic    |
//! | [`csv_row`]          | `1000,492.5,10.54,valid`       | recording and replay       |
//! | `history_json`       | `[{"moisture":10.54,...}]`     | history characteristic     |
//!
//! Formatting never allocates for the payload; CSV rows and JSON use `alloc`.

use alloc::string::String;
use core::fmt::Write as _;

use crate::{
    constants::acquisition::PAYLOAD_CAPACITY,
    errors::{EstimateError, EstimateResult},
    estimator::MoistureEstimate,
    time::Timestamp,
};

/// Characteristic payload text
pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// Header line matching [`csv_row`]
pub const CSV_HEADER: &str = "timestamp,raw,percent,validity";

/// Percentage with two decimals, e.g. `"10.54"`
///
/// Fails with `InvalidInput` when the text would not fit the payload.
pub fn percent_payload(estimate: &MoistureEstimate) -> EstimateResult<Payload> {
    let mut text = Payload::new();
    write!(text, "{:.2}", estimate.percent).map_err(|_| EstimateError::InvalidInput {
        reason: "percentage does not fit the payload",
    })?;
    Ok(text)
}

/// One recording line: `timestamp,raw,percent,validity`
pub fn csv_row(timestamp: Timestamp, raw: f64, estimate: &MoistureEstimate) -> String {
    alloc::format!(
        "{},{},{:.2},{}",
        timestamp,
        raw,
        estimate.percent,
        estimate.validity.as_str()
    )
}

#[cfg(feature = "std")]
pub use json::{history_json, HistoryEntry};

#[cfg(feature = "std")]
mod json {
    use alloc::{string::String, vec::Vec};

    use crate::{history::ReadingLog, time::as_unix_seconds};

    /// One element of the history array
    #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
    pub struct HistoryEntry {
        /// Water content (%)
        pub moisture: f64,
        /// Unix seconds with millisecond fraction
        pub timestamp: f64,
    }

    /// Logged estimates as a JSON array, oldest first
    pub fn history_json<const N: usize>(log: &ReadingLog<N>) -> serde_json::Result<String> {
        let entries: Vec<HistoryEntry> = log
            .iter()
            .map(|entry| HistoryEntry {
                moisture: entry.estimate.percent,
                timestamp: as_unix_seconds(entry.timestamp),
            })
            .collect();
        serde_json::to_string(&entries)
    }
}

#[cfg(feature = "std")]
pub use csv::CsvSink;

#[cfg(feature = "std")]
mod csv {
    use std::io::{self, Write};

    use super::{csv_row, CSV_HEADER};
    use crate::{history::LoggedEstimate, traits::ReportSink};

    /// Writes logged estimates as CSV lines
    ///
    /// The header goes out before the first row. Write failures are counted
    /// and logged; the sink keeps accepting entries.
    #[derive(Debug)]
    pub struct CsvSink<W> {
        out: W,
        header_written: bool,
        failures: usize,
    }

    impl<W: Write> CsvSink<W> {
        /// Write CSV rows to `out`, header first
        pub fn new(out: W) -> Self {
            Self {
                out,
                header_written: false,
                failures: 0,
            }
        }

        /// Number of entries that could not be written
        pub fn failures(&self) -> usize {
            self.failures
        }

        /// Give back the writer
        pub fn into_inner(self) -> W {
            self.out
        }

        fn write_entry(&mut self, entry: &LoggedEstimate) -> io::Result<()> {
            if !self.header_written {
                writeln!(self.out, "{CSV_HEADER}")?;
                self.header_written = true;
            }
            let row = csv_row(entry.timestamp, entry.estimate.raw, &entry.estimate);
            writeln!(self.out, "{row}")
        }
    }

    impl<W: Write> ReportSink for CsvSink<W> {
        fn report(&mut self, entry: &LoggedEstimate) {
            if let Err(e) = self.write_entry(entry) {
                self.failures += 1;
                log_warn!("failed to write CSV row: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_two_decimals() {
        let est = MoistureEstimate::valid(492.5, 7.5 + 7.5 * 127.5 / 315.0);
        assert_eq!(percent_payload(&est).unwrap().as_str(), "10.54");
        assert_eq!(
            percent_payload(&MoistureEstimate::valid(0.0, 0.0)).unwrap().as_str(),
            "0.00"
        );
    }

    #[test]
    fn payload_overflow_is_error() {
        let est = MoistureEstimate::extrapolated(1e30, 1e20);
        assert!(percent_payload(&est).is_err());
    }

    #[test]
    fn csv_format() {
        let est = MoistureEstimate::extrapolated(100.0, 3.0);
        assert_eq!(csv_row(1000, 100.0, &est), "1000,100,3.00,extrapolated");
        let gray = MoistureEstimate::valid(97.5, 15.25);
        assert_eq!(csv_row(5, 97.5, &gray), "5,97.5,15.25,valid");
    }

    #[cfg(feature = "std")]
    #[test]
    fn json_history() {
        use crate::history::{LoggedEstimate, ReadingLog};

        let mut log = ReadingLog::<4>::new();
        log.push(LoggedEstimate::new(1_500, MoistureEstimate::valid(365.0, 7.5)));
        let json = history_json(&log).unwrap();
        assert_eq!(json, r#"[{"moisture":7.5,"timestamp":1.5}]"#);

        let parsed: std::vec::Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].moisture, 7.5);
    }

    #[cfg(feature = "std")]
    #[test]
    fn csv_sink_writes_header_once() {
        use crate::history::LoggedEstimate;
        use crate::traits::ReportSink;

        let mut sink = CsvSink::new(std::vec::Vec::new());
        sink.report(&LoggedEstimate::new(1, MoistureEstimate::valid(220.0, 3.0)));
        sink.report(&LoggedEstimate::new(2, MoistureEstimate::valid(680.0, 15.0)));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "timestamp,raw,percent,validity\n1,220,3.00,valid\n2,680,15.00,valid\n"
        );
    }
}

//! Acquisition Constants
//!
//! ADC geometry for the MCP3008 front end and the timing the probe firmware
//! runs with.

// ===== ADC =====

/// Largest code of a 10-bit converter.
pub const ADC_MAX_CODE: u16 = 1023;

/// Raw counts per uncalibrated percent (1024 / 100).
pub const ADC_COUNTS_PER_PERCENT: f64 = 10.24;

/// Number of single-ended inputs on the MCP3008.
pub const MCP3008_CHANNELS: u8 = 8;

/// MCP3008 start bit, first byte of every read frame.
pub const MCP3008_START_BIT: u8 = 0x01;

/// Single-ended mode flag, OR-ed with the channel in the second byte.
pub const MCP3008_SINGLE_ENDED: u8 = 0x08;

// ===== SESSION =====

/// Readings kept for the history payload.
pub const DEFAULT_HISTORY_LEN: usize = 24;

/// Single-byte write that asks a running session to shut down.
pub const SHUTDOWN_COMMAND: u8 = 0x0F;

/// Maximum length of a formatted percentage payload.
pub const PAYLOAD_CAPACITY: usize = 16;

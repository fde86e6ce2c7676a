//! Protocol constants for NCI-style scale communication.
//!
//! This module defines the default read command, end-of-weight marker,
//! serial framing and the poll timing used while waiting on the scale.

use crate::types::{ByteSize, Parity, StopBits};

/// Command asking the scale for its current weight (`W` + carriage return)
pub const READ_WEIGHT_COMMAND: &[u8] = b"W\r";

/// Byte the scale sends once a weight reading is complete (ETX)
pub const END_OF_WEIGHT_MARKER: u8 = 0x03;

/// Baud rate (9600 bps)
pub const BAUD_RATE: u32 = 9600;

/// Parity used by NCI scales
pub const PARITY: Parity = Parity::Even;

/// Stop bits used by NCI scales
pub const STOP_BITS: StopBits = StopBits::One;

/// Data bits per character used by NCI scales
pub const BYTE_SIZE: ByteSize = ByteSize::Seven;

/// Delay between buffer drains while waiting for the marker
pub const WAIT_INTERVAL_MS: u64 = 250;

/// Total wait before a read is reported as timed out
pub const MAX_WAIT_TIME_MS: u64 = 1500;

/// Per-operation timeout handed to the serial driver
pub const IO_TIMEOUT_MS: u64 = 100;

/// Device opened when no port is given at startup
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM1";

/// Device opened when no port is given at startup
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyS0";

/// Returned by a read that did not see the marker within the max wait time
pub const TIMEOUT_MESSAGE: &str =
    "Scale response took too long, check connection and reconsider max_wait_time_seconds";

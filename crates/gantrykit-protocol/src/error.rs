//! Protocol error types
//!
//! Two failure families are kept strictly apart:
//! - [`FramingError`]: the byte stream could not be parsed as a well-formed
//!   frame. Recoverable; the decoder resynchronizes on the next sync byte.
//! - [`DeviceError`]: a well-formed response whose status byte says the
//!   controller rejected or failed the command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to parse an inbound byte sequence as a well-formed frame.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramingError {
    /// The length byte was zero; every response carries at least the
    /// status byte.
    #[error("frame declared an empty payload")]
    EmptyFrame,

    /// The check byte did not match the CRC-8 of the payload.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    BadChecksum {
        /// The CRC-8 computed over the received payload.
        expected: u8,
        /// The check byte actually received.
        actual: u8,
    },
}

/// A framed, checksum-verified response whose status byte is non-zero.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("device rejected command with status {code:#04x}")]
pub struct DeviceError {
    /// The non-zero status byte reported by the controller.
    pub code: u8,
}

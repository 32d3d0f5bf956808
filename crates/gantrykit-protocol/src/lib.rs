//! # GantryKit Protocol
//!
//! Byte-exact codec for the framed binary command protocol spoken by
//! multi-axis gantry controllers over serial. Covers the frame layout,
//! the CRC-8/Maxim check byte, the full command catalog, and a resumable
//! decoder for the controller's response stream.
//!
//! This crate is pure: no I/O, no transport. Pair it with
//! `gantrykit-communication` for the serial session and command queue.

pub mod axes;
pub mod checksum;
pub mod command;
pub mod decoder;
pub mod error;
pub mod frame;

pub use axes::{Axis, AxisSet, UnknownAxis};
pub use checksum::crc8_maxim;
pub use command::{AxisPower, BlinkRate, Command};
pub use decoder::{DecodeEvent, Decoder, Response};
pub use error::{DeviceError, FramingError};
pub use frame::{Frame, MAX_PAYLOAD, SYNC};

//! Wire frame layout
//!
//! Every packet exchanged with the controller has the same shape:
//!
//! ```text
//! +------+--------+------------+-----------+-------+
//! | sync | length | command id |  payload  | check |
//! | 0xD5 |  u8    |    u8      | len-1 b   |  u8   |
//! +------+--------+------------+-----------+-------+
//! ```
//!
//! `length` counts the command-id byte plus the payload bytes. `check` is
//! the CRC-8/Maxim of exactly those `length` bytes. Both are derived when
//! the frame is serialized; they are not independent fields and cannot be
//! forged through this type.

use crate::checksum::crc8_maxim;

/// Frame start-of-packet marker.
pub const SYNC: u8 = 0xD5;

/// Maximum payload size: `length` must also count the command-id byte and
/// fit in one byte.
pub const MAX_PAYLOAD: usize = 254;

/// An outbound or inbound protocol frame, before sync/length/check framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command id byte.
    pub command_id: u8,
    /// Payload bytes following the command id.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame. Payloads longer than [`MAX_PAYLOAD`] are truncated,
    /// since the wire length field cannot represent them; truncation is
    /// logged as a warning.
    pub fn new(command_id: u8, mut payload: Vec<u8>) -> Self {
        if payload.len() > MAX_PAYLOAD {
            tracing::warn!(
                command_id,
                len = payload.len(),
                max = MAX_PAYLOAD,
                "frame payload truncated to maximum wire length"
            );
            payload.truncate(MAX_PAYLOAD);
        }
        Frame {
            command_id,
            payload,
        }
    }

    /// The wire length byte: command id plus payload.
    pub fn length(&self) -> u8 {
        (1 + self.payload.len()) as u8
    }

    /// The check byte over command id and payload.
    pub fn check(&self) -> u8 {
        let mut body = Vec::with_capacity(1 + self.payload.len());
        body.push(self.command_id);
        body.extend_from_slice(&self.payload);
        crc8_maxim(&body)
    }

    /// Serialize to the full wire packet: sync, length, command id,
    /// payload, check.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.payload.len());
        bytes.push(SYNC);
        bytes.push(self.length());
        bytes.push(self.command_id);
        bytes.extend_from_slice(&self.payload);
        bytes.push(self.check());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_check_derived() {
        let frame = Frame::new(0x01, vec![]);
        assert_eq!(frame.length(), 1);
        assert_eq!(frame.to_bytes(), vec![0xD5, 0x01, 0x01, 0x5E]);
    }

    #[test]
    fn test_check_covers_id_and_payload_only() {
        let frame = Frame::new(0x00, vec![0x01, 0x02, 0x03]);
        assert_eq!(frame.check(), crc8_maxim(&[0x00, 0x01, 0x02, 0x03]));
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), 7);
        assert_eq!(bytes[0], SYNC);
        assert_eq!(bytes[1], 4);
        assert_eq!(*bytes.last().unwrap(), 0xD8);
    }

    #[test]
    fn test_oversize_payload_truncated() {
        let frame = Frame::new(0x0A, vec![0xAA; 400]);
        assert_eq!(frame.payload.len(), MAX_PAYLOAD);
        assert_eq!(frame.length(), 0xFF);
    }
}

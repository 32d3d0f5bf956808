//! Inbound frame decoder
//!
//! Parses the controller's response stream into verified frames. The
//! decoder is a resumable state machine: serial bytes arrive in arbitrary
//! chunk sizes, so state is preserved across [`Decoder::feed`] calls and a
//! frame may complete mid-chunk or span several chunks.
//!
//! Recovery contract: a checksum mismatch or a zero length byte reports a
//! [`FramingError`] and resets the machine to hunting for the next sync
//! byte. The decoder never fails permanently.

use crate::checksum::crc8_maxim;
use crate::error::{DeviceError, FramingError};
use serde::{Deserialize, Serialize};

/// A decoded, checksum-verified response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// A well-formed frame was received and its check byte verified.
    Acknowledged {
        /// The response payload. The first byte is the device status code.
        payload: Vec<u8>,
    },
}

impl Response {
    /// The raw response payload, status byte included.
    pub fn payload(&self) -> &[u8] {
        match self {
            Response::Acknowledged { payload } => payload,
        }
    }

    /// The device status byte. Zero means the command was accepted.
    pub fn status(&self) -> u8 {
        self.payload().first().copied().unwrap_or(0)
    }

    /// Project the response into the device's verdict: the payload body
    /// (status byte stripped) on success, or a [`DeviceError`] carrying the
    /// non-zero status code.
    pub fn device_result(&self) -> Result<&[u8], DeviceError> {
        let payload = self.payload();
        match payload.first() {
            Some(0) | None => Ok(payload.get(1..).unwrap_or(&[])),
            Some(&code) => Err(DeviceError { code }),
        }
    }
}

/// One decoder output: a verified response or a recoverable framing error.
pub type DecodeEvent = Result<Response, FramingError>;

#[derive(Debug)]
enum DecodeState {
    /// Hunting for the 0xD5 sync byte. Anything else is discarded.
    AwaitSync,
    /// Sync seen; next byte is the payload length.
    AwaitLength,
    /// Accumulating `expected` payload bytes.
    AwaitPayload { expected: usize, payload: Vec<u8> },
    /// Payload complete; next byte is the check byte.
    AwaitChecksum { payload: Vec<u8> },
}

/// Resumable response-stream decoder.
#[derive(Debug)]
pub struct Decoder {
    state: DecodeState,
    /// Bytes discarded while hunting for sync since the last lock.
    discarding: u64,
    /// Total bytes ever discarded, for diagnostics.
    discarded_total: u64,
}

impl Decoder {
    /// Create a decoder waiting for the first sync byte.
    pub fn new() -> Self {
        Decoder {
            state: DecodeState::AwaitSync,
            discarding: 0,
            discarded_total: 0,
        }
    }

    /// Feed a chunk of transport bytes, returning every event the chunk
    /// completed. Chunk boundaries are arbitrary; partial frames are held
    /// until later calls supply the rest.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Advance the state machine by one byte.
    pub fn push(&mut self, byte: u8) -> Option<DecodeEvent> {
        match std::mem::replace(&mut self.state, DecodeState::AwaitSync) {
            DecodeState::AwaitSync => {
                if byte == crate::frame::SYNC {
                    if self.discarding > 0 {
                        tracing::warn!(
                            discarded = self.discarding,
                            "discarded bytes before frame sync"
                        );
                        self.discarding = 0;
                    }
                    self.state = DecodeState::AwaitLength;
                } else {
                    self.discarding += 1;
                    self.discarded_total += 1;
                    self.state = DecodeState::AwaitSync;
                }
                None
            }
            DecodeState::AwaitLength => {
                if byte == 0 {
                    tracing::warn!("zero-length frame, resynchronizing");
                    self.state = DecodeState::AwaitSync;
                    return Some(Err(FramingError::EmptyFrame));
                }
                self.state = DecodeState::AwaitPayload {
                    expected: byte as usize,
                    payload: Vec::with_capacity(byte as usize),
                };
                None
            }
            DecodeState::AwaitPayload {
                expected,
                mut payload,
            } => {
                payload.push(byte);
                if payload.len() == expected {
                    self.state = DecodeState::AwaitChecksum { payload };
                } else {
                    self.state = DecodeState::AwaitPayload { expected, payload };
                }
                None
            }
            DecodeState::AwaitChecksum { payload } => {
                // Frame done either way; resynchronize on the next byte.
                self.state = DecodeState::AwaitSync;
                let expected = crc8_maxim(&payload);
                if byte == expected {
                    tracing::trace!(len = payload.len(), "frame decoded");
                    Some(Ok(Response::Acknowledged { payload }))
                } else {
                    tracing::warn!(
                        expected,
                        actual = byte,
                        "frame checksum mismatch, resynchronizing"
                    );
                    Some(Err(FramingError::BadChecksum {
                        expected,
                        actual: byte,
                    }))
                }
            }
        }
    }

    /// Total bytes discarded while out of sync, over the decoder's life.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded_total
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![crate::frame::SYNC, payload.len() as u8];
        bytes.extend_from_slice(payload);
        bytes.push(crc8_maxim(payload));
        bytes
    }

    #[test]
    fn test_single_frame() {
        let mut decoder = Decoder::new();
        let events = decoder.feed(&frame_bytes(&[0x00, 0x64, 0x00]));
        assert_eq!(
            events,
            vec![Ok(Response::Acknowledged {
                payload: vec![0x00, 0x64, 0x00]
            })]
        );
    }

    #[test]
    fn test_resumable_across_chunks() {
        let mut decoder = Decoder::new();
        let bytes = frame_bytes(&[0x00, 0xFF]);
        // One byte at a time: only the final byte completes the frame
        for &b in &bytes[..bytes.len() - 1] {
            assert_eq!(decoder.push(b), None);
        }
        let event = decoder.push(bytes[bytes.len() - 1]).unwrap();
        assert_eq!(event.unwrap().payload(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_garbage_before_sync_is_discarded() {
        let mut decoder = Decoder::new();
        let mut stream = vec![0x12, 0x00, 0xFE];
        stream.extend_from_slice(&frame_bytes(&[0x00]));
        let events = decoder.feed(&stream);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
        assert_eq!(decoder.discarded_bytes(), 3);
    }

    #[test]
    fn test_frame_then_garbage_then_frame() {
        let mut decoder = Decoder::new();
        let mut stream = frame_bytes(&[0x00]);
        stream.extend_from_slice(&[0x42, 0x43]);
        stream.extend_from_slice(&frame_bytes(&[0x00, 0x61, 0x00]));
        let events = decoder.feed(&stream);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_ok()));
    }

    #[test]
    fn test_bad_checksum_is_recoverable() {
        let mut decoder = Decoder::new();
        let mut bad = frame_bytes(&[0x00]);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let events = decoder.feed(&bad);
        assert_eq!(
            events,
            vec![Err(FramingError::BadChecksum {
                expected: 0x00,
                actual: 0xFF,
            })]
        );
        // The decoder must resynchronize and decode the next frame
        let events = decoder.feed(&frame_bytes(&[0x00]));
        assert!(events[0].is_ok());
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut decoder = Decoder::new();
        let events = decoder.feed(&[crate::frame::SYNC, 0x00]);
        assert_eq!(events, vec![Err(FramingError::EmptyFrame)]);
        let events = decoder.feed(&frame_bytes(&[0x00]));
        assert!(events[0].is_ok());
    }

    #[test]
    fn test_device_status_projection() {
        let ok = Response::Acknowledged {
            payload: vec![0x00, 0x12, 0x34],
        };
        assert_eq!(ok.device_result().unwrap(), &[0x12, 0x34]);

        let rejected = Response::Acknowledged {
            payload: vec![0x81],
        };
        assert_eq!(rejected.device_result().unwrap_err(), DeviceError { code: 0x81 });
    }
}

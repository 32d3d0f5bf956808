//! Byte-stream transport abstraction
//!
//! The session driver is written against this trait rather than a concrete
//! serial port, so tests drive it with scripted in-memory transports and
//! the codec stays independent of device discovery.

use std::io;

/// A duplex byte stream to the controller.
///
/// Reads are expected to be bounded by a short timeout: when no bytes have
/// arrived yet the implementation returns `Ok(0)` or an error of kind
/// [`io::ErrorKind::TimedOut`] / [`io::ErrorKind::WouldBlock`]. The session
/// driver treats all three as "nothing yet" and keeps polling until its own
/// per-frame deadline expires. Any other error is fatal.
pub trait Transport: Send {
    /// Write an entire frame to the device.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read whatever bytes are available into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// A human-readable name for logging (port path or test label).
    fn name(&self) -> String;
}

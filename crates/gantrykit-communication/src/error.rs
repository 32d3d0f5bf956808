//! Session error types
//!
//! Every surfaced failure names the command it belongs to, so a failed run
//! is diagnosable from the error alone. Recoverable conditions (framing
//! errors, response timeouts, device rejections within the retry budget)
//! are handled inside the session driver and never reach these types.

use thiserror::Error;

/// Errors surfaced by the command-queue session driver.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The device reported a non-zero status for every attempt.
    #[error("device rejected {command} with status {code:#04x} after {attempts} attempts")]
    DeviceRejected {
        /// Name of the rejected command.
        command: &'static str,
        /// The status byte from the final attempt.
        code: u8,
        /// Number of attempts made.
        attempts: u32,
    },

    /// No verified response was obtained within the retry budget.
    #[error("{command} failed after {attempts} attempts: {reason}")]
    RetriesExhausted {
        /// Name of the failing command.
        command: &'static str,
        /// Number of attempts made.
        attempts: u32,
        /// What the final attempt died of (timeout or framing failure).
        reason: String,
    },

    /// The pending queue is at capacity.
    #[error("command queue full ({capacity} pending)")]
    QueueFull {
        /// The configured queue capacity.
        capacity: usize,
    },

    /// The underlying byte stream failed. Fatal; the session driver stops.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Result type using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

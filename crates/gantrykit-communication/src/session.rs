//! Command queue session with flow control and acknowledgment tracking
//!
//! Serializes command issuance so exactly one frame is outstanding at a
//! time. The controller's onboard command buffer is small and unannounced
//! overruns drop commands silently, so the driver never writes a second
//! frame before the first one's response has been decoded and verified.
//!
//! # Features
//! - FIFO command queue owned by the session (no ambient global state)
//! - At-most-one-in-flight write discipline
//! - Per-frame response deadline with bounded retries
//! - Framing errors and device rejections retried, transport failures fatal
//! - Best-effort abort that flushes the pending queue

use crate::error::{Result, SessionError};
use crate::transport::Transport;
use gantrykit_protocol::decoder::{DecodeEvent, Decoder};
use gantrykit_protocol::{Command, Frame, FramingError, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Configuration for a command-queue session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum retries per frame after the initial attempt.
    pub max_retries: u32,
    /// How long to wait for each frame's response before retrying.
    pub response_timeout: Duration,
    /// Maximum number of commands that may be queued.
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            response_timeout: Duration::from_secs(2),
            queue_capacity: 100,
        }
    }
}

/// A queued frame awaiting transmission.
#[derive(Debug, Clone)]
struct Pending {
    /// Command name, carried for diagnosability of failures.
    name: &'static str,
    /// The full wire packet.
    bytes: Vec<u8>,
    /// Attempts made so far.
    attempts: u32,
}

/// The verified result of one command: its acknowledged response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Name of the command this outcome belongs to.
    pub command: &'static str,
    /// Response payload with the status byte stripped.
    pub payload: Vec<u8>,
    /// How many attempts it took (1 = first try).
    pub attempts: u32,
}

enum WaitOutcome {
    Response(Response),
    Framing(FramingError),
    TimedOut,
}

/// A command-queue session owning the transport exclusively.
///
/// No other component reads from or writes to the transport while the
/// session exists; the decode state machine and flow-control discipline
/// depend on seeing every byte.
pub struct Session<T: Transport> {
    transport: T,
    decoder: Decoder,
    queue: VecDeque<Pending>,
    /// Decoded events not yet consumed by the driver.
    events: VecDeque<DecodeEvent>,
    config: SessionConfig,
}

impl<T: Transport> Session<T> {
    /// Create a session with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Session {
            transport,
            decoder: Decoder::new(),
            queue: VecDeque::new(),
            events: VecDeque::new(),
            config,
        }
    }

    /// Queue a command for transmission.
    pub fn enqueue(&mut self, command: &Command) -> Result<()> {
        self.enqueue_named(command.name(), command.encode())
    }

    /// Queue an already-encoded frame.
    pub fn enqueue_frame(&mut self, frame: Frame) -> Result<()> {
        self.enqueue_named("(raw frame)", frame)
    }

    fn enqueue_named(&mut self, name: &'static str, frame: Frame) -> Result<()> {
        if self.queue.len() >= self.config.queue_capacity {
            return Err(SessionError::QueueFull {
                capacity: self.config.queue_capacity,
            });
        }
        self.queue.push_back(Pending {
            name,
            bytes: frame.to_bytes(),
            attempts: 0,
        });
        Ok(())
    }

    /// Number of commands waiting (none are in flight between `drive` steps).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain the queue, yielding one outcome per command.
    ///
    /// Lazy: each `next()` sends exactly one frame and blocks until its
    /// response is verified (retrying within the configured budget). A
    /// fatal error is yielded once and ends the iteration; commands queued
    /// behind the failure stay queued.
    pub fn drive(&mut self) -> Drive<'_, T> {
        Drive {
            session: self,
            halted: false,
        }
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Best-effort abort: send an `Abort` frame immediately and discard
    /// every queued command. In-flight work on the device may or may not
    /// have executed.
    pub fn abort(&mut self) {
        let discarded = self.queue.len();
        self.queue.clear();
        self.events.clear();
        let frame = Command::Abort.encode();
        if let Err(e) = self.transport.write_all(&frame.to_bytes()) {
            tracing::warn!("abort frame could not be written: {}", e);
        }
        tracing::info!(discarded, "session aborted, pending queue flushed");
    }

    /// Send one dequeued frame and wait for its verified response,
    /// retrying within the configured budget.
    fn run_pending(&mut self, mut pending: Pending) -> Result<CommandOutcome> {
        loop {
            pending.attempts += 1;
            tracing::debug!(
                command = pending.name,
                attempt = pending.attempts,
                len = pending.bytes.len(),
                "writing frame"
            );
            self.transport.write_all(&pending.bytes)?;

            let deadline = Instant::now() + self.config.response_timeout;
            match self.await_response(deadline)? {
                WaitOutcome::Response(response) => match response.device_result() {
                    Ok(body) => {
                        tracing::trace!(command = pending.name, "command acknowledged");
                        return Ok(CommandOutcome {
                            command: pending.name,
                            payload: body.to_vec(),
                            attempts: pending.attempts,
                        });
                    }
                    Err(device) => {
                        if pending.attempts > self.config.max_retries {
                            tracing::error!(
                                command = pending.name,
                                code = device.code,
                                attempts = pending.attempts,
                                "device rejected command, retries exhausted"
                            );
                            return Err(SessionError::DeviceRejected {
                                command: pending.name,
                                code: device.code,
                                attempts: pending.attempts,
                            });
                        }
                        tracing::warn!(
                            command = pending.name,
                            code = device.code,
                            attempt = pending.attempts,
                            "device rejected command, retrying"
                        );
                    }
                },
                WaitOutcome::Framing(framing) => {
                    if pending.attempts > self.config.max_retries {
                        return Err(SessionError::RetriesExhausted {
                            command: pending.name,
                            attempts: pending.attempts,
                            reason: framing.to_string(),
                        });
                    }
                    tracing::warn!(
                        command = pending.name,
                        attempt = pending.attempts,
                        "framing error on response, retrying: {}",
                        framing
                    );
                }
                WaitOutcome::TimedOut => {
                    if pending.attempts > self.config.max_retries {
                        return Err(SessionError::RetriesExhausted {
                            command: pending.name,
                            attempts: pending.attempts,
                            reason: format!(
                                "no response within {}ms",
                                self.config.response_timeout.as_millis()
                            ),
                        });
                    }
                    tracing::warn!(
                        command = pending.name,
                        attempt = pending.attempts,
                        "response timeout, retrying"
                    );
                }
            }
        }
    }

    /// Poll the transport, feeding bytes to the decoder, until one decode
    /// event is available or the deadline passes. Only transport failures
    /// are errors here.
    fn await_response(&mut self, deadline: Instant) -> std::io::Result<WaitOutcome> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Ok(match event {
                    Ok(response) => WaitOutcome::Response(response),
                    Err(framing) => WaitOutcome::Framing(framing),
                });
            }
            if Instant::now() >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }

            let mut buf = [0u8; 64];
            match self.transport.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => self.events.extend(self.decoder.feed(&buf[..n])),
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Lazy per-command outcome iterator returned by [`Session::drive`].
pub struct Drive<'a, T: Transport> {
    session: &'a mut Session<T>,
    halted: bool,
}

impl<T: Transport> Iterator for Drive<'_, T> {
    type Item = Result<CommandOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let pending = self.session.queue.pop_front()?;
        let outcome = self.session.run_pending(pending);
        if outcome.is_err() {
            self.halted = true;
        }
        Some(outcome)
    }
}

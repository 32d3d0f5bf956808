//! # GantryKit Communication
//!
//! Serial transport and command-queue session for gantry controllers.
//! Builds on `gantrykit-protocol` for the wire codec and adds the flow
//! control the device requires: one frame in flight at a time, advancing
//! only on a checksum-verified, device-accepted response.

pub mod error;
pub mod serial;
pub mod session;
pub mod transport;

pub use error::{Result, SessionError};
pub use serial::{
    find_gantry_port, list_ports, SerialPortInfo, SerialTransport, DEFAULT_BAUD_RATE, GANTRY_PID,
    GANTRY_VID,
};
pub use session::{CommandOutcome, Drive, Session, SessionConfig};
pub use transport::Transport;

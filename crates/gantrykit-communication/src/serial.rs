//! Serial port binding and discovery
//!
//! Binds the [`Transport`] trait to a physical serial port and locates the
//! gantry by its USB vendor/product identifiers. The controller speaks
//! 115200 baud, 8 data bits, no parity, one stop bit, no flow control.
//!
//! Discovery is a convenience for applications; the session driver itself
//! accepts any already-open [`Transport`].

use crate::error::{Result, SessionError};
use crate::transport::Transport;
use std::io::{self, Read, Write};
use std::time::Duration;

/// USB vendor id of the gantry controller.
pub const GANTRY_VID: u16 = 0x23C1;
/// USB product id of the gantry controller.
pub const GANTRY_PID: u16 = 0xB017;

/// Default line rate for the controller.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Information about an available serial port.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyACM0", "COM3").
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port").
    pub description: String,

    /// USB vendor ID if applicable.
    pub vid: Option<u16>,

    /// USB product ID if applicable.
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Whether this port's USB identifiers match the gantry controller.
    pub fn is_gantry(&self) -> bool {
        self.vid == Some(GANTRY_VID) && self.pid == Some(GANTRY_PID)
    }
}

/// List available serial ports on the system.
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    match serialport::available_ports() {
        Ok(ports) => Ok(ports.iter().map(port_info).collect()),
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(SessionError::Transport(io::Error::other(format!(
                "failed to enumerate ports: {}",
                e
            ))))
        }
    }
}

/// Find the first port whose USB identifiers match the gantry controller.
pub fn find_gantry_port() -> Result<Option<SerialPortInfo>> {
    Ok(list_ports()?.into_iter().find(SerialPortInfo::is_gantry))
}

fn port_info(port: &serialport::SerialPortInfo) -> SerialPortInfo {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => SerialPortInfo {
            port_name: port.port_name.clone(),
            description: format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            ),
            vid: Some(usb_info.vid),
            pid: Some(usb_info.pid),
        },
        serialport::SerialPortType::BluetoothPort => SerialPortInfo {
            port_name: port.port_name.clone(),
            description: "Bluetooth Serial".to_string(),
            vid: None,
            pid: None,
        },
        _ => SerialPortInfo {
            port_name: port.port_name.clone(),
            description: "Serial Port".to_string(),
            vid: None,
            pid: None,
        },
    }
}

/// Trait for serial port I/O operations.
pub trait ReadWrite: Read + Write + Send {}
impl<T: Read + Write + Send> ReadWrite for T {}

/// A [`Transport`] backed by a physical serial port.
pub struct SerialTransport {
    port: Box<dyn ReadWrite>,
    name: String,
}

impl SerialTransport {
    /// Open a serial port at the controller's settings: 8N1, no flow
    /// control, with a short read timeout so the session driver can poll.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let builder = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None);

        match builder.open_native() {
            Ok(port) => Ok(SerialTransport {
                port: Box::new(port),
                name: port_name.to_string(),
            }),
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", port_name, e);
                Err(SessionError::Transport(io::Error::other(format!(
                    "failed to open port {}: {}",
                    port_name, e
                ))))
            }
        }
    }

    /// Open the first discovered gantry port at the default baud rate.
    pub fn open_gantry() -> Result<Self> {
        match find_gantry_port()? {
            Some(info) => Self::open(&info.port_name, DEFAULT_BAUD_RATE),
            None => Err(SessionError::Transport(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "no serial port with VID {:04x} PID {:04x}",
                    GANTRY_VID, GANTRY_PID
                ),
            ))),
        }
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

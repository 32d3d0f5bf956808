//! Command catalog
//!
//! One enum variant per controller command, each a pure mapping from typed
//! arguments to a [`Frame`]. Encoding conventions:
//! - multi-byte numeric fields are little-endian, except the EEPROM read
//!   offset which the controller takes big-endian;
//! - distances and coordinates are signed 32-bit step counts;
//! - durations are microseconds, query delays milliseconds, and homing or
//!   wait timeouts whole seconds, per field;
//! - axis subsets encode as the 5-bit [`AxisSet`] mask.
//!
//! Values wider than their wire field wrap by bit-masking (two's complement
//! truncation). That wraparound matches the controller's own tolerance and
//! is deliberate: encoding never fails, callers validate ranges.

use crate::axes::AxisSet;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// Whether `EnableDisableAxes` powers the selected steppers on or off.
///
/// On the wire this is bit 7 of the axis-mask byte; it is kept as an enum
/// so a raw integer can never be passed where the intent matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisPower {
    /// Energize the selected axes (mask bit 7 set).
    Enabled,
    /// De-energize the selected axes (mask bit 7 clear).
    Disabled,
}

impl AxisPower {
    fn mask_bit(self) -> u8 {
        match self {
            AxisPower::Enabled => 0b1000_0000,
            AxisPower::Disabled => 0,
        }
    }
}

/// Blink behavior of the status LED.
///
/// Encodes to a single byte: 0 is constantly on, 1 is the fastest blink,
/// 255 the slowest. `Periodic(0)` therefore encodes the same as `Solid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlinkRate {
    /// LED constantly on.
    Solid,
    /// Blinking, 1 (fastest) to 255 (slowest).
    Periodic(u8),
}

impl BlinkRate {
    fn as_byte(self) -> u8 {
        match self {
            BlinkRate::Solid => 0,
            BlinkRate::Periodic(rate) => rate,
        }
    }
}

/// A controller command with its typed arguments.
///
/// Commands are immutable values; [`Command::encode`] is a pure transform
/// to the framed wire packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Query firmware version.
    GetVersion,
    /// Initialize the controller to its boot state.
    Init,
    /// Query free space in the controller's command buffer, in bytes.
    AvailableBufferSize,
    /// Discard all buffered commands on the controller.
    ClearBuffer,
    /// Abort the current command and stop all motion immediately.
    Abort,
    /// Pause or resume buffered command execution.
    Pause,
    /// Forward a raw query to a tool and relay its reply.
    ToolQuery {
        /// Index of the addressed tool.
        tool_index: u8,
        /// Tool-specific query bytes, forwarded verbatim.
        query: Vec<u8>,
    },
    /// Ask whether all buffered commands have finished executing.
    IsFinished,
    /// Read bytes from controller EEPROM.
    EepromRead {
        /// EEPROM offset (big-endian on the wire).
        offset: u16,
        /// Number of bytes to read.
        count: u8,
    },
    /// Write bytes to controller EEPROM. The wire byte count is derived
    /// from `data` (truncated to 255).
    EepromWrite {
        /// EEPROM offset (little-endian on the wire).
        offset: u16,
        /// Bytes to write.
        data: Vec<u8>,
    },
    /// Soft-reset the controller.
    Reset,
    /// Query the current extended position, in steps.
    GetCurrentPosition,
    /// Query motherboard status flags.
    GetMotherboardStatus,
    /// Home the selected axes toward their minimum endstops.
    HomeAxesMinimum {
        /// Axes to home.
        axes: AxisSet,
        /// Feedrate in microseconds per step.
        feedrate: u32,
        /// Give up after this many seconds.
        timeout_s: u16,
    },
    /// Home the selected axes toward their maximum endstops.
    HomeAxesMaximum {
        /// Axes to home.
        axes: AxisSet,
        /// Feedrate in microseconds per step.
        feedrate: u32,
        /// Give up after this many seconds.
        timeout_s: u16,
    },
    /// Pause buffered execution for a fixed duration.
    Delay {
        /// Delay length in microseconds.
        duration_us: u32,
    },
    /// Switch the active tool.
    ChangeTool {
        /// Tool id to switch to.
        tool: u8,
    },
    /// Block buffered execution until a tool reports ready.
    WaitForToolReady {
        /// Tool id to wait for.
        tool: u8,
        /// Delay between readiness queries, in milliseconds.
        query_delay_ms: u16,
        /// Continue without the tool after this many seconds.
        timeout_s: u16,
    },
    /// Forward an action command to a tool.
    ToolAction {
        /// Tool id to act on.
        tool: u8,
        /// Tool-specific action id.
        action: u8,
        /// Action payload bytes, forwarded verbatim.
        payload: Vec<u8>,
    },
    /// Energize or de-energize stepper drivers for the selected axes.
    EnableDisableAxes {
        /// Axes whose drivers are affected.
        axes: AxisSet,
        /// Whether to enable or disable them.
        power: AxisPower,
    },
    /// Queue a motion using the legacy DDA-feedrate encoding.
    QueueExtendedPointLegacy {
        /// Target X, in steps.
        x: i32,
        /// Target Y, in steps.
        y: i32,
        /// Target Z, in steps.
        z: i32,
        /// Target A, in steps.
        a: i32,
        /// Target B, in steps.
        b: i32,
        /// Microseconds between steps on the longest axis delta.
        feedrate_us: u32,
    },
    /// Overwrite the controller's idea of the current position.
    SetExtendedPosition {
        /// X position, in steps.
        x: i32,
        /// Y position, in steps.
        y: i32,
        /// Z position, in steps.
        z: i32,
        /// A position, in steps.
        a: i32,
        /// B position, in steps.
        b: i32,
    },
    /// Block buffered execution until the build platform reports ready.
    WaitForPlatformReady {
        /// Tool id of the platform to wait for.
        tool: u8,
        /// Delay between readiness queries, in milliseconds.
        query_delay_ms: u16,
        /// Continue without the platform after this many seconds.
        timeout_s: u16,
    },
    /// Queue a motion with an explicit duration and relative-axis mask.
    QueueExtendedPoint {
        /// Target X, in steps.
        x: i32,
        /// Target Y, in steps.
        y: i32,
        /// Target Z, in steps.
        z: i32,
        /// Target A, in steps.
        a: i32,
        /// Target B, in steps.
        b: i32,
        /// Duration of the whole motion, in microseconds.
        duration_us: u32,
        /// Axes interpreted as relative coordinates.
        axes: AxisSet,
    },
    /// Set the RGB status LED color and blink rate.
    SetRgbLed {
        /// Red intensity.
        red: u8,
        /// Green intensity.
        green: u8,
        /// Blue intensity.
        blue: u8,
        /// Blink behavior.
        blink: BlinkRate,
    },
}

impl Command {
    /// The wire command id.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::GetVersion => 0x00,
            Command::Init => 0x01,
            Command::AvailableBufferSize => 0x02,
            Command::ClearBuffer => 0x03,
            Command::Abort => 0x07,
            Command::Pause => 0x08,
            Command::ToolQuery { .. } => 0x0A,
            Command::IsFinished => 0x0B,
            Command::EepromRead { .. } => 0x0C,
            Command::EepromWrite { .. } => 0x0D,
            Command::Reset => 0x11,
            Command::GetCurrentPosition => 0x15,
            Command::GetMotherboardStatus => 0x17,
            Command::HomeAxesMinimum { .. } => 0x83,
            Command::HomeAxesMaximum { .. } => 0x84,
            Command::Delay { .. } => 0x85,
            Command::ChangeTool { .. } => 0x86,
            Command::WaitForToolReady { .. } => 0x87,
            Command::ToolAction { .. } => 0x88,
            Command::EnableDisableAxes { .. } => 0x89,
            Command::QueueExtendedPointLegacy { .. } => 0x8B,
            Command::SetExtendedPosition { .. } => 0x8C,
            Command::WaitForPlatformReady { .. } => 0x8D,
            Command::QueueExtendedPoint { .. } => 0x8E,
            Command::SetRgbLed { .. } => 0x92,
        }
    }

    /// Human-readable command name, used when surfacing queue failures.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetVersion => "GetVersion",
            Command::Init => "Init",
            Command::AvailableBufferSize => "AvailableBufferSize",
            Command::ClearBuffer => "ClearBuffer",
            Command::Abort => "Abort",
            Command::Pause => "Pause",
            Command::ToolQuery { .. } => "ToolQuery",
            Command::IsFinished => "IsFinished",
            Command::EepromRead { .. } => "EepromRead",
            Command::EepromWrite { .. } => "EepromWrite",
            Command::Reset => "Reset",
            Command::GetCurrentPosition => "GetCurrentPosition",
            Command::GetMotherboardStatus => "GetMotherboardStatus",
            Command::HomeAxesMinimum { .. } => "HomeAxesMinimum",
            Command::HomeAxesMaximum { .. } => "HomeAxesMaximum",
            Command::Delay { .. } => "Delay",
            Command::ChangeTool { .. } => "ChangeTool",
            Command::WaitForToolReady { .. } => "WaitForToolReady",
            Command::ToolAction { .. } => "ToolAction",
            Command::EnableDisableAxes { .. } => "EnableDisableAxes",
            Command::QueueExtendedPointLegacy { .. } => "QueueExtendedPointLegacy",
            Command::SetExtendedPosition { .. } => "SetExtendedPosition",
            Command::WaitForPlatformReady { .. } => "WaitForPlatformReady",
            Command::QueueExtendedPoint { .. } => "QueueExtendedPoint",
            Command::SetRgbLed { .. } => "SetRgbLed",
        }
    }

    /// The payload bytes following the command id.
    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Command::GetVersion
            | Command::Init
            | Command::AvailableBufferSize
            | Command::ClearBuffer
            | Command::Abort
            | Command::Pause
            | Command::IsFinished
            | Command::Reset
            | Command::GetCurrentPosition
            | Command::GetMotherboardStatus => {}
            Command::ToolQuery { tool_index, query } => {
                out.push(*tool_index);
                out.extend_from_slice(query);
            }
            Command::EepromRead { offset, count } => {
                // Offset is the one big-endian field in the catalog
                out.extend_from_slice(&offset.to_be_bytes());
                out.push(*count);
            }
            Command::EepromWrite { offset, data } => {
                out.extend_from_slice(&offset.to_le_bytes());
                out.push(data.len() as u8);
                out.extend_from_slice(data);
            }
            Command::HomeAxesMinimum {
                axes,
                feedrate,
                timeout_s,
            }
            | Command::HomeAxesMaximum {
                axes,
                feedrate,
                timeout_s,
            } => {
                out.push(axes.bits());
                out.extend_from_slice(&feedrate.to_le_bytes());
                out.extend_from_slice(&timeout_s.to_le_bytes());
            }
            Command::Delay { duration_us } => {
                out.extend_from_slice(&duration_us.to_le_bytes());
            }
            Command::ChangeTool { tool } => {
                out.push(*tool);
            }
            Command::WaitForToolReady {
                tool,
                query_delay_ms,
                timeout_s,
            }
            | Command::WaitForPlatformReady {
                tool,
                query_delay_ms,
                timeout_s,
            } => {
                out.push(*tool);
                out.extend_from_slice(&query_delay_ms.to_le_bytes());
                out.extend_from_slice(&timeout_s.to_le_bytes());
            }
            Command::ToolAction {
                tool,
                action,
                payload,
            } => {
                out.push(*tool);
                out.push(*action);
                out.extend_from_slice(payload);
            }
            Command::EnableDisableAxes { axes, power } => {
                out.push(axes.bits() | power.mask_bit());
            }
            Command::QueueExtendedPointLegacy {
                x,
                y,
                z,
                a,
                b,
                feedrate_us,
            } => {
                for coord in [x, y, z, a, b] {
                    out.extend_from_slice(&coord.to_le_bytes());
                }
                out.extend_from_slice(&feedrate_us.to_le_bytes());
            }
            Command::SetExtendedPosition { x, y, z, a, b } => {
                for coord in [x, y, z, a, b] {
                    out.extend_from_slice(&coord.to_le_bytes());
                }
            }
            Command::QueueExtendedPoint {
                x,
                y,
                z,
                a,
                b,
                duration_us,
                axes,
            } => {
                for coord in [x, y, z, a, b] {
                    out.extend_from_slice(&coord.to_le_bytes());
                }
                out.extend_from_slice(&duration_us.to_le_bytes());
                out.push(axes.bits());
            }
            Command::SetRgbLed {
                red,
                green,
                blue,
                blink,
            } => {
                out.push(*red);
                out.push(*green);
                out.push(*blue);
                out.push(blink.as_byte());
                // Reserved, always zero
                out.push(0x00);
            }
        }
        out
    }

    /// Encode to a framed wire packet. Pure; the frame derives its own
    /// length and check bytes.
    pub fn encode(&self) -> Frame {
        Frame::new(self.opcode(), self.payload())
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::Axis;

    #[test]
    fn test_no_payload_commands() {
        for (command, opcode, check) in [
            (Command::GetVersion, 0x00, 0x00),
            (Command::Init, 0x01, 0x5E),
            (Command::AvailableBufferSize, 0x02, 0xBC),
            (Command::ClearBuffer, 0x03, 0xE2),
            (Command::Abort, 0x07, 0x83),
            (Command::Pause, 0x08, 0xC2),
            (Command::IsFinished, 0x0B, 0x20),
            (Command::Reset, 0x11, 0xC3),
            (Command::GetCurrentPosition, 0x15, 0xA2),
            (Command::GetMotherboardStatus, 0x17, 0x1E),
        ] {
            let bytes = command.encode().to_bytes();
            assert_eq!(bytes, vec![0xD5, 0x01, opcode, check], "{}", command);
        }
    }

    #[test]
    fn test_queue_extended_point_layout() {
        // x=-13500, y=-6750, z=10000, 2s motion, all axes
        let command = Command::QueueExtendedPoint {
            x: -13500,
            y: -6750,
            z: 10000,
            a: 0,
            b: 0,
            duration_us: 2_000_000,
            axes: AxisSet::all(),
        };
        let bytes = command.encode().to_bytes();
        assert_eq!(bytes.len(), 29);
        assert_eq!(&bytes[..3], &[0xD5, 0x1A, 0x8E]);
        // Little-endian two's complement coordinates
        assert_eq!(&bytes[3..7], &[0x44, 0xCB, 0xFF, 0xFF]);
        assert_eq!(&bytes[7..11], &[0xA2, 0xE5, 0xFF, 0xFF]);
        assert_eq!(&bytes[11..15], &[0x10, 0x27, 0x00, 0x00]);
        assert_eq!(&bytes[15..23], &[0u8; 8]);
        assert_eq!(&bytes[23..27], &[0x80, 0x84, 0x1E, 0x00]);
        assert_eq!(bytes[27], 0x1F);
        assert_eq!(bytes[28], 0xC5);
    }

    #[test]
    fn test_set_rgb_led_layout() {
        let command = Command::SetRgbLed {
            red: 255,
            green: 0,
            blue: 0,
            blink: BlinkRate::Solid,
        };
        assert_eq!(
            command.encode().to_bytes(),
            vec![0xD5, 0x06, 0x92, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x16]
        );
    }

    #[test]
    fn test_home_axes_maximum() {
        let command = Command::HomeAxesMaximum {
            axes: AxisSet::from_names(["x", "y"]).unwrap(),
            feedrate: 300,
            timeout_s: 10,
        };
        assert_eq!(
            command.encode().to_bytes(),
            vec![0xD5, 0x08, 0x84, 0x03, 0x2C, 0x01, 0x00, 0x00, 0x0A, 0x00, 0x21]
        );
    }

    #[test]
    fn test_delay_has_its_own_opcode() {
        let command = Command::Delay {
            duration_us: 1_000_000,
        };
        let bytes = command.encode().to_bytes();
        assert_eq!(bytes[2], 0x85);
        assert_ne!(bytes[2], Command::GetCurrentPosition.opcode());
        assert_eq!(&bytes[3..7], &1_000_000u32.to_le_bytes());
        assert_eq!(bytes[7], 0x9F);
    }

    #[test]
    fn test_distinct_opcodes_for_former_collisions() {
        let wait = Command::WaitForToolReady {
            tool: 0,
            query_delay_ms: 100,
            timeout_s: 60,
        };
        let action = Command::ToolAction {
            tool: 0,
            action: 1,
            payload: vec![],
        };
        assert_eq!(wait.opcode(), 0x87);
        assert_eq!(action.opcode(), 0x88);
        assert_ne!(wait.opcode(), Command::GetMotherboardStatus.opcode());
        assert_ne!(action.opcode(), Command::GetMotherboardStatus.opcode());
        assert_ne!(
            Command::EepromWrite {
                offset: 0,
                data: vec![]
            }
            .opcode(),
            Command::EepromRead { offset: 0, count: 0 }.opcode()
        );
    }

    #[test]
    fn test_eeprom_read_offset_big_endian() {
        let command = Command::EepromRead {
            offset: 0x0102,
            count: 4,
        };
        assert_eq!(
            command.encode().to_bytes(),
            vec![0xD5, 0x04, 0x0C, 0x01, 0x02, 0x04, 0x49]
        );
    }

    #[test]
    fn test_eeprom_write_derives_count() {
        let command = Command::EepromWrite {
            offset: 0x0102,
            data: vec![0xAA, 0xBB],
        };
        let frame = command.encode();
        // offset LE, derived count, then data
        assert_eq!(frame.payload, vec![0x02, 0x01, 0x02, 0xAA, 0xBB]);
    }

    #[test]
    fn test_enable_disable_axes_power_bit() {
        let enable = Command::EnableDisableAxes {
            axes: AxisSet::all(),
            power: AxisPower::Enabled,
        };
        let disable = Command::EnableDisableAxes {
            axes: AxisSet::all(),
            power: AxisPower::Disabled,
        };
        assert_eq!(enable.payload(), vec![0x9F]);
        assert_eq!(disable.payload(), vec![0x1F]);
        assert_eq!(enable.encode().to_bytes()[4], 0xCD);
    }

    #[test]
    fn test_tool_query_length() {
        let command = Command::ToolQuery {
            tool_index: 2,
            query: vec![0x10, 0x20, 0x30],
        };
        let frame = command.encode();
        assert_eq!(frame.length(), 5);
        assert_eq!(frame.payload, vec![0x02, 0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_set_extended_position_zeroes() {
        let command = Command::SetExtendedPosition {
            x: 0,
            y: 0,
            z: 0,
            a: 0,
            b: 0,
        };
        let bytes = command.encode().to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[1], 0x15);
        assert_eq!(bytes[2], 0x8C);
        assert_eq!(bytes[23], 0x75);
    }

    #[test]
    fn test_legacy_point_uses_dda_feedrate() {
        let command = Command::QueueExtendedPointLegacy {
            x: 1,
            y: -1,
            z: 0,
            a: 0,
            b: 0,
            feedrate_us: 500,
        };
        let frame = command.encode();
        assert_eq!(frame.command_id, 0x8B);
        assert_eq!(frame.length(), 0x19);
        assert_eq!(&frame.payload[0..4], &1i32.to_le_bytes());
        assert_eq!(&frame.payload[4..8], &(-1i32).to_le_bytes());
        assert_eq!(&frame.payload[20..24], &500u32.to_le_bytes());
    }

    #[test]
    fn test_checksum_property_holds_across_catalog() {
        use crate::checksum::crc8_maxim;
        let commands = [
            Command::GetVersion,
            Command::ToolQuery {
                tool_index: 1,
                query: vec![0x02],
            },
            Command::ChangeTool { tool: 1 },
            Command::WaitForPlatformReady {
                tool: 0,
                query_delay_ms: 100,
                timeout_s: 60,
            },
            Command::SetRgbLed {
                red: 1,
                green: 2,
                blue: 3,
                blink: BlinkRate::Periodic(10),
            },
            Command::QueueExtendedPoint {
                x: 886,
                y: 0,
                z: 0,
                a: 0,
                b: 0,
                duration_us: 333_333,
                axes: AxisSet::from_iter([Axis::X, Axis::Y]),
            },
        ];
        for command in commands {
            let frame = command.encode();
            let bytes = frame.to_bytes();
            let body = &bytes[2..bytes.len() - 1];
            assert_eq!(crc8_maxim(body), *bytes.last().unwrap(), "{}", command);
            assert_eq!(bytes[1] as usize, body.len(), "{}", command);
        }
    }
}

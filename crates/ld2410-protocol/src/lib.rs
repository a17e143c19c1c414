//! Command, reply and report payload layouts for the LD2410 radar.
//!
//! Frame bodies on the wire come in three shapes:
//!
//! - **Commands** (host → device): opcode, reserved zero byte, arguments.
//! - **Replies** (device → host): opcode echo, marker `0x01`, 16-bit
//!   status, then the opcode-specific payload on success only.
//! - **Reports** (device → host, unsolicited): report kind, marker,
//!   detection data, fixed trailer.
//!
//! The [`Command`] trait ties each opcode to its argument encoder and
//! reply decoder; [`requests`] enumerates every supported command. The
//! connection layer treats all of these as opaque bodies: only the
//! opcode matters for request/reply correlation.

pub mod command;
pub mod error;
pub mod models;
mod reader;
pub mod report;
pub mod requests;

pub use command::{
    encode_command, Command, CommandCode, Reply, ReplyData, ReplyStatus, COMMAND_RESERVED,
    REPLY_MARKER,
};
pub use error::{ProtocolError, Result};
pub use models::{
    AuxiliaryControl, AuxiliaryControlConfig, AuxiliaryControlStatus, BaudRate, BluetoothMac,
    ConfigModeStatus, FirmwareVersion, GateSensitivityConfig, OutPinLevel, ParametersConfig,
    ParametersStatus, Resolution, ResolutionStatus, GATE_COUNT,
};
pub use report::{BasicReport, EngineeringReport, Report, ReportKind, TargetStatus};

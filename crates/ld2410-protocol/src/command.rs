use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, Result};
use crate::reader::PayloadReader;

/// Reserved byte following the opcode in every outbound command body.
pub const COMMAND_RESERVED: u8 = 0x00;
/// Marker byte following the opcode echo in every inbound reply body.
pub const REPLY_MARKER: u8 = 0x01;

/// Opcodes understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum CommandCode {
    ParametersWrite = 0x60,
    ParametersRead = 0x61,
    EngineeringEnable = 0x62,
    EngineeringDisable = 0x63,
    GateSensitivitySet = 0x64,
    FirmwareVersion = 0xA0,
    BaudRateSet = 0xA1,
    FactoryReset = 0xA2,
    ModuleRestart = 0xA3,
    BluetoothSet = 0xA4,
    BluetoothMacGet = 0xA5,
    // Only reachable over the Bluetooth channel; listed for completeness.
    BluetoothAuthenticate = 0xA8,
    BluetoothPasswordSet = 0xA9,
    DistanceResolutionSet = 0xAA,
    DistanceResolutionGet = 0xAB,
    AuxiliaryControlSet = 0xAD,
    AuxiliaryControlGet = 0xAE,
    ConfigDisable = 0xFE,
    ConfigEnable = 0xFF,
}

impl CommandCode {
    /// The raw opcode byte.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0x60 => CommandCode::ParametersWrite,
            0x61 => CommandCode::ParametersRead,
            0x62 => CommandCode::EngineeringEnable,
            0x63 => CommandCode::EngineeringDisable,
            0x64 => CommandCode::GateSensitivitySet,
            0xA0 => CommandCode::FirmwareVersion,
            0xA1 => CommandCode::BaudRateSet,
            0xA2 => CommandCode::FactoryReset,
            0xA3 => CommandCode::ModuleRestart,
            0xA4 => CommandCode::BluetoothSet,
            0xA5 => CommandCode::BluetoothMacGet,
            0xA8 => CommandCode::BluetoothAuthenticate,
            0xA9 => CommandCode::BluetoothPasswordSet,
            0xAA => CommandCode::DistanceResolutionSet,
            0xAB => CommandCode::DistanceResolutionGet,
            0xAD => CommandCode::AuxiliaryControlSet,
            0xAE => CommandCode::AuxiliaryControlGet,
            0xFE => CommandCode::ConfigDisable,
            0xFF => CommandCode::ConfigEnable,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        })
    }
}

impl std::fmt::Display for CommandCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:#04x})", self, self.code())
    }
}

/// Acknowledgement status carried by every reply (0 = success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReplyStatus(pub u16);

impl ReplyStatus {
    pub const SUCCESS: ReplyStatus = ReplyStatus(0);
    pub const FAILURE: ReplyStatus = ReplyStatus(1);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode a command body: opcode, reserved zero byte, then arguments.
pub fn encode_command(code: CommandCode, args: &[u8], dst: &mut BytesMut) {
    dst.reserve(2 + args.len());
    dst.put_u8(code.code());
    dst.put_u8(COMMAND_RESERVED);
    dst.put_slice(args);
}

/// The decoded envelope of a reply body.
///
/// `data` holds the opcode-specific payload and is only present when the
/// status is success; the device omits it entirely on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: CommandCode,
    pub status: ReplyStatus,
    pub data: Bytes,
}

impl Reply {
    /// Decode a reply envelope from a command-class frame body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(body);
        let code = CommandCode::try_from(r.u8()?)?;
        r.marker("reply", REPLY_MARKER)?;
        let status = ReplyStatus(r.u16_le()?);
        let data = if status.is_success() {
            Bytes::copy_from_slice(&body[4..])
        } else {
            Bytes::new()
        };
        Ok(Reply { code, status, data })
    }

    /// Encode a reply envelope (device side; used by the test emulator).
    pub fn encode(code: CommandCode, status: ReplyStatus, data: &[u8], dst: &mut BytesMut) {
        dst.reserve(4 + data.len());
        dst.put_u8(code.code());
        dst.put_u8(REPLY_MARKER);
        dst.put_u16_le(status.0);
        if status.is_success() {
            dst.put_slice(data);
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A typed request: opcode, argument encoding and reply payload decoding.
///
/// Each command the device understands is one implementation of this
/// trait, the (opcode, encoder, decoder) triple looked up statically.
/// The connection core never consults this; it moves opaque bodies.
pub trait Command {
    /// Opcode identifying the command/reply pair.
    const CODE: CommandCode;

    /// Decoded type of the success-reply payload.
    type Reply: ReplyData;

    /// Append the opcode-specific argument bytes.
    fn encode_args(&self, dst: &mut BytesMut);
}

/// Decoding of a success-reply payload.
pub trait ReplyData: Sized {
    fn decode(data: &[u8]) -> Result<Self>;
}

/// Commands whose success reply carries no payload.
impl ReplyData for () {
    fn decode(data: &[u8]) -> Result<Self> {
        PayloadReader::new(data).finish()
    }
}

use bytes::{BufMut, BytesMut};

use crate::command::ReplyData;
use crate::error::{ProtocolError, Result};
use crate::reader::PayloadReader;

/// Number of distance gates reported by the sensor (gate 0 through 8).
pub const GATE_COUNT: usize = 9;

/// Serial baud rates the device can be switched to, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u16)]
pub enum BaudRate {
    B9600 = 0x01,
    B19200 = 0x02,
    B38400 = 0x03,
    B57600 = 0x04,
    B115200 = 0x05,
    B230400 = 0x06,
    B256000 = 0x07,
    B460800 = 0x08,
}

impl BaudRate {
    /// Map a plain baud rate to its wire index, if the device supports it.
    pub fn from_rate(rate: u32) -> Option<Self> {
        Some(match rate {
            9600 => BaudRate::B9600,
            19200 => BaudRate::B19200,
            38400 => BaudRate::B38400,
            57600 => BaudRate::B57600,
            115200 => BaudRate::B115200,
            230400 => BaudRate::B230400,
            256000 => BaudRate::B256000,
            460800 => BaudRate::B460800,
            _ => return None,
        })
    }

    /// The plain baud rate in Hz.
    pub fn rate(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
            BaudRate::B230400 => 230400,
            BaudRate::B256000 => 256000,
            BaudRate::B460800 => 460800,
        }
    }

    /// The wire index for this rate.
    pub fn index(self) -> u16 {
        self as u16
    }
}

/// Per-gate distance resolution, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u16)]
pub enum Resolution {
    Cm75 = 0x00,
    Cm20 = 0x01,
}

impl Resolution {
    /// Map a resolution in centimeters to its wire index.
    pub fn from_cm(cm: u32) -> Option<Self> {
        match cm {
            75 => Some(Resolution::Cm75),
            20 => Some(Resolution::Cm20),
            _ => None,
        }
    }

    /// The resolution in centimeters.
    pub fn cm(self) -> u32 {
        match self {
            Resolution::Cm75 => 75,
            Resolution::Cm20 => 20,
        }
    }

    pub(crate) fn from_index(index: u16) -> Result<Self> {
        match index {
            0x00 => Ok(Resolution::Cm75),
            0x01 => Ok(Resolution::Cm20),
            other => Err(ProtocolError::UnknownValue {
                field: "resolution",
                value: other as u32,
            }),
        }
    }
}

/// When the auxiliary (photo-sensor) control drives the OUT pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u8)]
pub enum AuxiliaryControl {
    Disabled = 0,
    UnderThreshold = 1,
    AboveThreshold = 2,
}

impl AuxiliaryControl {
    pub(crate) fn from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(AuxiliaryControl::Disabled),
            1 => Ok(AuxiliaryControl::UnderThreshold),
            2 => Ok(AuxiliaryControl::AboveThreshold),
            other => Err(ProtocolError::UnknownValue {
                field: "auxiliary control",
                value: other as u32,
            }),
        }
    }
}

/// Idle level of the OUT pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u8)]
pub enum OutPinLevel {
    Low = 0,
    High = 1,
}

impl OutPinLevel {
    pub(crate) fn from_value(value: u32) -> Result<Self> {
        match value {
            0 => Ok(OutPinLevel::Low),
            1 => Ok(OutPinLevel::High),
            other => Err(ProtocolError::UnknownValue {
                field: "out pin level",
                value: other,
            }),
        }
    }
}

/// Values received when entering configuration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ConfigModeStatus {
    /// Version of the communication protocol.
    pub protocol_version: u16,
    /// Size of the device's internal read buffer, in bytes.
    pub buffer_size: u16,
}

impl ReplyData for ConfigModeStatus {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        let status = ConfigModeStatus {
            protocol_version: r.u16_le()?,
            buffer_size: r.u16_le()?,
        };
        r.finish()?;
        Ok(status)
    }
}

/// Firmware version as reported by the device.
///
/// The revision field is conventionally printed in hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FirmwareVersion {
    pub firmware_type: u16,
    pub major: u8,
    pub minor: u8,
    pub revision: u32,
}

impl ReplyData for FirmwareVersion {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        let firmware_type = r.u16_be()?;
        let minor = r.u8()?;
        let major = r.u8()?;
        let revision = r.u32_le()?;
        r.finish()?;
        Ok(FirmwareVersion {
            firmware_type,
            major,
            minor,
            revision,
        })
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}.{:08x}", self.major, self.minor, self.revision)
    }
}

/// Currently applied standard parameters, as read from the device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParametersStatus {
    /// Furthest configurable gate (the chip reports 8).
    pub max_distance_gate: u8,
    /// Furthest gate considered for motion detection.
    pub motion_max_distance_gate: u8,
    /// Furthest gate considered for standstill detection.
    pub standstill_max_distance_gate: u8,
    /// Motion sensitivity per gate, percent.
    pub motion_sensitivity: [u8; GATE_COUNT],
    /// Standstill sensitivity per gate, percent.
    pub standstill_sensitivity: [u8; GATE_COUNT],
    /// Presence hold time after the target leaves, seconds.
    pub no_one_idle_duration: u16,
}

const PARAMETERS_HEAD: u8 = 0xAA;

impl ReplyData for ParametersStatus {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        r.marker("parameters", PARAMETERS_HEAD)?;
        let status = ParametersStatus {
            max_distance_gate: r.u8()?,
            motion_max_distance_gate: r.u8()?,
            standstill_max_distance_gate: r.u8()?,
            motion_sensitivity: r.array()?,
            standstill_sensitivity: r.array()?,
            no_one_idle_duration: r.u16_le()?,
        };
        r.finish()?;
        Ok(status)
    }
}

/// Standard parameters to write with `PARAMETERS_WRITE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ParametersConfig {
    /// Furthest gate for motion detection (2 to 8).
    pub motion_max_distance_gate: u32,
    /// Furthest gate for standstill detection (2 to 8).
    pub standstill_max_distance_gate: u32,
    /// Presence hold time after the target leaves, seconds.
    pub no_one_idle_duration: u32,
}

impl ParametersConfig {
    /// Encode as the device's (word tag, u32 value) triple list.
    pub fn encode_args(&self, dst: &mut BytesMut) {
        put_tagged_word(dst, 0, self.motion_max_distance_gate);
        put_tagged_word(dst, 1, self.standstill_max_distance_gate);
        put_tagged_word(dst, 2, self.no_one_idle_duration);
    }
}

/// Sensitivity settings for one gate (or all gates via broadcast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct GateSensitivityConfig {
    /// Gate to configure, 0 to 8, or [`GateSensitivityConfig::ALL_GATES`].
    pub distance_gate: u32,
    /// Motion sensitivity, percent.
    pub motion_sensitivity: u32,
    /// Standstill sensitivity, percent.
    pub standstill_sensitivity: u32,
}

impl GateSensitivityConfig {
    /// Broadcast value applying the sensitivities to every gate.
    pub const ALL_GATES: u32 = 0xFFFF;

    /// Encode as the device's (word tag, u32 value) triple list.
    pub fn encode_args(&self, dst: &mut BytesMut) {
        put_tagged_word(dst, 0, self.distance_gate);
        put_tagged_word(dst, 1, self.motion_sensitivity);
        put_tagged_word(dst, 2, self.standstill_sensitivity);
    }
}

fn put_tagged_word(dst: &mut BytesMut, tag: u16, value: u32) {
    dst.put_u16_le(tag);
    dst.put_u32_le(value);
}

/// Bluetooth MAC address of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BluetoothMac(pub [u8; 6]);

impl ReplyData for BluetoothMac {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        let mac = BluetoothMac(r.array()?);
        r.finish()?;
        Ok(mac)
    }
}

impl std::fmt::Display for BluetoothMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Reply payload of `DISTANCE_RESOLUTION_GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResolutionStatus {
    pub resolution: Resolution,
}

impl ReplyData for ResolutionStatus {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        let resolution = Resolution::from_index(r.u16_le()?)?;
        r.finish()?;
        Ok(ResolutionStatus { resolution })
    }
}

/// Auxiliary (photo-sensor) control settings for the OUT pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AuxiliaryControlConfig {
    /// When the OUT pin is driven relative to the threshold.
    pub control: AuxiliaryControl,
    /// Photo-sensitivity threshold, 0 to 255.
    pub threshold: u8,
    /// OUT pin level when not triggered.
    pub default: OutPinLevel,
}

impl AuxiliaryControlConfig {
    pub fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u8(self.control as u8);
        dst.put_u8(self.threshold);
        dst.put_u16_le(self.default as u16);
    }
}

/// Current auxiliary control settings, as read from the device.
pub type AuxiliaryControlStatus = AuxiliaryControlConfig;

impl ReplyData for AuxiliaryControlConfig {
    fn decode(data: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(data);
        let control = AuxiliaryControl::from_byte(r.u8()?)?;
        let threshold = r.u8()?;
        let default = OutPinLevel::from_value(r.u16_le()? as u32)?;
        r.finish()?;
        Ok(AuxiliaryControlConfig {
            control,
            threshold,
            default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_rate_mapping() {
        assert_eq!(BaudRate::from_rate(256000), Some(BaudRate::B256000));
        assert_eq!(BaudRate::B256000.index(), 0x07);
        assert_eq!(BaudRate::B9600.index(), 0x01);
        assert_eq!(BaudRate::from_rate(12345), None);
        assert_eq!(BaudRate::B460800.rate(), 460800);
    }

    #[test]
    fn resolution_mapping() {
        assert_eq!(Resolution::from_cm(20), Some(Resolution::Cm20));
        assert_eq!(Resolution::from_cm(75), Some(Resolution::Cm75));
        assert_eq!(Resolution::from_cm(50), None);
        assert!(Resolution::from_index(2).is_err());
    }

    #[test]
    fn config_mode_status_decodes() {
        let status = ConfigModeStatus::decode(&[0x01, 0x00, 0x40, 0x00]).unwrap();
        assert_eq!(status.protocol_version, 1);
        assert_eq!(status.buffer_size, 64);
    }

    #[test]
    fn firmware_version_layout_and_display() {
        // type (u16be), minor, major, revision (u32le).
        let data = [0x00, 0x00, 0x02, 0x01, 0x16, 0x24, 0x06, 0x22];
        let version = FirmwareVersion::decode(&data).unwrap();
        assert_eq!(version.firmware_type, 0);
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.revision, 0x22062416);
        assert_eq!(version.to_string(), "1.02.22062416");
    }

    #[test]
    fn parameters_status_layout() {
        let mut data = vec![0xAA, 8, 7, 6];
        data.extend_from_slice(&[50, 50, 40, 30, 20, 15, 15, 15, 15]);
        data.extend_from_slice(&[0, 0, 40, 40, 30, 30, 20, 20, 20]);
        data.extend_from_slice(&5u16.to_le_bytes());

        let status = ParametersStatus::decode(&data).unwrap();
        assert_eq!(status.max_distance_gate, 8);
        assert_eq!(status.motion_max_distance_gate, 7);
        assert_eq!(status.standstill_max_distance_gate, 6);
        assert_eq!(status.motion_sensitivity[0], 50);
        assert_eq!(status.standstill_sensitivity[8], 20);
        assert_eq!(status.no_one_idle_duration, 5);
    }

    #[test]
    fn parameters_status_requires_head_marker() {
        let data = vec![0x00; 23];
        assert!(matches!(
            ParametersStatus::decode(&data),
            Err(ProtocolError::BadMarker {
                field: "parameters",
                ..
            })
        ));
    }

    #[test]
    fn parameters_config_tagged_words() {
        let config = ParametersConfig {
            motion_max_distance_gate: 8,
            standstill_max_distance_gate: 8,
            no_one_idle_duration: 5,
        };
        let mut buf = BytesMut::new();
        config.encode_args(&mut buf);
        assert_eq!(
            buf.as_ref(),
            &[
                0x00, 0x00, 0x08, 0x00, 0x00, 0x00, //
                0x01, 0x00, 0x08, 0x00, 0x00, 0x00, //
                0x02, 0x00, 0x05, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn gate_sensitivity_broadcast() {
        let config = GateSensitivityConfig {
            distance_gate: GateSensitivityConfig::ALL_GATES,
            motion_sensitivity: 25,
            standstill_sensitivity: 20,
        };
        let mut buf = BytesMut::new();
        config.encode_args(&mut buf);
        assert_eq!(&buf[2..6], &[0xFF, 0xFF, 0x00, 0x00]);
        assert_eq!(buf.len(), 18);
    }

    #[test]
    fn bluetooth_mac_display() {
        let mac = BluetoothMac::decode(&[0x8F, 0x27, 0x2E, 0xB8, 0x0F, 0x65]).unwrap();
        assert_eq!(mac.to_string(), "8f:27:2e:b8:0f:65");
    }

    #[test]
    fn auxiliary_control_round_trip() {
        let config = AuxiliaryControlConfig {
            control: AuxiliaryControl::UnderThreshold,
            threshold: 120,
            default: OutPinLevel::Low,
        };
        let mut buf = BytesMut::new();
        config.encode_args(&mut buf);
        assert_eq!(buf.as_ref(), &[0x01, 120, 0x00, 0x00]);

        let decoded = AuxiliaryControlStatus::decode(&buf).unwrap();
        assert_eq!(decoded, config);
    }
}

//! Typed requests: one struct per device command, carrying its opcode,
//! argument encoding and reply payload type.

use bytes::{BufMut, BytesMut};

use crate::command::{Command, CommandCode};
use crate::models::{
    AuxiliaryControlConfig, AuxiliaryControlStatus, BaudRate, BluetoothMac, ConfigModeStatus,
    FirmwareVersion, GateSensitivityConfig, ParametersConfig, ParametersStatus, Resolution,
    ResolutionStatus,
};

/// Enter configuration mode.
pub struct EnterConfig;

impl Command for EnterConfig {
    const CODE: CommandCode = CommandCode::ConfigEnable;
    type Reply = ConfigModeStatus;

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u16_le(1);
    }
}

/// Leave configuration mode.
pub struct ExitConfig;

impl Command for ExitConfig {
    const CODE: CommandCode = CommandCode::ConfigDisable;
    type Reply = ();

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Read the standard detection parameters.
pub struct ReadParameters;

impl Command for ReadParameters {
    const CODE: CommandCode = CommandCode::ParametersRead;
    type Reply = ParametersStatus;

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Write the standard detection parameters.
pub struct WriteParameters(pub ParametersConfig);

impl Command for WriteParameters {
    const CODE: CommandCode = CommandCode::ParametersWrite;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        self.0.encode_args(dst);
    }
}

/// Set per-gate sensitivities.
pub struct SetGateSensitivity(pub GateSensitivityConfig);

impl Command for SetGateSensitivity {
    const CODE: CommandCode = CommandCode::GateSensitivitySet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        self.0.encode_args(dst);
    }
}

/// Enable engineering reports.
pub struct EnableEngineering;

impl Command for EnableEngineering {
    const CODE: CommandCode = CommandCode::EngineeringEnable;
    type Reply = ();

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Disable engineering reports.
pub struct DisableEngineering;

impl Command for DisableEngineering {
    const CODE: CommandCode = CommandCode::EngineeringDisable;
    type Reply = ();

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Read the firmware version.
pub struct ReadFirmwareVersion;

impl Command for ReadFirmwareVersion {
    const CODE: CommandCode = CommandCode::FirmwareVersion;
    type Reply = FirmwareVersion;

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Switch the serial baud rate (effective after module restart).
pub struct SetBaudRate(pub BaudRate);

impl Command for SetBaudRate {
    const CODE: CommandCode = CommandCode::BaudRateSet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.0.index());
    }
}

/// Reset every parameter to factory defaults (effective after restart).
pub struct FactoryReset;

impl Command for FactoryReset {
    const CODE: CommandCode = CommandCode::FactoryReset;
    type Reply = ();

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Restart the module immediately.
pub struct RestartModule;

impl Command for RestartModule {
    const CODE: CommandCode = CommandCode::ModuleRestart;
    type Reply = ();

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Enable or disable the Bluetooth radio (effective after restart).
pub struct SetBluetooth(pub bool);

impl Command for SetBluetooth {
    const CODE: CommandCode = CommandCode::BluetoothSet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.0 as u16);
    }
}

/// Read the Bluetooth MAC address.
pub struct ReadBluetoothMac;

impl Command for ReadBluetoothMac {
    const CODE: CommandCode = CommandCode::BluetoothMacGet;
    type Reply = BluetoothMac;

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u16_le(1);
    }
}

/// Set the Bluetooth password (six zero-padded ASCII bytes).
pub struct SetBluetoothPassword(pub [u8; 6]);

impl Command for SetBluetoothPassword {
    const CODE: CommandCode = CommandCode::BluetoothPasswordSet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.0);
    }
}

/// Switch the per-gate distance resolution (effective after restart).
pub struct SetResolution(pub Resolution);

impl Command for SetResolution {
    const CODE: CommandCode = CommandCode::DistanceResolutionSet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.0 as u16);
    }
}

/// Read the per-gate distance resolution.
pub struct ReadResolution;

impl Command for ReadResolution {
    const CODE: CommandCode = CommandCode::DistanceResolutionGet;
    type Reply = ResolutionStatus;

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

/// Set the auxiliary (photo-sensor) OUT pin controls.
pub struct SetAuxiliaryControl(pub AuxiliaryControlConfig);

impl Command for SetAuxiliaryControl {
    const CODE: CommandCode = CommandCode::AuxiliaryControlSet;
    type Reply = ();

    fn encode_args(&self, dst: &mut BytesMut) {
        self.0.encode_args(dst);
    }
}

/// Read the auxiliary (photo-sensor) OUT pin controls.
pub struct ReadAuxiliaryControl;

impl Command for ReadAuxiliaryControl {
    const CODE: CommandCode = CommandCode::AuxiliaryControlGet;
    type Reply = AuxiliaryControlStatus;

    fn encode_args(&self, _dst: &mut BytesMut) {}
}

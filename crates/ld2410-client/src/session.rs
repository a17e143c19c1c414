//! The configuration-mode session protocol.
//!
//! The device runs in one of two modes: in normal mode it streams
//! detection reports and accepts almost nothing; in configuration mode
//! reports stop and the configuration command set opens up. Entering and
//! leaving the mode is itself a command exchange, wrapped here in a
//! closure scope so the exit command can never be forgotten.

use std::sync::atomic::Ordering;

use ld2410_protocol::requests::{
    DisableEngineering, EnableEngineering, EnterConfig, ExitConfig, FactoryReset, ReadAuxiliaryControl,
    ReadBluetoothMac, ReadFirmwareVersion, ReadParameters, ReadResolution, RestartModule,
    SetAuxiliaryControl, SetBaudRate, SetBluetooth, SetBluetoothPassword, SetGateSensitivity,
    SetResolution, WriteParameters,
};
use ld2410_protocol::{
    AuxiliaryControlConfig, AuxiliaryControlStatus, BaudRate, BluetoothMac, ConfigModeStatus,
    FirmwareVersion, GateSensitivityConfig, ParametersConfig, ParametersStatus, Resolution,
};
use tracing::{info, warn};

use crate::device::Ld2410;
use crate::error::{ClientError, Result};

/// Longest accepted Bluetooth password, in ASCII characters.
const BLUETOOTH_PASSWORD_MAX: usize = 6;

impl Ld2410 {
    /// Run `f` inside a configuration session.
    ///
    /// At most one session exists per client; a second caller waits for
    /// the first to finish. The session is entered with the mode-enable
    /// command and always left with the mode-disable command, except
    /// when the device restarted mid-session: the device already dropped
    /// out of configuration mode on its own, so the disable step is
    /// skipped.
    ///
    /// A failure status on the disable command is logged, never raised:
    /// session teardown does not fail.
    ///
    /// [`ClientError::ModuleRestarted`] from
    /// [`ConfigSession::restart_module`] with `close_session: true` is
    /// intercepted for the abbreviated teardown and then propagated, so
    /// a caller that asked to observe the restart does.
    pub fn configure<T>(&self, f: impl FnOnce(&ConfigSession<'_>) -> Result<T>) -> Result<T> {
        let _session = self
            .session_gate
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let status = self.command(&EnterConfig)?;
        self.session_restarted.store(false, Ordering::SeqCst);
        self.session_active.store(true, Ordering::SeqCst);

        let session = ConfigSession {
            client: self,
            status,
        };
        let result = f(&session);

        if let Err(ClientError::ModuleRestarted) = &result {
            info!("configuration session closed by module restart");
        }

        let restarted = self.session_restarted.swap(false, Ordering::SeqCst);
        if !restarted && self.connected() {
            match self.command(&ExitConfig) {
                Ok(()) => {}
                Err(err) => {
                    // Teardown never fails; the next command surfaces any
                    // real connectivity problem.
                    warn!(%err, "ignoring failed configuration-mode exit");
                }
            }
        }
        self.session_active.store(false, Ordering::SeqCst);

        result
    }
}

/// Capability handle for configuration-mode commands.
///
/// Only exists inside [`Ld2410::configure`], so configuration commands
/// cannot be issued from normal mode at all. Once the device has
/// restarted inside the session the handle stops working: every
/// operation fails with [`ClientError::WrongContext`].
pub struct ConfigSession<'a> {
    pub(crate) client: &'a Ld2410,
    pub(crate) status: ConfigModeStatus,
}

impl ConfigSession<'_> {
    /// Protocol information returned by the mode-enable command.
    pub fn status(&self) -> ConfigModeStatus {
        self.status
    }

    fn guard(&self) -> Result<()> {
        if self.client.session_restarted.load(Ordering::SeqCst) {
            return Err(ClientError::WrongContext("module restarted"));
        }
        Ok(())
    }

    /// Read the standard detection parameters.
    pub fn parameters(&self) -> Result<ParametersStatus> {
        self.guard()?;
        self.client.command(&ReadParameters)
    }

    /// Write the standard detection parameters.
    ///
    /// Applies immediately and persists across restarts.
    pub fn set_parameters(&self, config: ParametersConfig) -> Result<()> {
        self.guard()?;
        self.client.command(&WriteParameters(config))
    }

    /// Set sensitivities for one gate, or all gates via
    /// [`GateSensitivityConfig::ALL_GATES`].
    pub fn set_gate_sensitivity(&self, config: GateSensitivityConfig) -> Result<()> {
        self.guard()?;
        self.client.command(&SetGateSensitivity(config))
    }

    /// Enable or disable the engineering part of detection reports.
    ///
    /// Engineering mode is lost when the device restarts.
    pub fn set_engineering_mode(&self, enabled: bool) -> Result<()> {
        self.guard()?;
        if enabled {
            self.client.command(&EnableEngineering)
        } else {
            self.client.command(&DisableEngineering)
        }
    }

    /// Read the firmware version.
    pub fn firmware_version(&self) -> Result<FirmwareVersion> {
        self.guard()?;
        self.client.command(&ReadFirmwareVersion)
    }

    /// Switch the serial baud rate. Takes effect after a module restart.
    ///
    /// The rate must be one the device supports; unknown rates fail with
    /// [`ClientError::BadParameter`] before anything is sent.
    pub fn set_baud_rate(&self, rate: u32) -> Result<()> {
        self.guard()?;
        let index = BaudRate::from_rate(rate)
            .ok_or_else(|| ClientError::BadParameter(format!("unsupported baud rate {rate}")))?;
        self.client.command(&SetBaudRate(index))
    }

    /// Reset every parameter to factory defaults.
    ///
    /// Takes effect after a module restart.
    pub fn factory_reset(&self) -> Result<()> {
        self.guard()?;
        self.client.command(&FactoryReset)
    }

    /// Restart the module immediately.
    ///
    /// The device leaves configuration mode on its own as it reboots, so
    /// the surrounding [`configure`](Ld2410::configure) scope skips the
    /// mode-disable command afterwards.
    ///
    /// With `close_session: true` this returns
    /// [`ClientError::ModuleRestarted`] to unwind the session scope; the
    /// scope re-propagates it after cleanup, so do not swallow it.
    pub fn restart_module(&self, close_session: bool) -> Result<()> {
        self.guard()?;
        self.client.command(&RestartModule)?;
        self.client.session_restarted.store(true, Ordering::SeqCst);
        if close_session {
            return Err(ClientError::ModuleRestarted);
        }
        Ok(())
    }

    /// Enable or disable the Bluetooth radio. Takes effect after restart.
    pub fn set_bluetooth(&self, enabled: bool) -> Result<()> {
        self.guard()?;
        self.client.command(&SetBluetooth(enabled))
    }

    /// Read the Bluetooth MAC address.
    pub fn bluetooth_mac(&self) -> Result<BluetoothMac> {
        self.guard()?;
        self.client.command(&ReadBluetoothMac)
    }

    /// Set the Bluetooth password.
    ///
    /// Must be at most six ASCII characters; validated before encoding.
    pub fn set_bluetooth_password(&self, password: &str) -> Result<()> {
        self.guard()?;
        if password.len() > BLUETOOTH_PASSWORD_MAX || !password.is_ascii() {
            return Err(ClientError::BadParameter(format!(
                "bluetooth password must be at most {BLUETOOTH_PASSWORD_MAX} ASCII characters"
            )));
        }
        let mut padded = [0u8; BLUETOOTH_PASSWORD_MAX];
        padded[..password.len()].copy_from_slice(password.as_bytes());
        self.client.command(&SetBluetoothPassword(padded))
    }

    /// Switch the per-gate distance resolution (20 or 75 centimeters).
    ///
    /// Takes effect after a module restart. Other values fail with
    /// [`ClientError::BadParameter`] before anything is sent.
    pub fn set_distance_resolution(&self, centimeters: u32) -> Result<()> {
        self.guard()?;
        let resolution = Resolution::from_cm(centimeters).ok_or_else(|| {
            ClientError::BadParameter(format!("unsupported distance resolution {centimeters} cm"))
        })?;
        self.client.command(&SetResolution(resolution))
    }

    /// Read the per-gate distance resolution, in centimeters.
    pub fn distance_resolution(&self) -> Result<u32> {
        self.guard()?;
        let status = self.client.command(&ReadResolution)?;
        Ok(status.resolution.cm())
    }

    /// Set the auxiliary (photo-sensor) OUT pin controls.
    pub fn set_auxiliary_control(&self, config: AuxiliaryControlConfig) -> Result<()> {
        self.guard()?;
        self.client.command(&SetAuxiliaryControl(config))
    }

    /// Read the auxiliary (photo-sensor) OUT pin controls.
    pub fn auxiliary_control(&self) -> Result<AuxiliaryControlStatus> {
        self.guard()?;
        self.client.command(&ReadAuxiliaryControl)
    }
}

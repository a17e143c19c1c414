//! Client for the LD2410 presence radar over its serial protocol.
//!
//! The device streams unsolicited detection reports in normal mode and
//! accepts configuration commands only inside a mutually exclusive
//! configuration session. A background reader thread owns the byte
//! stream: it reassembles frames, feeds replies to the single in-flight
//! request and keeps the latest detection report available.
//!
//! ```no_run
//! use ld2410_client::Ld2410;
//!
//! fn main() -> ld2410_client::Result<()> {
//!     let radar = Ld2410::open("/dev/ttyUSB0")?;
//!
//!     let version = radar.configure(|session| session.firmware_version())?;
//!     println!("firmware v{version}");
//!
//!     let report = radar.next_report()?;
//!     println!(
//!         "presence: {}, distance: {} cm",
//!         report.basic.target_status.present(),
//!         report.basic.detection_distance
//!     );
//!     Ok(())
//! }
//! ```

mod conn;
mod device;
mod error;
mod session;
mod slot;

pub use device::{ClientConfig, Ld2410};
pub use error::{ClientError, Result};
pub use session::ConfigSession;

// Payload types callers interact with.
pub use ld2410_protocol::{
    AuxiliaryControl, AuxiliaryControlConfig, AuxiliaryControlStatus, BasicReport, BluetoothMac,
    CommandCode, ConfigModeStatus, EngineeringReport, FirmwareVersion, GateSensitivityConfig,
    OutPinLevel, ParametersConfig, ParametersStatus, Report, TargetStatus,
};

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod baud;
pub mod factory_reset;
pub mod info;
pub mod restart;
pub mod set_params;
pub mod set_sensitivity;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream detection reports.
    Watch(WatchArgs),
    /// Print firmware and configuration information.
    Info(InfoArgs),
    /// Write the standard detection parameters.
    SetParams(SetParamsArgs),
    /// Set per-gate sensitivities.
    SetSensitivity(SetSensitivityArgs),
    /// Switch the serial baud rate (takes effect after restart).
    Baud(BaudArgs),
    /// Reset the device to factory defaults.
    FactoryReset(FactoryResetArgs),
    /// Restart the module.
    Restart(RestartArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::SetParams(args) => set_params::run(args),
        Command::SetSensitivity(args) => set_sensitivity::run(args),
        Command::Baud(args) => baud::run(args),
        Command::FactoryReset(args) => factory_reset::run(args),
        Command::Restart(args) => restart::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Serial device path, e.g. /dev/ttyUSB0.
    pub device: PathBuf,
    /// Serial baud rate the device currently uses.
    #[arg(long, default_value_t = ld2410_transport::DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,
    /// Command reply timeout in milliseconds, 0 to wait forever.
    #[arg(long, default_value_t = 2000)]
    pub command_timeout_ms: u64,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Stop after printing this many reports.
    #[arg(long)]
    pub count: Option<usize>,
    /// Enable engineering reports for this run.
    #[arg(long)]
    pub engineering: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct SetParamsArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Furthest gate for motion detection (2-8).
    #[arg(long)]
    pub motion_gate: u32,
    /// Furthest gate for standstill detection (2-8).
    #[arg(long)]
    pub standstill_gate: u32,
    /// Presence hold time in seconds after the target leaves.
    #[arg(long)]
    pub idle: u32,
}

#[derive(Args, Debug)]
pub struct SetSensitivityArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Gate to configure (0-8), or "all".
    #[arg(long)]
    pub gate: String,
    /// Motion sensitivity in percent.
    #[arg(long)]
    pub motion: u32,
    /// Standstill sensitivity in percent.
    #[arg(long)]
    pub standstill: u32,
}

#[derive(Args, Debug)]
pub struct BaudArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// New baud rate (9600-460800, device-supported values only).
    pub rate: u32,
}

#[derive(Args, Debug)]
pub struct FactoryResetArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Restart the module afterwards so the reset takes effect.
    #[arg(long)]
    pub restart: bool,
}

#[derive(Args, Debug)]
pub struct RestartArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn open_client(args: &ConnectArgs) -> CliResult<ld2410_client::Ld2410> {
    let timeout = if args.command_timeout_ms == 0 {
        None
    } else {
        Some(std::time::Duration::from_millis(args.command_timeout_ms))
    };
    let config = ld2410_client::ClientConfig {
        baud_rate: args.baud_rate,
        command_timeout: timeout,
        ..ld2410_client::ClientConfig::default()
    };
    ld2410_client::Ld2410::open_with_config(&args.device, config)
        .map_err(|err| crate::exit::client_error("connect failed", err))
}

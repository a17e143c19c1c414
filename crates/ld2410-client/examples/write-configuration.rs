//! Read the current configuration, tighten it, and read it back.
//!
//! Usage: write-configuration [DEVICE]

use ld2410_client::{Ld2410, ParametersConfig};

fn main() -> ld2410_client::Result<()> {
    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let radar = Ld2410::open(&device)?;

    radar.configure(|session| {
        let version = session.firmware_version()?;
        println!("firmware v{version}");

        let before = session.parameters()?;
        println!("current parameters: {before:?}");

        session.set_parameters(ParametersConfig {
            motion_max_distance_gate: 6,
            standstill_max_distance_gate: 6,
            no_one_idle_duration: 5,
        })?;

        let after = session.parameters()?;
        println!("updated parameters: {after:?}");
        Ok(())
    })
}

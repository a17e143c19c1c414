//! Print detection reports as they arrive.
//!
//! Usage: read-reports [DEVICE]

use ld2410_client::Ld2410;

fn main() -> ld2410_client::Result<()> {
    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let radar = Ld2410::open(&device)?;
    println!("connected to {device}");

    loop {
        let report = radar.next_report()?;
        let basic = report.basic;
        println!(
            "present={} moving={} ({} cm, {}%) stationary={} ({} cm, {}%)",
            basic.target_status.present(),
            basic.target_status.moving(),
            basic.motion_distance,
            basic.motion_energy,
            basic.target_status.stationary(),
            basic.standstill_distance,
            basic.standstill_energy,
        );
    }
}

use ld2410_client::ClientError;

use crate::cmd::{open_client, InfoArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let client = open_client(&args.connect)?;

    let fields = client
        .configure(|session| {
            let mut fields: Vec<(&str, String)> = Vec::new();

            let mode = session.status();
            fields.push(("protocol_version", mode.protocol_version.to_string()));

            let version = session.firmware_version()?;
            fields.push(("firmware", version.to_string()));

            let params = session.parameters()?;
            fields.push(("max_distance_gate", params.max_distance_gate.to_string()));
            fields.push((
                "motion_max_distance_gate",
                params.motion_max_distance_gate.to_string(),
            ));
            fields.push((
                "standstill_max_distance_gate",
                params.standstill_max_distance_gate.to_string(),
            ));
            fields.push((
                "no_one_idle_duration",
                format!("{} s", params.no_one_idle_duration),
            ));
            fields.push((
                "motion_sensitivity",
                format_gates(&params.motion_sensitivity),
            ));
            fields.push((
                "standstill_sensitivity",
                format_gates(&params.standstill_sensitivity),
            ));

            // Not every variant or firmware answers these.
            match session.distance_resolution() {
                Ok(cm) => fields.push(("distance_resolution", format!("{cm} cm"))),
                Err(ClientError::CommandFailed { .. }) | Err(ClientError::Timeout(_)) => {
                    fields.push(("distance_resolution", "unavailable".to_string()));
                }
                Err(err) => return Err(err),
            }
            match session.bluetooth_mac() {
                Ok(mac) => fields.push(("bluetooth_mac", mac.to_string())),
                Err(ClientError::CommandFailed { .. }) | Err(ClientError::Timeout(_)) => {
                    fields.push(("bluetooth_mac", "unavailable".to_string()));
                }
                Err(err) => return Err(err),
            }

            Ok(fields)
        })
        .map_err(|err| client_error("reading device info failed", err))?;

    print_fields(&fields, format);
    Ok(SUCCESS)
}

fn format_gates(values: &[u8]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

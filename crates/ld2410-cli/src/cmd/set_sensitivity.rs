use ld2410_client::GateSensitivityConfig;

use crate::cmd::{open_client, SetSensitivityArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SetSensitivityArgs) -> CliResult<i32> {
    let distance_gate = parse_gate(&args.gate)?;
    let client = open_client(&args.connect)?;
    client
        .configure(|session| {
            session.set_gate_sensitivity(GateSensitivityConfig {
                distance_gate,
                motion_sensitivity: args.motion,
                standstill_sensitivity: args.standstill,
            })
        })
        .map_err(|err| client_error("writing gate sensitivity failed", err))?;
    println!(
        "sensitivity written: gate {}, motion {}%, standstill {}%",
        args.gate, args.motion, args.standstill
    );
    Ok(SUCCESS)
}

fn parse_gate(gate: &str) -> CliResult<u32> {
    if gate.eq_ignore_ascii_case("all") {
        return Ok(GateSensitivityConfig::ALL_GATES);
    }
    match gate.parse::<u32>() {
        Ok(value) if value <= 8 => Ok(value),
        _ => Err(CliError::new(
            USAGE,
            format!("invalid gate '{gate}': expected 0-8 or 'all'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_accepts_numbers_and_all() {
        assert_eq!(parse_gate("4").unwrap(), 4);
        assert_eq!(parse_gate("all").unwrap(), GateSensitivityConfig::ALL_GATES);
        assert_eq!(parse_gate("ALL").unwrap(), GateSensitivityConfig::ALL_GATES);
    }

    #[test]
    fn gate_rejects_out_of_range() {
        assert!(parse_gate("9").is_err());
        assert!(parse_gate("x").is_err());
    }
}

use ld2410_client::ParametersConfig;

use crate::cmd::{open_client, SetParamsArgs};
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: SetParamsArgs) -> CliResult<i32> {
    let client = open_client(&args.connect)?;
    client
        .configure(|session| {
            session.set_parameters(ParametersConfig {
                motion_max_distance_gate: args.motion_gate,
                standstill_max_distance_gate: args.standstill_gate,
                no_one_idle_duration: args.idle,
            })
        })
        .map_err(|err| client_error("writing parameters failed", err))?;
    println!(
        "parameters written: motion gate {}, standstill gate {}, idle {} s",
        args.motion_gate, args.standstill_gate, args.idle
    );
    Ok(SUCCESS)
}

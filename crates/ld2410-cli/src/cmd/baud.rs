use crate::cmd::{open_client, BaudArgs};
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: BaudArgs) -> CliResult<i32> {
    let client = open_client(&args.connect)?;
    client
        .configure(|session| session.set_baud_rate(args.rate))
        .map_err(|err| client_error("setting baud rate failed", err))?;
    println!(
        "baud rate set to {}; restart the module for it to take effect",
        args.rate
    );
    Ok(SUCCESS)
}

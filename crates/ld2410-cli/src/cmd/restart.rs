use ld2410_client::ClientError;

use crate::cmd::{open_client, RestartArgs};
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: RestartArgs) -> CliResult<i32> {
    let client = open_client(&args.connect)?;
    match client.configure(|session| session.restart_module(true)) {
        // The restart signal unwinding the session is the success path.
        Err(ClientError::ModuleRestarted) | Ok(()) => {
            println!("module restarting");
            Ok(SUCCESS)
        }
        Err(err) => Err(client_error("restart failed", err)),
    }
}

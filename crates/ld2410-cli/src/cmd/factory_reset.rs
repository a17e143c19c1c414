use ld2410_client::ClientError;

use crate::cmd::{open_client, FactoryResetArgs};
use crate::exit::{client_error, CliResult, SUCCESS};

pub fn run(args: FactoryResetArgs) -> CliResult<i32> {
    let client = open_client(&args.connect)?;
    let result = client.configure(|session| {
        session.factory_reset()?;
        if args.restart {
            session.restart_module(true)?;
        }
        Ok(())
    });
    match result {
        Ok(()) => {
            println!("factory reset done; restart the module for it to take effect");
            Ok(SUCCESS)
        }
        Err(ClientError::ModuleRestarted) => {
            println!("factory reset done, module restarting");
            Ok(SUCCESS)
        }
        Err(err) => Err(client_error("factory reset failed", err)),
    }
}

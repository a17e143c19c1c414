use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ld2410_client::ClientError;

use crate::cmd::{open_client, WatchArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let client = open_client(&args.connect)?;

    if args.engineering {
        client
            .configure(|session| session.set_engineering_mode(true))
            .map_err(|err| client_error("enabling engineering mode failed", err))?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        let _ = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst));
    }

    let mut printed = 0usize;
    while !stop.load(Ordering::SeqCst) {
        match client.next_report_timeout(POLL_INTERVAL) {
            Ok(report) => {
                print_report(&report, format);
                printed += 1;
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            // No report within the poll window; check the stop flag again.
            Err(ClientError::Timeout(_)) => continue,
            Err(err) => return Err(client_error("report stream failed", err)),
        }
    }

    if args.engineering && client.connected() {
        let _ = client.configure(|session| session.set_engineering_mode(false));
    }
    Ok(SUCCESS)
}

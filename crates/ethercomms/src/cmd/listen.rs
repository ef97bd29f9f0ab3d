use crossbeam_channel::select;
use ethercomms_client::ClientConfig;
use tracing::{info, warn};

use crate::cmd::{interrupts, start_client, stop_client, ListenArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let config = ClientConfig {
        ether_type: args.ether_type,
        read_timeout: args.read_timeout,
        ..ClientConfig::default()
    };
    let mut client = start_client(&args.interface, config)?;
    client.terminate_sender();
    let interrupts = interrupts()?;

    let mut printed = 0usize;
    loop {
        select! {
            recv(client.receiver()) -> msg => {
                let Ok(frame) = msg else { break };
                print_frame(&frame, &args.interface, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            recv(client.errors()) -> msg => {
                if let Ok(err) = msg {
                    warn!(error = %err, "receiver reported a failure");
                }
            }
            recv(interrupts) -> _ => {
                info!("interrupted");
                break;
            }
        }
    }

    stop_client(&mut client)?;
    Ok(SUCCESS)
}

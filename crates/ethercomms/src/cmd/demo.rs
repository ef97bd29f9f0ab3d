use bytes::Bytes;
use crossbeam_channel::select;
use ethercomms_client::ClientConfig;
use ethercomms_frame::Frame;
use ethercomms_transport::MacAddr;
use tracing::{info, warn};

use crate::cmd::{interrupts, start_client, stop_client, DemoArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

/// EtherType of the broadcast test frame.
pub const DEMO_ETHER_TYPE: u16 = 0xCCCC;

pub const DEMO_PAYLOAD: &[u8] = b"this is a test";

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let config = ClientConfig {
        ether_type: args.ether_type,
        ..ClientConfig::default()
    };
    let mut client = start_client(&args.interface, config)?;
    let source = client.interface().hardware;
    let ticker = crossbeam_channel::tick(args.interval);
    let interrupts = interrupts()?;

    loop {
        select! {
            recv(client.receiver()) -> msg => {
                let Ok(frame) = msg else { break };
                print_frame(&frame, &args.interface, format);
            }
            recv(ticker) -> _ => {
                info!(interface = %args.interface, "sending test frame");
                if client.sender().send(test_frame(source)).is_err() {
                    break;
                }
            }
            recv(client.errors()) -> msg => {
                if let Ok(err) = msg {
                    warn!(error = %err, "worker reported a failure");
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

fn test_frame(source: MacAddr) -> Frame {
    Frame::new(
        MacAddr::broadcast(),
        source,
        DEMO_ETHER_TYPE,
        Bytes::from_static(DEMO_PAYLOAD),
    )
}

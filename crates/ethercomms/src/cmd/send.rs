use std::fs;
use std::time::{Duration, Instant};

use ethercomms_client::{ClientConfig, StatsSnapshot};
use ethercomms_frame::{Frame, VlanTag};
use tracing::info;

use crate::cmd::{start_client, stop_client, SendArgs};
use crate::exit::{frame_error, io_error, worker_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let vlan = args
        .vlan
        .map(|id| VlanTag::new(args.priority, false, id))
        .transpose()
        .map_err(|err| frame_error("invalid VLAN tag", err))?;

    let config = ClientConfig {
        ether_type: args.ether_type,
        ..ClientConfig::default()
    };
    let mut client = start_client(&args.interface, config)?;
    client.terminate_receiver();

    let source = args.source.unwrap_or(client.interface().hardware);
    let mut frame = Frame::new(args.destination, source, args.ether_type, payload);
    if let Some(tag) = vlan {
        frame = frame.with_vlan(tag);
    }

    for i in 0..args.count {
        if i > 0 {
            if let Some(interval) = args.interval {
                std::thread::sleep(interval);
            }
        }
        if client.sender().send(frame.clone()).is_err() {
            break;
        }
    }

    let drained = wait_until_processed(args.count as u64, args.drain_timeout, || client.stats());
    let failure = client.errors().try_iter().next();
    let stats = stop_client(&mut client)?;

    if let Some(err) = failure {
        return Err(worker_error("send failed", err));
    }
    if !drained {
        return Err(CliError::new(
            FAILURE,
            format!(
                "sent {} of {} frames before the drain timeout",
                stats.frames_sent, args.count
            ),
        ));
    }

    info!(
        interface = %args.interface,
        destination = %args.destination,
        count = stats.frames_sent,
        "frames sent"
    );
    print_stats(&stats, format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

/// Poll the counters until every queued frame was either written or failed.
fn wait_until_processed(
    expected: u64,
    timeout: Duration,
    mut stats: impl FnMut() -> StatsSnapshot,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let snapshot = stats();
        if snapshot.frames_sent + snapshot.write_errors + snapshot.encode_errors >= expected {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use crossbeam_channel::Receiver;
use ethercomms_client::{Client, ClientConfig, PacketClient, StatsSnapshot};
use ethercomms_transport::MacAddr;
use tracing::{debug, info};

use crate::exit::{client_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod demo;
pub mod interfaces;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print frames received on an interface.
    Listen(ListenArgs),
    /// Send frames out of an interface.
    Send(SendArgs),
    /// Broadcast a test frame periodically and print whatever arrives.
    Demo(DemoArgs),
    /// List network interfaces.
    Interfaces(InterfacesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Interfaces(args) => interfaces::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Interface to bind (e.g. eth0, lo).
    pub interface: String,
    /// EtherType to receive (hex with 0x prefix or decimal). 0x0003 receives everything.
    #[arg(long, default_value = "0x080d", value_parser = parse_ether_type)]
    pub ether_type: u16,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Socket read deadline (e.g. 1s, 250ms).
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    pub read_timeout: Duration,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Interface to send from.
    pub interface: String,
    /// Destination hardware address.
    #[arg(long, short = 'd', default_value = "ff:ff:ff:ff:ff:ff")]
    pub destination: MacAddr,
    /// Source hardware address. Defaults to the interface address.
    #[arg(long, short = 's')]
    pub source: Option<MacAddr>,
    /// EtherType of the sent frames.
    #[arg(long, default_value = "0x080d", value_parser = parse_ether_type)]
    pub ether_type: u16,
    /// Add an 802.1Q tag with this VLAN ID.
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=4094))]
    pub vlan: Option<u16>,
    /// Priority code point for --vlan.
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=7))]
    pub priority: u8,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Number of frames to send.
    #[arg(long, default_value = "1")]
    pub count: usize,
    /// Delay between frames (e.g. 1s, 100ms).
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,
    /// How long to wait for queued frames to be written.
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub drain_timeout: Duration,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Interface to bind.
    #[arg(default_value = "lo")]
    pub interface: String,
    /// Delay between broadcast test frames.
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub interval: Duration,
    /// EtherType the socket receives.
    #[arg(long, default_value = "0x080d", value_parser = parse_ether_type)]
    pub ether_type: u16,
}

#[derive(Args, Debug, Default)]
pub struct InterfacesArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn start_client(interface: &str, config: ClientConfig) -> CliResult<PacketClient> {
    let client = Client::initialize_with_config(interface, config)
        .map_err(|err| client_error(&format!("failed to open {interface}"), err))?;
    debug!(
        interface = %client.interface().name,
        ether_type = format_args!("{:#06x}", client.socket().ether_type()),
        read_timeout_ms = client.config().read_timeout.as_millis() as u64,
        queue_capacity = ?client.config().queue_capacity,
        "client ready"
    );
    Ok(client)
}

/// Stop both workers and log the final counters.
pub(crate) fn stop_client(client: &mut PacketClient) -> CliResult<StatsSnapshot> {
    client
        .shutdown()
        .map_err(|err| client_error("shutdown failed", err))?;
    let stats = client.stats();
    info!(
        interface = %client.interface().name,
        received = stats.frames_received,
        sent = stats.frames_sent,
        decode_errors = stats.decode_errors,
        write_errors = stats.write_errors,
        "client stopped"
    );
    Ok(stats)
}

/// Channel that yields once per Ctrl-C.
pub(crate) fn interrupts() -> CliResult<Receiver<()>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(rx)
}

pub(crate) fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

pub(crate) fn parse_ether_type(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid EtherType: {input}"))
}

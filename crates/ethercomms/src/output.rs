use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ethercomms_client::StatsSnapshot;
use ethercomms_frame::{ether_type_name, Frame, VlanTag};
use ethercomms_transport::Interface;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct VlanOutput {
    id: u16,
    priority: u8,
    drop_eligible: bool,
}

impl From<&VlanTag> for VlanOutput {
    fn from(tag: &VlanTag) -> Self {
        Self {
            id: tag.id(),
            priority: tag.priority(),
            drop_eligible: tag.drop_eligible(),
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    destination: String,
    source: String,
    ether_type: String,
    ether_type_name: &'static str,
    service_vlan: Option<VlanOutput>,
    vlan: Option<VlanOutput>,
    payload_size: usize,
    payload: String,
    interface: String,
    outgoing: bool,
    timestamp: String,
}

impl FrameOutput {
    fn new(frame: &Frame, interface: &str) -> Self {
        Self {
            destination: frame.destination.to_string(),
            source: frame.source.to_string(),
            ether_type: format!("{:#06x}", frame.ether_type),
            ether_type_name: ether_type_name(frame.ether_type),
            service_vlan: frame.service_vlan.as_ref().map(VlanOutput::from),
            vlan: frame.vlan.as_ref().map(VlanOutput::from),
            payload_size: frame.payload.len(),
            payload: payload_preview(frame.payload.as_ref()),
            interface: interface.to_string(),
            outgoing: frame.peer.is_some_and(|peer| peer.is_outgoing()),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_frame(frame: &Frame, interface: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::new(frame, interface);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = FrameOutput::new(frame, interface);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SOURCE", "DESTINATION", "TYPE", "VLAN", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    out.source,
                    out.destination,
                    format!("{} ({})", out.ether_type, out.ether_type_name),
                    vlan_label(frame),
                    out.payload_size.to_string(),
                    out.payload,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} -> {} type={:#06x} ({}) vlan={} size={} payload={}",
                frame.source,
                frame.destination,
                frame.ether_type,
                ether_type_name(frame.ether_type),
                vlan_label(frame),
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

#[derive(Serialize)]
struct InterfaceOutput<'a> {
    name: &'a str,
    index: u32,
    mtu: usize,
    hardware: String,
}

pub fn print_interfaces(interfaces: &[Interface], format: OutputFormat) {
    let rows: Vec<_> = interfaces
        .iter()
        .map(|iface| InterfaceOutput {
            name: &iface.name,
            index: iface.index,
            mtu: iface.mtu,
            hardware: iface.hardware.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "NAME", "MTU", "HARDWARE"]);
            for row in rows {
                table.add_row(vec![
                    row.index.to_string(),
                    row.name.to_string(),
                    row.mtu.to_string(),
                    row.hardware,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in rows {
                println!(
                    "{}: {} mtu={} hw={}",
                    row.index, row.name, row.mtu, row.hardware
                );
            }
        }
    }
}

pub fn print_stats(stats: &StatsSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["SENT", "BYTES", "WRITE ERRORS", "ENCODE ERRORS"])
                .add_row(vec![
                    stats.frames_sent.to_string(),
                    stats.bytes_sent.to_string(),
                    stats.write_errors.to_string(),
                    stats.encode_errors.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sent={} bytes={} write_errors={} encode_errors={}",
                stats.frames_sent, stats.bytes_sent, stats.write_errors, stats.encode_errors
            );
        }
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn vlan_label(frame: &Frame) -> String {
    match (&frame.service_vlan, &frame.vlan) {
        (None, None) => "-".to_string(),
        (None, Some(c)) => c.id().to_string(),
        (Some(s), None) => format!("{}.-", s.id()),
        (Some(s), Some(c)) => format!("{}.{}", s.id(), c.id()),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

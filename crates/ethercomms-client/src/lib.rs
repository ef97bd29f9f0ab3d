//! Channel-oriented access to raw Ethernet frames.
//!
//! A [`Client`] binds a packet socket to one interface and runs two workers:
//! a receiver that decodes frames off the wire into [`Client::receiver`], and
//! a sender that encodes frames taken from [`Client::sender`] onto the wire.
//! Each worker stops when its termination signal is raised. Worker failures
//! never end the process; they are reported on [`Client::errors`].

pub mod client;
pub mod config;
pub mod error;
pub mod signal;
pub mod stats;

mod backoff;
mod receiver;
mod sender;

#[cfg(test)]
mod test_support;

pub use client::Client;
#[cfg(target_os = "linux")]
pub use client::PacketClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result, WorkerError};
pub use signal::{Termination, TerminationSignal};
pub use stats::{Stats, StatsSnapshot};

pub use ethercomms_frame::{Frame, VlanTag};
pub use ethercomms_transport::{Interface, LinkSocket, MacAddr, PeerAddr};

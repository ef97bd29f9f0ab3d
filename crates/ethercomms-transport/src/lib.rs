//! Raw link-layer transport for ethercomms.
//!
//! Provides the pieces needed to move whole Ethernet frames on one interface:
//! - Interface resolution (name, index, MTU, hardware address)
//! - Hardware and peer addressing ([`MacAddr`], [`PeerAddr`])
//! - The [`LinkSocket`] contract and its Linux `AF_PACKET` implementation
//!
//! This is the lowest layer of ethercomms. Everything else builds on top of
//! the [`LinkSocket`] trait provided here.

pub mod addr;
pub mod error;
pub mod interface;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod packet;

pub use addr::{MacAddr, PeerAddr};
pub use error::{Result, TransportError};
pub use interface::Interface;
pub use traits::LinkSocket;

#[cfg(target_os = "linux")]
pub use packet::PacketSocket;

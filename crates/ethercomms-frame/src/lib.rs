//! Ethernet frame model and wire codec.
//!
//! Frames are plain values: addresses, EtherType, up to two VLAN tags and a
//! payload. The codec handles the Ethernet II header with optional tags:
//! - an 802.1ad service tag (TPID 0x88A8, or the legacy 0x9100)
//! - an 802.1Q customer tag (TPID 0x8100)
//!
//! [`FrameReader`] and [`FrameWriter`] pair the codec with a
//! [`LinkSocket`](ethercomms_transport::LinkSocket) so callers deal in whole
//! frames, never in byte buffers.

pub mod codec;
pub mod error;
pub mod ethertype;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, VlanTag, DEFAULT_MTU, HEADER_SIZE,
    MAX_HEADER_SIZE, VLAN_TAG_SIZE,
};
pub use error::{FrameError, Result};
pub use ethertype::{ether_type_name, ARP, ETHERCOMMS, IPV4, IPV6, LEGACY_QINQ, QINQ, VLAN};
pub use reader::FrameReader;
pub use writer::FrameWriter;

pub use ethercomms_transport::{MacAddr, PeerAddr};

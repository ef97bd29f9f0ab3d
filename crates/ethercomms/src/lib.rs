//! Raw Ethernet frames as channels.
//!
//! ethercomms binds a raw packet socket to one network interface and exposes
//! it as a pair of queues: decoded inbound frames on one side, frames to
//! transmit on the other.
//!
//! # Crate Structure
//!
//! - [`transport`]: Interface lookup, hardware addresses and the raw link socket
//! - [`frame`]: Ethernet frame model and codec with 802.1Q / 802.1ad tags
//! - [`client`]: Receiver and sender workers behind channels (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use ethercomms_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ethercomms_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use ethercomms_client::*;
}

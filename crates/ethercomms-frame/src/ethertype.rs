//! Well-known EtherType values.
//!
//! Values below 0x0600 are 802.3 length fields, not EtherTypes.

/// IPv4.
pub const IPV4: u16 = 0x0800;

/// ARP.
pub const ARP: u16 = 0x0806;

/// Framing discriminator used by ethercomms sockets.
pub const ETHERCOMMS: u16 = 0x080D;

/// 802.1Q customer VLAN tag.
pub const VLAN: u16 = 0x8100;

/// IPv6.
pub const IPV6: u16 = 0x86DD;

/// 802.1ad service VLAN tag.
pub const QINQ: u16 = 0x88A8;

/// Pre-standard double tagging TPID still emitted by some switches.
pub const LEGACY_QINQ: u16 = 0x9100;

/// Smallest value interpreted as an EtherType.
pub const MIN_ETHER_TYPE: u16 = 0x0600;

/// Returns a human-readable name for an EtherType.
pub fn ether_type_name(ether_type: u16) -> &'static str {
    match ether_type {
        IPV4 => "IPv4",
        ARP => "ARP",
        ETHERCOMMS => "ETHERCOMMS",
        VLAN => "802.1Q",
        IPV6 => "IPv6",
        QINQ => "802.1ad",
        LEGACY_QINQ => "QinQ",
        0..MIN_ETHER_TYPE => "LENGTH",
        _ => "OTHER",
    }
}

/// Returns true if the value introduces a service (outer) VLAN tag.
pub fn is_service_tpid(ether_type: u16) -> bool {
    matches!(ether_type, QINQ | LEGACY_QINQ)
}

/// Returns true if the value is an 802.3 length rather than an EtherType.
pub fn is_length(ether_type: u16) -> bool {
    ether_type < MIN_ETHER_TYPE
}

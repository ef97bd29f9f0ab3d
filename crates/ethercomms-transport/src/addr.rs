use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Length of an Ethernet hardware address.
pub const MAC_ADDR_LEN: usize = 6;

/// `sll_pkttype` value for frames sent by this host (`PACKET_OUTGOING`).
pub const PACKET_OUTGOING: u8 = 4;

/// A 48-bit Ethernet hardware address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(eui48::MacAddress);

impl MacAddr {
    pub const fn new(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self(eui48::MacAddress::new(octets))
    }

    /// `ff:ff:ff:ff:ff:ff`
    pub fn broadcast() -> Self {
        Self(eui48::MacAddress::broadcast())
    }

    /// `00:00:00:00:00:00`
    pub fn nil() -> Self {
        Self(eui48::MacAddress::nil())
    }

    /// Build an address from the first six bytes of `bytes`.
    ///
    /// Returns `None` if fewer than six bytes are available.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; MAC_ADDR_LEN] = bytes.get(..MAC_ADDR_LEN)?.try_into().ok()?;
        Some(Self::new(octets))
    }

    pub fn octets(&self) -> [u8; MAC_ADDR_LEN] {
        self.0.to_array()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_broadcast(&self) -> bool {
        self.0.is_broadcast()
    }

    pub fn is_multicast(&self) -> bool {
        self.0.is_multicast()
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for MacAddr {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<[u8; MAC_ADDR_LEN]> for MacAddr {
    fn from(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self::new(octets)
    }
}

impl FromStr for MacAddr {
    type Err = TransportError;

    /// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff` and `aabb.ccdd.eeff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        eui48::MacAddress::parse_str(s.trim())
            .map(Self)
            .map_err(|_| TransportError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.octets();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

/// Link-level address of the sender of a received frame.
///
/// Mirrors the fields the kernel reports in `sockaddr_ll` on receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr {
    /// Index of the interface the frame arrived on.
    pub interface_index: u32,
    /// Hardware address of the sender.
    pub hardware: MacAddr,
    /// Link-layer protocol (EtherType) in host byte order.
    pub protocol: u16,
    /// Kernel packet classification (`PACKET_HOST`, `PACKET_BROADCAST`, ...).
    pub packet_type: u8,
}

impl PeerAddr {
    /// Whether the kernel looped back a frame this host transmitted.
    pub fn is_outgoing(&self) -> bool {
        self.packet_type == PACKET_OUTGOING
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}", self.hardware, self.interface_index)
    }
}

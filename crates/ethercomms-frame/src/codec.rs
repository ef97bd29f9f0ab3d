use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ethercomms_transport::{MacAddr, PeerAddr};

use crate::error::{FrameError, Result};
use crate::ethertype::{self, QINQ, VLAN};

/// Untagged header: destination (6) + source (6) + EtherType (2) = 14 bytes.
pub const HEADER_SIZE: usize = 14;

/// One VLAN tag on the wire: TPID (2) + TCI (2).
pub const VLAN_TAG_SIZE: usize = 4;

/// Header with both a service and a customer tag.
pub const MAX_HEADER_SIZE: usize = HEADER_SIZE + 2 * VLAN_TAG_SIZE;

/// Default MTU when the interface does not report one: 1500 bytes.
pub const DEFAULT_MTU: usize = 1500;

const PRIORITY_SHIFT: u16 = 13;
const DEI_MASK: u16 = 0x1000;
const VLAN_ID_MASK: u16 = 0x0FFF;

/// An 802.1Q / 802.1ad VLAN tag.
///
/// Tag Control Information layout:
/// ```text
/// ┌──────────────┬─────────┬────────────────┐
/// │ PCP (3 bits) │ DEI (1) │ VID (12 bits)  │
/// └──────────────┴─────────┴────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VlanTag {
    priority: u8,
    drop_eligible: bool,
    id: u16,
}

impl VlanTag {
    /// Highest priority code point.
    pub const MAX_PRIORITY: u8 = 7;
    /// Highest usable VLAN ID; 4095 is reserved.
    pub const MAX_ID: u16 = 4094;

    /// Create a tag, rejecting out-of-range priority or ID.
    pub fn new(priority: u8, drop_eligible: bool, id: u16) -> Result<Self> {
        if priority > Self::MAX_PRIORITY || id > Self::MAX_ID {
            return Err(FrameError::InvalidVlan { priority, id });
        }
        Ok(Self {
            priority,
            drop_eligible,
            id,
        })
    }

    /// Decode a tag from its 16-bit Tag Control Information.
    pub fn from_tci(tci: u16) -> Result<Self> {
        Self::new(
            (tci >> PRIORITY_SHIFT) as u8,
            tci & DEI_MASK != 0,
            tci & VLAN_ID_MASK,
        )
    }

    /// Encode this tag as Tag Control Information.
    pub fn tci(&self) -> u16 {
        (u16::from(self.priority) << PRIORITY_SHIFT)
            | if self.drop_eligible { DEI_MASK } else { 0 }
            | self.id
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn drop_eligible(&self) -> bool {
        self.drop_eligible
    }

    pub fn id(&self) -> u16 {
        self.id
    }
}

/// A link-layer frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Destination hardware address.
    pub destination: MacAddr,
    /// Source hardware address.
    pub source: MacAddr,
    /// Sender as reported by the socket. Only set on received frames.
    pub peer: Option<PeerAddr>,
    /// Payload protocol.
    pub ether_type: u16,
    /// Outer 802.1ad tag, if the frame carried one.
    pub service_vlan: Option<VlanTag>,
    /// 802.1Q tag, if the frame carried one.
    pub vlan: Option<VlanTag>,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create an untagged frame.
    pub fn new(
        destination: MacAddr,
        source: MacAddr,
        ether_type: u16,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            destination,
            source,
            peer: None,
            ether_type,
            service_vlan: None,
            vlan: None,
            payload: payload.into(),
        }
    }

    /// Attach an 802.1Q tag.
    pub fn with_vlan(mut self, tag: VlanTag) -> Self {
        self.vlan = Some(tag);
        self
    }

    /// Attach an outer 802.1ad tag.
    pub fn with_service_vlan(mut self, tag: VlanTag) -> Self {
        self.service_vlan = Some(tag);
        self
    }

    /// Header size of this frame including its tags.
    pub fn header_size(&self) -> usize {
        let tags = usize::from(self.service_vlan.is_some()) + usize::from(self.vlan.is_some());
        HEADER_SIZE + tags * VLAN_TAG_SIZE
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        self.header_size() + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────────────────┬─────────────────┬───────────┬─────────┐
/// │ Dst (6B) │ Src (6B) │ 0x88A8 TCI (4B) │ 0x8100 TCI (4B) │ Type (2B) │ Payload │
/// │          │          │ optional        │ optional        │ BE        │         │
/// └──────────┴──────────┴─────────────────┴─────────────────┴───────────┴─────────┘
/// ```
///
/// Short frames are not padded; the kernel or NIC pads to the 60-byte minimum.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    if ethertype::is_length(frame.ether_type) {
        return Err(FrameError::UnsupportedLength(frame.ether_type));
    }
    dst.reserve(frame.wire_size());
    dst.put_slice(frame.destination.as_bytes());
    dst.put_slice(frame.source.as_bytes());
    if let Some(tag) = frame.service_vlan {
        dst.put_u16(QINQ);
        dst.put_u16(tag.tci());
    }
    if let Some(tag) = frame.vlan {
        dst.put_u16(VLAN);
        dst.put_u16(tag.tci());
    }
    dst.put_u16(frame.ether_type);
    dst.put_slice(&frame.payload);
    Ok(())
}

/// Decode one complete frame.
///
/// Tags are only populated when present on the wire. A lone service tag with
/// no inner 802.1Q tag is reported as `service_vlan`. `peer` is left unset.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            needed: HEADER_SIZE,
            actual: src.len(),
        });
    }

    let mut buf = src;
    let destination = read_mac(&mut buf);
    let source = read_mac(&mut buf);
    let mut ether_type = buf.get_u16();

    let mut service_vlan = None;
    if ethertype::is_service_tpid(ether_type) {
        let (tag, next) = read_tag(&mut buf, src.len())?;
        service_vlan = Some(tag);
        ether_type = next;
    }

    let mut vlan = None;
    if ether_type == VLAN {
        let (tag, next) = read_tag(&mut buf, src.len())?;
        vlan = Some(tag);
        ether_type = next;
    }

    if ethertype::is_length(ether_type) {
        return Err(FrameError::UnsupportedLength(ether_type));
    }

    Ok(Frame {
        destination,
        source,
        peer: None,
        ether_type,
        service_vlan,
        vlan,
        payload: Bytes::copy_from_slice(buf),
    })
}

fn read_mac(buf: &mut &[u8]) -> MacAddr {
    let mut octets = [0u8; 6];
    buf.copy_to_slice(&mut octets);
    MacAddr::new(octets)
}

/// Read a TCI and the type field that follows it.
fn read_tag(buf: &mut &[u8], total: usize) -> Result<(VlanTag, u16)> {
    if buf.remaining() < VLAN_TAG_SIZE {
        return Err(FrameError::Truncated {
            needed: total - buf.remaining() + VLAN_TAG_SIZE,
            actual: total,
        });
    }
    let tag = VlanTag::from_tci(buf.get_u16())?;
    Ok((tag, buf.get_u16()))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest payload accepted for transmission. Default: 1500.
    pub mtu: usize,
    /// Deadline for a single socket read. Default: 1 second.
    pub read_timeout: Duration,
}

impl FrameConfig {
    /// Receive buffer size that fits any frame allowed by `mtu`.
    pub fn buffer_size(&self) -> usize {
        MAX_HEADER_SIZE + self.mtu
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            read_timeout: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: MacAddr = MacAddr::new([0xAA; 6]);
    const DST: MacAddr = MacAddr::new([0xFF; 6]);

    #[test]
    fn test_encode_decode_roundtrip() {
        let frame = Frame::new(DST, SRC, 0xCCCC, Bytes::from_static(b"test"));
        let mut buf = BytesMut::new();

        encode_frame(&frame, &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 4);

        let decoded = decode_frame(&buf).unwrap();
        assert_eq!(decoded.source, SRC);
        assert_eq!(decoded.destination, DST);
        assert_eq!(decoded.ether_type, 0xCCCC);
        assert_eq!(decoded.payload.as_ref(), b"test");
        assert_eq!(decoded.vlan, None);
        assert_eq!(decoded.service_vlan, None);
    }

    #[test]
    fn test_wire_layout_untagged() {
        let frame = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"x"));
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();

        assert_eq!(&buf[0..6], &[0xFF; 6]);
        assert_eq!(&buf[6..12], &[0xAA; 6]);
        assert_eq!(&buf[12..14], &[0x08, 0x0D]);
        assert_eq!(&buf[14..], b"x");
    }

    #[test]
    fn test_single_tag_roundtrip() {
        let tag = VlanTag::new(5, true, 100).unwrap();
        let frame = Frame::new(DST, SRC, 0x0800, Bytes::from_static(b"ip")).with_vlan(tag);
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + VLAN_TAG_SIZE + 2);
        assert_eq!(&buf[12..14], &[0x81, 0x00]);
        assert_eq!(u16::from_be_bytes([buf[14], buf[15]]), 0xB064);

        let decoded = decode_frame(&buf).unwrap();
        assert_eq!(decoded.vlan, Some(tag));
        assert_eq!(decoded.service_vlan, None);
        assert_eq!(decoded.ether_type, 0x0800);
        assert_eq!(decoded.payload.as_ref(), b"ip");
    }

    #[test]
    fn test_double_tag_roundtrip() {
        let outer = VlanTag::new(3, false, 200).unwrap();
        let inner = VlanTag::new(0, false, 4094).unwrap();
        let frame = Frame::new(DST, SRC, 0x86DD, Bytes::from_static(b"v6"))
            .with_service_vlan(outer)
            .with_vlan(inner);
        assert_eq!(frame.header_size(), MAX_HEADER_SIZE);

        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();
        assert_eq!(&buf[12..14], &[0x88, 0xA8]);
        assert_eq!(&buf[16..18], &[0x81, 0x00]);

        let decoded = decode_frame(&buf).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_legacy_qinq_tpid() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&[0xFF; 6]);
        wire.extend_from_slice(&[0xAA; 6]);
        wire.extend_from_slice(&[0x91, 0x00, 0x00, 0x0A]);
        wire.extend_from_slice(&[0x81, 0x00, 0x00, 0x14]);
        wire.extend_from_slice(&[0x08, 0x06]);

        let decoded = decode_frame(&wire).unwrap();
        assert_eq!(decoded.service_vlan.map(|t| t.id()), Some(10));
        assert_eq!(decoded.vlan.map(|t| t.id()), Some(20));
        assert_eq!(decoded.ether_type, 0x0806);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_lone_service_tag() {
        let outer = VlanTag::new(1, false, 7).unwrap();
        let frame = Frame::new(DST, SRC, 0x0800, Bytes::new()).with_service_vlan(outer);
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();

        let decoded = decode_frame(&buf).unwrap();
        assert_eq!(decoded.service_vlan, Some(outer));
        assert_eq!(decoded.vlan, None);
    }

    #[test]
    fn test_decode_truncated_header() {
        let result = decode_frame(&[0u8; 13]);
        assert!(matches!(
            result,
            Err(FrameError::Truncated {
                needed: 14,
                actual: 13
            })
        ));
    }

    #[test]
    fn test_decode_truncated_tag() {
        let mut wire = vec![0u8; 12];
        wire.extend_from_slice(&[0x81, 0x00, 0x00]);
        let result = decode_frame(&wire);
        assert!(matches!(result, Err(FrameError::Truncated { .. })));
    }

    #[test]
    fn test_decode_length_field_rejected() {
        let mut wire = vec![0u8; 12];
        wire.extend_from_slice(&[0x00, 0x2E]);
        let result = decode_frame(&wire);
        assert!(matches!(result, Err(FrameError::UnsupportedLength(0x002E))));
    }

    #[test]
    fn test_decode_reserved_vlan_id() {
        let mut wire = vec![0u8; 12];
        wire.extend_from_slice(&[0x81, 0x00, 0x0F, 0xFF, 0x08, 0x00]);
        let result = decode_frame(&wire);
        assert!(matches!(result, Err(FrameError::InvalidVlan { id: 4095, .. })));
    }

    #[test]
    fn test_encode_length_field_rejected() {
        let frame = Frame::new(DST, SRC, 0x0040, Bytes::new());
        let mut buf = BytesMut::new();
        let result = encode_frame(&frame, &mut buf);
        assert!(matches!(result, Err(FrameError::UnsupportedLength(0x0040))));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_vlan_tag_validation() {
        assert!(VlanTag::new(8, false, 1).is_err());
        assert!(VlanTag::new(0, false, 4095).is_err());
        let tag = VlanTag::new(7, true, 0).unwrap();
        assert_eq!(tag.tci(), 0xF000);
        assert_eq!(VlanTag::from_tci(0xF000).unwrap(), tag);
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);
    }

    #[test]
    fn test_buffer_size_covers_tagged_mtu_frame() {
        let config = FrameConfig::default();
        assert_eq!(config.buffer_size(), 1500 + MAX_HEADER_SIZE);
    }
}

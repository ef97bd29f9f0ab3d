/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer ended before the header did.
    #[error("truncated frame ({actual} bytes, need at least {needed})")]
    Truncated { needed: usize, actual: usize },

    /// The type field is an 802.3 length, not an EtherType.
    #[error("unsupported 802.3 length field {0:#06x} (expected EtherType >= 0x0600)")]
    UnsupportedLength(u16),

    /// A VLAN tag has an out-of-range priority or ID.
    #[error("invalid VLAN tag (priority {priority}, id {id})")]
    InvalidVlan { priority: u8, id: u16 },

    /// The payload, plus any VLAN tag after the first, does not fit in the
    /// interface MTU.
    #[error("payload too large ({size} bytes, MTU {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A received frame was longer than the read buffer.
    #[error("oversized frame ({size} bytes, buffer holds {capacity})")]
    Oversized { size: usize, capacity: usize },

    /// The socket accepted fewer bytes than the encoded frame.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// The underlying socket failed.
    #[error("frame transport error: {0}")]
    Transport(#[from] ethercomms_transport::TransportError),
}

impl FrameError {
    /// Whether the error came from the socket rather than from the bytes.
    pub fn is_transport(&self) -> bool {
        matches!(self, FrameError::Transport(_) | FrameError::ShortWrite { .. })
    }

    /// Whether the error is an expired read deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameError::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

use std::sync::Arc;
use std::time::Duration;

use crate::addr::{MacAddr, PeerAddr};
use crate::error::Result;

/// A socket that moves whole link-layer frames on one bound interface.
///
/// Both operations take `&self`: a single socket is read by one thread and
/// written by another at the same time, so implementations must be safe for
/// one concurrent reader plus one concurrent writer.
pub trait LinkSocket: Send + Sync + 'static {
    /// Read one frame into `buf`, waiting at most `deadline`.
    ///
    /// Returns the frame's length on the wire and the sender's address. A
    /// length greater than `buf.len()` means the frame did not fit and only
    /// its first `buf.len()` bytes were copied. An expired
    /// deadline is reported as [`TransportError::Timeout`](crate::TransportError::Timeout).
    fn read_with_deadline(&self, buf: &mut [u8], deadline: Duration) -> Result<(usize, PeerAddr)>;

    /// Write one complete frame addressed to `destination`.
    fn write_to(&self, frame: &[u8], destination: MacAddr) -> Result<usize>;
}

impl<S: LinkSocket + ?Sized> LinkSocket for Arc<S> {
    fn read_with_deadline(&self, buf: &mut [u8], deadline: Duration) -> Result<(usize, PeerAddr)> {
        (**self).read_with_deadline(buf, deadline)
    }

    fn write_to(&self, frame: &[u8], destination: MacAddr) -> Result<usize> {
        (**self).write_to(frame, destination)
    }
}

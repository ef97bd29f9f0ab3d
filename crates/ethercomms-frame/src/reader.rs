use ethercomms_transport::LinkSocket;
use tracing::trace;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Reads complete frames from a [`LinkSocket`].
///
/// Each call performs one socket read bounded by the configured read timeout
/// and decodes exactly the bytes that read returned.
pub struct FrameReader<S> {
    socket: S,
    buf: Vec<u8>,
    config: FrameConfig,
}

impl<S: LinkSocket> FrameReader<S> {
    /// Create a new frame reader with default configuration.
    pub fn new(socket: S) -> Self {
        Self::with_config(socket, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(socket: S, config: FrameConfig) -> Self {
        Self {
            socket,
            buf: vec![0u8; config.buffer_size()],
            config,
        }
    }

    /// Read and decode the next frame.
    ///
    /// An expired deadline surfaces as a transport timeout
    /// (see [`FrameError::is_timeout`](crate::FrameError::is_timeout)).
    /// Socket failures are [`FrameError::Transport`](crate::FrameError::Transport);
    /// every other error means bytes were read but did not decode, and those
    /// bytes are discarded. A frame longer than the buffer is
    /// [`FrameError::Oversized`] and is never decoded from its prefix.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let (read, peer) = self
            .socket
            .read_with_deadline(&mut self.buf, self.config.read_timeout)?;
        trace!(len = read, %peer, "read raw frame");
        if read > self.buf.len() {
            return Err(FrameError::Oversized {
                size: read,
                capacity: self.buf.len(),
            });
        }

        let mut frame = decode_frame(&self.buf[..read])?;
        frame.peer = Some(peer);
        Ok(frame)
    }

    /// Borrow the underlying socket.
    pub fn get_ref(&self) -> &S {
        &self.socket
    }

    /// Consume the reader and return the inner socket.
    pub fn into_inner(self) -> S {
        self.socket
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

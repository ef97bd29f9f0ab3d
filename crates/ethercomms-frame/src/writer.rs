use bytes::BytesMut;
use ethercomms_transport::LinkSocket;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig, HEADER_SIZE, MAX_HEADER_SIZE, VLAN_TAG_SIZE};
use crate::error::{FrameError, Result};

/// Writes complete frames to a [`LinkSocket`].
pub struct FrameWriter<S> {
    socket: S,
    buf: BytesMut,
    config: FrameConfig,
}

impl<S: LinkSocket> FrameWriter<S> {
    /// Create a new frame writer with default configuration.
    pub fn new(socket: S) -> Self {
        Self::with_config(socket, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(socket: S, config: FrameConfig) -> Self {
        Self {
            socket,
            buf: BytesMut::with_capacity(MAX_HEADER_SIZE + config.mtu),
            config,
        }
    }

    /// Encode a frame and write it addressed to `frame.destination`.
    ///
    /// The link allows one VLAN tag on top of the MTU; a second tag counts
    /// against it. Frames over that limit are rejected before anything is
    /// written. Returns the number of bytes the socket accepted.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<usize> {
        let extra_tags = frame
            .header_size()
            .saturating_sub(HEADER_SIZE + VLAN_TAG_SIZE);
        let size = frame.payload.len() + extra_tags;
        if size > self.config.mtu {
            return Err(FrameError::FrameTooLarge {
                size,
                max: self.config.mtu,
            });
        }

        self.buf.clear();
        encode_frame(frame, &mut self.buf)?;

        let written = self.socket.write_to(&self.buf, frame.destination)?;
        if written != self.buf.len() {
            return Err(FrameError::ShortWrite {
                written,
                expected: self.buf.len(),
            });
        }
        trace!(len = written, destination = %frame.destination, "wrote frame");
        Ok(written)
    }

    /// Borrow the underlying socket.
    pub fn get_ref(&self) -> &S {
        &self.socket
    }

    /// Consume the writer and return the inner socket.
    pub fn into_inner(self) -> S {
        self.socket
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use bytes::Bytes;
    use ethercomms_transport::{MacAddr, PeerAddr, TransportError};

    use super::*;
    use crate::codec::{decode_frame, VlanTag};

    #[derive(Default)]
    struct RecordingSocket {
        writes: Mutex<Vec<(Vec<u8>, MacAddr)>>,
        accept: Option<usize>,
        fail: bool,
    }

    impl LinkSocket for RecordingSocket {
        fn read_with_deadline(
            &self,
            _buf: &mut [u8],
            deadline: Duration,
        ) -> ethercomms_transport::Result<(usize, PeerAddr)> {
            Err(TransportError::Timeout(deadline))
        }

        fn write_to(&self, frame: &[u8], destination: MacAddr) -> ethercomms_transport::Result<usize> {
            if self.fail {
                return Err(TransportError::Io(std::io::Error::from(
                    std::io::ErrorKind::BrokenPipe,
                )));
            }
            self.writes
                .lock()
                .unwrap()
                .push((frame.to_vec(), destination));
            Ok(self.accept.unwrap_or(frame.len()))
        }
    }

    const SRC: MacAddr = MacAddr::new([0xAA; 6]);
    const DST: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(RecordingSocket::default());
        let frame = Frame::new(DST, SRC, 0xCCCC, Bytes::from_static(b"test"));

        let written = writer.write_frame(&frame).unwrap();
        assert_eq!(written, frame.wire_size());

        let socket = writer.into_inner();
        let writes = socket.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let decoded = decode_frame(&writes[0].0).unwrap();
        assert_eq!(decoded.payload.as_ref(), b"test");
        assert_eq!(decoded.ether_type, 0xCCCC);
    }

    #[test]
    fn addressed_to_destination() {
        let mut writer = FrameWriter::new(RecordingSocket::default());
        writer
            .write_frame(&Frame::new(DST, SRC, 0x080D, Bytes::new()))
            .unwrap();

        let writes = writer.get_ref().writes.lock().unwrap();
        assert_eq!(writes[0].1, DST);
    }

    #[test]
    fn payload_over_mtu_rejected() {
        let cfg = FrameConfig {
            mtu: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(RecordingSocket::default(), cfg);
        let frame = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"oversized"));

        let err = writer.write_frame(&frame).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 9, max: 4 }));
        assert!(writer.get_ref().writes.lock().unwrap().is_empty());
    }

    #[test]
    fn payload_at_mtu_with_one_tag_accepted() {
        let cfg = FrameConfig {
            mtu: 8,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(RecordingSocket::default(), cfg);
        let frame = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"12345678"))
            .with_vlan(VlanTag::new(0, false, 5).unwrap());

        assert_eq!(writer.write_frame(&frame).unwrap(), 18 + 8);
    }

    #[test]
    fn second_tag_counts_against_mtu() {
        let cfg = FrameConfig {
            mtu: 8,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(RecordingSocket::default(), cfg);
        let tag = VlanTag::new(0, false, 5).unwrap();
        let full = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"12345678"))
            .with_service_vlan(tag)
            .with_vlan(tag);

        let err = writer.write_frame(&full).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 12, max: 8 }));
        assert!(!err.is_transport());
        assert!(writer.get_ref().writes.lock().unwrap().is_empty());

        let fits = Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"1234"))
            .with_service_vlan(tag)
            .with_vlan(tag);
        assert_eq!(writer.write_frame(&fits).unwrap(), 22 + 4);
    }

    #[test]
    fn encode_failure_writes_nothing() {
        let mut writer = FrameWriter::new(RecordingSocket::default());
        let frame = Frame::new(DST, SRC, 0x0010, Bytes::new());

        let err = writer.write_frame(&frame).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedLength(0x0010)));
        assert!(!err.is_transport());
        assert!(writer.get_ref().writes.lock().unwrap().is_empty());
    }

    #[test]
    fn socket_failure_is_transport() {
        let socket = RecordingSocket {
            fail: true,
            ..RecordingSocket::default()
        };
        let mut writer = FrameWriter::new(socket);
        let err = writer
            .write_frame(&Frame::new(DST, SRC, 0x080D, Bytes::new()))
            .unwrap_err();
        assert!(matches!(err, FrameError::Transport(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn short_write_reported() {
        let socket = RecordingSocket {
            accept: Some(3),
            ..RecordingSocket::default()
        };
        let mut writer = FrameWriter::new(socket);
        let err = writer
            .write_frame(&Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"abc")))
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::ShortWrite {
                written: 3,
                expected: 17
            }
        ));
        assert!(err.is_transport());
    }

    #[test]
    fn buffer_is_reset_between_frames() {
        let mut writer = FrameWriter::new(RecordingSocket::default());
        writer
            .write_frame(&Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"first")))
            .unwrap();
        writer
            .write_frame(&Frame::new(DST, SRC, 0x080D, Bytes::from_static(b"2")))
            .unwrap();

        let writes = writer.get_ref().writes.lock().unwrap();
        assert_eq!(writes[1].0.len(), 15);
        assert_eq!(decode_frame(&writes[1].0).unwrap().payload.as_ref(), b"2");
    }
}

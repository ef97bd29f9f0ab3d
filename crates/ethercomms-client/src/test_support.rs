//! In-memory link socket for worker and client tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ethercomms_frame::{encode_frame, Frame};
use ethercomms_transport::{Interface, LinkSocket, MacAddr, PeerAddr, TransportError};

pub(crate) const LOCAL: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);
pub(crate) const REMOTE: MacAddr = MacAddr::new([0xAA; 6]);
const BROADCAST: MacAddr = MacAddr::new([0xFF; 6]);

pub(crate) enum MockRead {
    Data(Vec<u8>),
    Fail(std::io::ErrorKind),
    /// A frame of this many bytes, larger than the read buffer.
    Oversized(usize),
}

pub(crate) struct MockSocket {
    reads: Receiver<MockRead>,
    writes: Sender<(Vec<u8>, MacAddr)>,
    read_calls: Arc<AtomicUsize>,
    write_failures: AtomicUsize,
    gate: Option<Receiver<()>>,
}

/// Test-side handles for a [`MockSocket`].
pub(crate) struct MockHandle {
    pub(crate) reads: Sender<MockRead>,
    pub(crate) writes: Receiver<(Vec<u8>, MacAddr)>,
    pub(crate) read_calls: Arc<AtomicUsize>,
}

pub(crate) fn mock_socket() -> (MockSocket, MockHandle) {
    let (reads_tx, reads_rx) = crossbeam_channel::unbounded();
    let (writes_tx, writes_rx) = crossbeam_channel::unbounded();
    let read_calls = Arc::new(AtomicUsize::new(0));
    let socket = MockSocket {
        reads: reads_rx,
        writes: writes_tx,
        read_calls: Arc::clone(&read_calls),
        write_failures: AtomicUsize::new(0),
        gate: None,
    };
    let handle = MockHandle {
        reads: reads_tx,
        writes: writes_rx,
        read_calls,
    };
    (socket, handle)
}

impl MockSocket {
    /// Fail the next `count` writes.
    pub(crate) fn failing_writes(self, count: usize) -> Self {
        self.write_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Reads attempted so far.
    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Block every read until `gate` yields a message or disconnects.
    pub(crate) fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl LinkSocket for MockSocket {
    fn read_with_deadline(
        &self,
        buf: &mut [u8],
        deadline: Duration,
    ) -> ethercomms_transport::Result<(usize, PeerAddr)> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        let peer = PeerAddr {
            interface_index: 1,
            hardware: REMOTE,
            protocol: 0x080D,
            packet_type: 0,
        };
        match self.reads.recv_timeout(deadline) {
            Ok(MockRead::Data(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok((bytes.len(), peer))
            }
            Ok(MockRead::Oversized(len)) => {
                let prefix = wire(BROADCAST, b"cut short");
                buf.fill(0);
                buf[..prefix.len()].copy_from_slice(&prefix);
                Ok((len, peer))
            }
            Ok(MockRead::Fail(kind)) => Err(TransportError::Io(kind.into())),
            Err(RecvTimeoutError::Timeout) => Err(TransportError::Timeout(deadline)),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(deadline);
                Err(TransportError::Timeout(deadline))
            }
        }
    }

    fn write_to(&self, frame: &[u8], destination: MacAddr) -> ethercomms_transport::Result<usize> {
        let fail = self
            .write_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(TransportError::Io(std::io::ErrorKind::BrokenPipe.into()));
        }
        let _ = self.writes.send((frame.to_vec(), destination));
        Ok(frame.len())
    }
}

pub(crate) fn interface() -> Interface {
    Interface {
        name: "mock0".to_string(),
        index: 1,
        mtu: 1500,
        hardware: LOCAL,
    }
}

/// Encoded ETHERCOMMS frame from [`REMOTE`] to `destination`.
pub(crate) fn wire(destination: MacAddr, payload: &'static [u8]) -> Vec<u8> {
    let frame = Frame::new(destination, REMOTE, 0x080D, Bytes::from_static(payload));
    let mut buf = BytesMut::new();
    encode_frame(&frame, &mut buf).expect("encodable frame");
    buf.to_vec()
}

/// Poll `cond` until it holds or `timeout` passes.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

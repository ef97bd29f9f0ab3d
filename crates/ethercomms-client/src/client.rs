use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use ethercomms_frame::{Frame, FrameReader, FrameWriter};
use ethercomms_transport::{Interface, LinkSocket};
use tracing::{debug, info};

#[cfg(target_os = "linux")]
use ethercomms_transport::PacketSocket;

use crate::backoff::Backoff;
use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorReporter, Result, WorkerError};
use crate::receiver::ReceiverWorker;
use crate::sender::SenderWorker;
use crate::signal::TerminationSignal;
use crate::stats::{Stats, StatsSnapshot};

/// A client bound to a live `AF_PACKET` socket.
#[cfg(target_os = "linux")]
pub type PacketClient = Client<PacketSocket>;

/// Raw Ethernet client with a receiver and a sender worker.
///
/// Frames read off the wire are published on [`receiver`](Self::receiver);
/// frames pushed into [`sender`](Self::sender) are written addressed to their
/// `destination`. Each worker has its own termination signal. Dropping the
/// client raises both signals without waiting for the workers to exit.
pub struct Client<S: LinkSocket> {
    interface: Interface,
    config: ClientConfig,
    inbound: Receiver<Frame>,
    outbound: Sender<Frame>,
    errors: Receiver<WorkerError>,
    receiver_signal: TerminationSignal,
    sender_signal: TerminationSignal,
    receiver_thread: Option<JoinHandle<()>>,
    sender_thread: Option<JoinHandle<()>>,
    stats: Arc<Stats>,
    socket: Arc<S>,
}

#[cfg(target_os = "linux")]
impl Client<PacketSocket> {
    /// Open a packet socket on the named interface with default configuration
    /// and start both workers.
    pub fn initialize(interface: &str) -> Result<Self> {
        Self::initialize_with_config(interface, ClientConfig::default())
    }

    /// Open a packet socket on the named interface and start both workers.
    ///
    /// Fails without starting anything if the interface does not exist or the
    /// socket cannot be opened (typically missing `CAP_NET_RAW`).
    pub fn initialize_with_config(interface: &str, config: ClientConfig) -> Result<Self> {
        let iface = Interface::by_name(interface)?;
        let socket = PacketSocket::open(&iface, config.ether_type)?;
        Self::from_socket(socket, iface, config)
    }
}

impl<S: LinkSocket> Client<S> {
    /// Start both workers over an already-open socket.
    pub fn from_socket(socket: S, interface: Interface, config: ClientConfig) -> Result<Self> {
        let socket = Arc::new(socket);
        let stats = Arc::new(Stats::default());
        let (inbound_tx, inbound_rx) = queue(config.queue_capacity);
        let (outbound_tx, outbound_rx) = queue(config.queue_capacity);
        let (errors_tx, errors_rx) = crossbeam_channel::bounded(config.error_capacity);
        let errors = ErrorReporter::new(errors_tx);
        let receiver_signal = TerminationSignal::new();
        let sender_signal = TerminationSignal::new();
        let frame_config = config.frame_config(interface.mtu);

        let receiver = ReceiverWorker {
            reader: FrameReader::with_config(Arc::clone(&socket), frame_config.clone()),
            inbound: inbound_tx,
            termination: receiver_signal.listener(),
            errors: errors.clone(),
            stats: Arc::clone(&stats),
            backoff: Backoff::new(config.backoff_initial, config.backoff_max),
            interface: interface.name.clone(),
        };
        let sender = SenderWorker {
            writer: FrameWriter::with_config(Arc::clone(&socket), frame_config),
            outbound: outbound_rx,
            termination: sender_signal.listener(),
            errors,
            stats: Arc::clone(&stats),
            interface: interface.name.clone(),
        };

        let receiver_thread = spawn("receiver", &interface.name, move || receiver.run())?;
        let sender_thread = match spawn("sender", &interface.name, move || sender.run()) {
            Ok(handle) => handle,
            Err(err) => {
                receiver_signal.raise();
                let _ = receiver_thread.join();
                return Err(err);
            }
        };

        info!(
            interface = %interface.name,
            index = interface.index,
            mtu = interface.mtu,
            ether_type = format_args!("{:#06x}", config.ether_type),
            "client initialized"
        );

        Ok(Self {
            interface,
            config,
            inbound: inbound_rx,
            outbound: outbound_tx,
            errors: errors_rx,
            receiver_signal,
            sender_signal,
            receiver_thread: Some(receiver_thread),
            sender_thread: Some(sender_thread),
            stats,
            socket,
        })
    }

    /// Inbound queue of decoded frames, in arrival order.
    pub fn receiver(&self) -> &Receiver<Frame> {
        &self.inbound
    }

    /// Outbound queue. Each frame pushed here is written exactly once.
    ///
    /// Once the sender worker has exited, sends fail with a disconnected error.
    pub fn sender(&self) -> &Sender<Frame> {
        &self.outbound
    }

    /// Failures reported by the workers.
    pub fn errors(&self) -> &Receiver<WorkerError> {
        &self.errors
    }

    /// Ask the receiver to stop. It exits after its current read returns.
    pub fn terminate_receiver(&self) {
        debug!(interface = %self.interface.name, "raising receiver termination");
        self.receiver_signal.raise();
    }

    /// Ask the sender to stop. Frames still queued are not sent.
    pub fn terminate_sender(&self) {
        debug!(interface = %self.interface.name, "raising sender termination");
        self.sender_signal.raise();
    }

    pub fn receiver_running(&self) -> bool {
        is_running(&self.receiver_thread)
    }

    pub fn sender_running(&self) -> bool {
        is_running(&self.sender_thread)
    }

    /// Raise both termination signals and wait for the workers to exit.
    pub fn shutdown(&mut self) -> Result<()> {
        self.terminate_receiver();
        self.terminate_sender();
        self.join()
    }

    /// Wait for both workers to exit.
    ///
    /// Blocks until the workers stop on their own, so raise their signals
    /// first. Calling it again after it returns is a no-op.
    pub fn join(&mut self) -> Result<()> {
        let receiver = join("receiver", self.receiver_thread.take());
        let sender = join("sender", self.sender_thread.take());
        receiver.and(sender)
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// The socket shared by both workers.
    pub fn socket(&self) -> &S {
        &self.socket
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl<S: LinkSocket> Drop for Client<S> {
    fn drop(&mut self) {
        self.receiver_signal.raise();
        self.sender_signal.raise();
    }
}

impl<S: LinkSocket> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("interface", &self.interface.name)
            .field("receiver_running", &self.receiver_running())
            .field("sender_running", &self.sender_running())
            .finish()
    }
}

fn queue(capacity: Option<usize>) -> (Sender<Frame>, Receiver<Frame>) {
    match capacity {
        Some(cap) => crossbeam_channel::bounded(cap),
        None => crossbeam_channel::unbounded(),
    }
}

fn spawn(
    worker: &'static str,
    interface: &str,
    body: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("{worker}-{interface}"))
        .spawn(body)
        .map_err(|source| ClientError::Spawn { worker, source })
}

fn is_running(thread: &Option<JoinHandle<()>>) -> bool {
    thread.as_ref().is_some_and(|handle| !handle.is_finished())
}

fn join(worker: &'static str, thread: Option<JoinHandle<()>>) -> Result<()> {
    match thread {
        Some(handle) => handle
            .join()
            .map_err(|_| ClientError::WorkerPanicked(worker)),
        None => Ok(()),
    }
}

use std::sync::Arc;

use crossbeam_channel::{select, Sender};
use ethercomms_frame::{Frame, FrameError, FrameReader};
use ethercomms_transport::LinkSocket;
use tracing::{debug, info, trace, warn};

use crate::backoff::Backoff;
use crate::error::{ErrorReporter, WorkerError};
use crate::signal::Termination;
use crate::stats::Stats;

/// Pulls frames off the socket and publishes them to the inbound queue.
pub(crate) struct ReceiverWorker<S> {
    pub(crate) reader: FrameReader<Arc<S>>,
    pub(crate) inbound: Sender<Frame>,
    pub(crate) termination: Termination,
    pub(crate) errors: ErrorReporter,
    pub(crate) stats: Arc<Stats>,
    pub(crate) backoff: Backoff,
    pub(crate) interface: String,
}

impl<S: LinkSocket> ReceiverWorker<S> {
    /// Run until the termination signal is raised or the inbound queue is
    /// disconnected.
    ///
    /// The signal is checked between reads, so an in-flight read is never
    /// interrupted. Shutdown latency is bounded by the read deadline.
    pub(crate) fn run(mut self) {
        debug!(interface = %self.interface, "receiver started");
        while !self.termination.is_raised() {
            if !self.step() {
                break;
            }
        }
        info!(interface = %self.interface, "terminating receiver");
    }

    /// One read. Returns false when the worker should stop.
    fn step(&mut self) -> bool {
        match self.reader.read_frame() {
            Ok(frame) => {
                self.backoff.reset();
                self.stats.record_received(frame.wire_size());
                self.publish(frame)
            }
            Err(err) if err.is_timeout() => {
                trace!(interface = %self.interface, "read timed out");
                self.stats.record_read_timeout();
                true
            }
            Err(FrameError::Transport(err)) => {
                let delay = self.backoff.next_delay();
                warn!(
                    interface = %self.interface,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "failed to receive frame"
                );
                self.stats.record_read_error();
                self.errors.report(WorkerError::Read(err));
                !self.termination.wait_timeout(delay)
            }
            Err(err) => {
                warn!(interface = %self.interface, error = %err, "dropping undecodable frame");
                self.stats.record_decode_error();
                self.errors.report(WorkerError::Decode(err));
                true
            }
        }
    }

    /// Hand a frame to the consumer, giving up if the signal is raised while
    /// the queue is full.
    fn publish(&self, frame: Frame) -> bool {
        select! {
            send(self.inbound, frame) -> res => match res {
                Ok(()) => {
                    trace!(interface = %self.interface, "published frame");
                    true
                }
                Err(_) => {
                    debug!(interface = %self.interface, "inbound queue disconnected");
                    false
                }
            },
            recv(self.termination.channel()) -> _ => {
                debug!(interface = %self.interface, "terminated while inbound queue was full");
                false
            }
        }
    }
}

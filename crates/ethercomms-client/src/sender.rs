use std::sync::Arc;

use crossbeam_channel::{select, Receiver};
use ethercomms_frame::{Frame, FrameWriter};
use ethercomms_transport::LinkSocket;
use tracing::{debug, error, info, trace, warn};

use crate::error::{ErrorReporter, WorkerError};
use crate::signal::Termination;
use crate::stats::Stats;

/// Takes frames off the outbound queue and writes each one exactly once.
pub(crate) struct SenderWorker<S> {
    pub(crate) writer: FrameWriter<Arc<S>>,
    pub(crate) outbound: Receiver<Frame>,
    pub(crate) termination: Termination,
    pub(crate) errors: ErrorReporter,
    pub(crate) stats: Arc<Stats>,
    pub(crate) interface: String,
}

impl<S: LinkSocket> SenderWorker<S> {
    /// Run until the termination signal is raised or the outbound queue is
    /// disconnected. Frames still queued at that point are not sent.
    pub(crate) fn run(mut self) {
        debug!(interface = %self.interface, "sender started");
        loop {
            if self.termination.is_raised() {
                break;
            }
            select! {
                recv(self.termination.channel()) -> _ => break,
                recv(self.outbound) -> msg => match msg {
                    Ok(frame) => self.send(&frame),
                    Err(_) => {
                        debug!(interface = %self.interface, "outbound queue disconnected");
                        break;
                    }
                },
            }
        }
        info!(interface = %self.interface, "terminating sender");
    }

    fn send(&mut self, frame: &Frame) {
        match self.writer.write_frame(frame) {
            Ok(written) => {
                self.stats.record_sent(written);
                trace!(interface = %self.interface, destination = %frame.destination, "sent frame");
            }
            Err(err) if err.is_transport() => {
                error!(
                    interface = %self.interface,
                    destination = %frame.destination,
                    error = %err,
                    "failed to write frame"
                );
                self.stats.record_write_error();
                self.errors.report(WorkerError::Write {
                    destination: frame.destination,
                    source: err,
                });
            }
            Err(err) => {
                warn!(interface = %self.interface, error = %err, "dropping unencodable frame");
                self.stats.record_encode_error();
                self.errors.report(WorkerError::Encode(err));
            }
        }
    }
}

use ethercomms_frame::FrameError;
use ethercomms_transport::{MacAddr, TransportError};

/// Errors that can occur while setting up or tearing down a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Interface resolution or socket setup failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A worker thread could not be started.
    #[error("failed to spawn {worker} worker: {source}")]
    Spawn {
        worker: &'static str,
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

/// Failures observed by a running worker.
///
/// None of these stop the worker; they are delivered on the client's error
/// channel so the owner decides how to react.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The socket read failed for a reason other than the deadline expiring.
    #[error("failed to receive frame: {0}")]
    Read(TransportError),

    /// Bytes were received but did not decode; they were dropped.
    #[error("failed to decode frame: {0}")]
    Decode(FrameError),

    /// An outbound frame could not be encoded; it was dropped.
    #[error("failed to encode frame: {0}")]
    Encode(FrameError),

    /// An encoded frame could not be written; it was dropped.
    #[error("failed to write frame to {destination}: {source}")]
    Write {
        destination: MacAddr,
        source: FrameError,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Worker side of the error channel.
///
/// Reports never block a worker. When the channel is full or nobody is
/// listening, the report is dropped.
#[derive(Debug, Clone)]
pub(crate) struct ErrorReporter {
    tx: crossbeam_channel::Sender<WorkerError>,
}

impl ErrorReporter {
    pub(crate) fn new(tx: crossbeam_channel::Sender<WorkerError>) -> Self {
        Self { tx }
    }

    pub(crate) fn report(&self, err: WorkerError) {
        if let Err(crossbeam_channel::TrySendError::Full(err)) = self.tx.try_send(err) {
            tracing::debug!(error = %err, "error channel full, dropping report");
        }
    }
}

//! One-shot termination signals for worker threads.
//!
//! A signal is a zero-capacity channel nobody ever sends on. Raising it drops
//! the only sender, which disconnects every listener at once. Listeners can
//! poll it, wait on it with a timeout, or put it in a `select!` next to their
//! work source.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Owner side of a termination signal.
#[derive(Debug)]
pub struct TerminationSignal {
    trigger: Mutex<Option<Sender<()>>>,
    listener: Termination,
}

impl TerminationSignal {
    pub fn new() -> Self {
        let (trigger, rx) = crossbeam_channel::bounded(0);
        Self {
            trigger: Mutex::new(Some(trigger)),
            listener: Termination { rx },
        }
    }

    /// Raise the signal. Idempotent.
    pub fn raise(&self) {
        self.trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_raised(&self) -> bool {
        self.listener.is_raised()
    }

    /// A listener handle for a worker.
    pub fn listener(&self) -> Termination {
        self.listener.clone()
    }
}

impl Default for TerminationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of a termination signal.
#[derive(Debug, Clone)]
pub struct Termination {
    rx: Receiver<()>,
}

impl Termination {
    /// Non-blocking check.
    pub fn is_raised(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for up to `timeout`, waking early if the signal is raised.
    ///
    /// Returns true if the signal was raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) | Ok(()) => false,
        }
    }

    /// Channel that becomes ready (with an error) once the signal is raised.
    pub fn channel(&self) -> &Receiver<()> {
        &self.rx
    }
}

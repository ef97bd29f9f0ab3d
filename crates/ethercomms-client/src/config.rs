use std::time::Duration;

use ethercomms_frame::{FrameConfig, ETHERCOMMS};

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// EtherType the socket is bound to. Only frames of this type are received.
    pub ether_type: u16,
    /// Deadline for each socket read. Bounds how long a raised receiver signal
    /// can go unnoticed.
    pub read_timeout: Duration,
    /// Capacity of the inbound and outbound queues. `None` means unbounded.
    pub queue_capacity: Option<usize>,
    /// Capacity of the worker error channel. Reports beyond it are dropped.
    pub error_capacity: usize,
    /// First delay after a failed socket read.
    pub backoff_initial: Duration,
    /// Ceiling for the doubling read-failure delay.
    pub backoff_max: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ether_type: ETHERCOMMS,
            read_timeout: Duration::from_secs(1),
            queue_capacity: Some(64),
            error_capacity: 256,
            backoff_initial: Duration::from_millis(10),
            backoff_max: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    pub(crate) fn frame_config(&self, mtu: usize) -> FrameConfig {
        FrameConfig {
            mtu,
            read_timeout: self.read_timeout,
        }
    }
}

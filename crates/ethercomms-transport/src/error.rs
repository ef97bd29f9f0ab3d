use std::time::Duration;

/// Errors that can occur in link-layer transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The interface name cannot name a kernel interface.
    #[error("invalid interface name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// No interface with the given name exists.
    #[error("interface not found: {name}")]
    InterfaceNotFound { name: String },

    /// Querying interface attributes failed.
    #[error("failed to query interface {name}: {source}")]
    Interface {
        name: String,
        source: std::io::Error,
    },

    /// Failed to create the packet socket.
    #[error("failed to open packet socket on {interface}: {source}")]
    Open {
        interface: String,
        source: std::io::Error,
    },

    /// Failed to bind the packet socket to the interface.
    #[error("failed to bind packet socket to {interface}: {source}")]
    Bind {
        interface: String,
        source: std::io::Error,
    },

    /// No frame arrived before the read deadline.
    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A hardware address could not be parsed.
    #[error("invalid hardware address: {0}")]
    InvalidAddress(String),

    /// Raw packet sockets are not available on this platform.
    #[error("raw packet sockets are not supported on this platform")]
    Unsupported,
}

impl TransportError {
    /// Whether this error is an expired read deadline rather than a failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

use std::fmt;
use std::io;

use ethercomms_client::{ClientError, WorkerError};
use ethercomms_frame::FrameError;
use ethercomms_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    io_error_with_code(context, err, code)
}

/// Socket syscall failures: anything but EPERM is a link problem.
fn socket_io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => TRANSPORT_ERROR,
    };
    io_error_with_code(context, err, code)
}

fn io_error_with_code(context: &str, err: io::Error, code: i32) -> CliError {
    let hint = if code == PERMISSION_DENIED {
        " (raw sockets need CAP_NET_RAW)"
    } else {
        ""
    };
    CliError::new(code, format!("{context}: {err}{hint}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. }
        | TransportError::Bind { source, .. }
        | TransportError::Interface { source, .. }
        | TransportError::Io(source) => socket_io_error(context, source),
        TransportError::InvalidName { .. } | TransportError::InvalidAddress(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TransportError::Unsupported => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::ShortWrite { .. } => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        FrameError::FrameTooLarge { .. }
        | FrameError::Oversized { .. }
        | FrameError::Truncated { .. }
        | FrameError::InvalidVlan { .. }
        | FrameError::UnsupportedLength(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Spawn { source, .. } => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn worker_error(context: &str, err: WorkerError) -> CliError {
    match err {
        WorkerError::Read(err) => transport_error(context, err),
        WorkerError::Decode(err) | WorkerError::Encode(err) => frame_error(context, err),
        WorkerError::Write { source, .. } => frame_error(context, source),
    }
}

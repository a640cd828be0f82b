use std::time::Duration;

use thiserror::Error;

/// Connection-level failure reported by a transport. The core never
/// retries these; they surface in the call outcome and retry policy is
/// left to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("{0}")]
    Other(String),
}

/// Failure in the send direction of a duplex call.
#[derive(Debug, Error)]
pub enum SenderError {
    /// `send` of the request at `index` (0-based, source order) failed.
    /// Exactly `index + 1` sends were attempted and the send direction
    /// was never half-closed.
    #[error("send of request {index} failed: {source}")]
    Send {
        index: usize,
        #[source]
        source: TransportError,
    },

    /// Every request was sent but half-closing the send direction failed.
    #[error("closing the send direction failed: {source}")]
    CloseSend {
        #[source]
        source: TransportError,
    },
}

/// Failure in the receive direction of a duplex call.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("transport error while receiving: {0}")]
    Transport(#[from] TransportError),

    /// The configured `recv_timeout` elapsed before the peer finished
    /// its send direction.
    #[error("receive direction timed out after {0:?}")]
    Timeout(Duration),

    /// The receiver task stopped without signaling completion (it
    /// panicked or was aborted). Covers the launch-failure class as
    /// well: a task that never ran also never signals.
    #[error("receiver task stopped without signaling completion")]
    TaskFailed,
}

/// Error for the single-response call shapes (unary, client-streaming).
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The peer ended its stream without sending a response.
    #[error("peer ended the stream before replying")]
    MissingResponse,
}

impl From<SenderError> for CallError {
    fn from(err: SenderError) -> Self {
        match err {
            SenderError::Send { source, .. } => CallError::Transport(source),
            SenderError::CloseSend { source } => CallError::Transport(source),
        }
    }
}

impl From<ReceiverError> for CallError {
    fn from(err: ReceiverError) -> Self {
        match err {
            ReceiverError::Transport(source) => CallError::Transport(source),
            ReceiverError::Timeout(d) => CallError::Timeout(d),
            ReceiverError::TaskFailed => {
                CallError::Transport(TransportError::Other("receiver task failed".to_string()))
            }
        }
    }
}

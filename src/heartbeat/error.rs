//! Heartbeat transport errors.

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures observed on a heartbeat connection.
///
/// None of these escape the heartbeat task; they are logged and turned into
/// `Connectivity::Down`.
#[derive(Debug, Error)]
pub enum HeartbeatError {
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("no probe response before read deadline")]
    DeadlineExceeded,

    #[error("connection closed by peer")]
    Closed,

    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),
}

//! Client error types

use shared::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the connection layer and identity handling.
///
/// None of these are allowed to escape the render loop; the session logs them
/// and reflects transport failures in its connection status instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection is closed")]
    ChannelClosed,

    #[error("no game to reconnect to")]
    NoTarget,

    #[error("session has already been torn down")]
    SessionStopped,

    #[error("invalid identity token: {0}")]
    Token(String),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

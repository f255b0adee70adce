//! Error types shared by the hub core, its transports and configuration loading.

use thiserror::Error;

use crate::connection::ConnectionId;

#[derive(Error, Debug)]
pub enum HubError {
    /// The frame was not valid JSON, or a known message kind lacked its required fields.
    #[error("invalid message format: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    /// The transport delivered something other than a UTF-8 text frame.
    #[error("unsupported frame kind")]
    UnsupportedFrame,

    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    /// The peer stopped draining its outbound queue.
    #[error("outbound queue of connection {0} is full")]
    Backpressure(ConnectionId),

    #[error("websocket error: {0}")]
    Axum(#[from] axum::Error),

    #[error("websocket error: {0}")]
    Tungstenite(#[from] tungstenite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

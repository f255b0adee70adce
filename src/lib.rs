//! Signaling and room-coordination hub for two-party appointment video calls.
//!
//! Clients connect over a WebSocket, pair up in capacity-2 rooms, relay WebRTC
//! negotiation frames to each other, chat, and receive process-wide notifications.
//! [`hub::Hub`] owns all state; the modules under [`transport`] attach it to axum,
//! to a bare tokio-tungstenite listener, or to in-process channels.

pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod message;
pub mod registry;
pub mod response;
pub mod room;
pub mod transport;

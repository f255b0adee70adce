//! Transports that feed sockets into a [`crate::hub::Hub`].
//!
//! Each transport wraps its socket halves in a [`crate::connection::SinkAdapter`] /
//! [`crate::connection::StreamAdapter`] pair and hands them to
//! [`crate::hub::Hub::handle_stream`].

pub mod axum;
pub mod mpsc;
pub mod ws;

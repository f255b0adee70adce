//! In-process transport over tokio mpsc channels.
//!
//! Useful for embedding the hub in another service, or for driving it from tests
//! without a network.


use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::HubError;
use crate::hub::Hub;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// Forwards outbound frames into a channel. Closing drops the sender, so the
/// client side sees its receiver end.
pub struct MpscSink {
    sender: Option<Sender<String>>,
}

#[async_trait]
impl SinkAdapter for MpscSink {
    async fn send(&mut self, frame: Arc<str>) -> Result<(), HubError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| broken_pipe("sink already closed"))?;
        sender
            .send(frame.to_string())
            .await
            .map_err(|_| broken_pipe("client receiver dropped"))
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.sender = None;
        Ok(())
    }
}

fn broken_pipe(reason: &str) -> HubError {
    HubError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, reason))
}

pub struct MpscStream {
    receiver: Receiver<String>,
}

#[async_trait]
impl StreamAdapter for MpscStream {
    async fn next(&mut self) -> Result<Option<String>, HubError> {
        Ok(self.receiver.recv().await)
    }
}

/// Connects in-process clients to a [`Hub`].
#[derive(Clone)]
pub struct MpscJoint {
    hub: Arc<Hub>,
}

impl MpscJoint {
    pub fn new(hub: Arc<Hub>) -> Self {
        MpscJoint { hub }
    }

    /// Opens a connection and returns the client's ends: a sender for inbound text
    /// frames and a receiver for the frames the hub emits. Dropping the sender
    /// closes the connection.
    pub fn connect(&self, buffer_size: usize) -> (Sender<String>, Receiver<String>) {
        let buffer_size = buffer_size.max(1);
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);

        let hub = self.hub.clone();
        tokio::spawn(async move {
            let mut stream = MpscStream {
                receiver: inbound_rx,
            };
            let sink = MpscSink {
                sender: Some(outbound_tx),
            };

            hub.handle_stream(&mut stream, sink).await;
        });

        (inbound_tx, outbound_rx)
    }
}

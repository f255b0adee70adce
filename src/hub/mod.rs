//! The hub: one shared, serialized owner of the broadcaster, plus the per-connection
//! read loop every transport runs.


use crate::broadcaster::Broadcaster;
use crate::config::HubConfig;
use crate::connection::{Connection, Outbox, SinkAdapter, StreamAdapter};
use crate::dispatcher::{self, Routed};
use crate::error::HubError;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub rooms: usize,
    pub connections: usize,
}

/// Signaling and room-coordination hub.
///
/// All state sits behind a single mutex and every handler completes while holding
/// it, so frames are processed one at a time across all connections.
pub struct Hub {
    broadcaster: Mutex<Broadcaster>,
    config: HubConfig,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Hub {
            broadcaster: Mutex::new(Broadcaster::new(config.redirect_url.clone())),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Registers a new connection.
    pub async fn connect(&self) -> (Connection, Outbox) {
        let (connection, outbox) = Connection::open(self.config.outbound_buffer);
        let mut broadcaster = self.broadcaster.lock().await;
        broadcaster.add_connection(connection.clone());
        info!(
            connection = connection.id(),
            total = broadcaster.registry().len(),
            "connection opened"
        );
        (connection, outbox)
    }

    /// Unregisters a connection after its transport closed.
    pub async fn disconnect(&self, connection: &Connection) {
        connection.close();
        let mut broadcaster = self.broadcaster.lock().await;
        let released =
            broadcaster.remove_connection(connection.id(), self.config.leave_on_disconnect);
        info!(
            connection = connection.id(),
            released,
            total = broadcaster.registry().len(),
            "connection closed"
        );
    }

    pub async fn handle_frame(&self, connection: &Connection, text: &str) -> Routed {
        let mut broadcaster = self.broadcaster.lock().await;
        dispatcher::route(&mut broadcaster, connection, text)
    }

    /// Answers a frame the transport could not hand over as text.
    pub async fn reject_frame(&self, connection: &Connection) {
        let broadcaster = self.broadcaster.lock().await;
        dispatcher::reject(&broadcaster, connection);
    }

    pub async fn stats(&self) -> HubStats {
        let broadcaster = self.broadcaster.lock().await;
        HubStats {
            rooms: broadcaster.rooms().len(),
            connections: broadcaster.registry().len(),
        }
    }

    /// Names of the occupants of a room, in join order.
    pub async fn occupants(&self, room_id: &str) -> Option<Vec<String>> {
        let broadcaster = self.broadcaster.lock().await;
        broadcaster.rooms().get(room_id).map(|room| room.names())
    }

    /// Runs one connection from registration to close: reads frames from `stream`,
    /// routes them, and writes outbound frames to `sink` from a separate task.
    pub async fn handle_stream<S, K>(&self, stream: &mut S, sink: K)
    where
        S: StreamAdapter,
        K: SinkAdapter + 'static,
    {
        let (connection, outbox) = self.connect().await;
        let writer = tokio::spawn(outbox.drain_into(sink));

        loop {
            tokio::select! {
                biased;
                _ = connection.closed() => break,
                next = stream.next() => match next {
                    Ok(Some(text)) => {
                        self.handle_frame(&connection, &text).await;
                    }
                    Ok(None) => break,
                    Err(HubError::UnsupportedFrame) => {
                        warn!(connection = connection.id(), "rejecting non-text frame");
                        self.reject_frame(&connection).await;
                    }
                    Err(e) => {
                        warn!(connection = connection.id(), "transport error: {}", e);
                        break;
                    }
                },
            }
        }

        self.disconnect(&connection).await;
        if let Err(e) = writer.await {
            warn!(connection = connection.id(), "writer task failed: {}", e);
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Hub::new(HubConfig::default())
    }
}

//! Connection handles and the transport adapter traits.
//!
//! A [`Connection`] is the hub-side handle of one socket. Sending never blocks:
//! frames go into a bounded per-connection queue, and a writer task ([`Outbox::drain_into`])
//! forwards them to the transport through a [`SinkAdapter`].


use crate::error::HubError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::time::{sleep, timeout};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

pub type ConnectionId = u64;

/// How long writes may still take once a connection has been closed.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Outbound half of a transport.
#[async_trait]
pub trait SinkAdapter: Send {
    async fn send(&mut self, frame: Arc<str>) -> Result<(), HubError>;

    /// Closes the transport, sending a close frame where the protocol has one.
    async fn close(&mut self) -> Result<(), HubError>;
}

/// Inbound half of a transport.
#[async_trait]
pub trait StreamAdapter: Send {
    /// Returns the next text frame, or `Ok(None)` once the peer has gone away.
    async fn next(&mut self) -> Result<Option<String>, HubError>;
}

fn next_connection_id() -> ConnectionId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Hub-side handle of one live socket. Cheap to clone; all clones share the
/// same queue and open/closed state.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbound: Sender<Arc<str>>,
    shutdown: CancellationToken,
}

impl Connection {
    /// Creates a connection with an outbound queue of `buffer` frames and returns it
    /// together with the [`Outbox`] its writer task drains.
    pub fn open(buffer: usize) -> (Connection, Outbox) {
        let (outbound, receiver) = mpsc::channel(buffer.max(1));
        let shutdown = CancellationToken::new();
        let connection = Connection {
            id: next_connection_id(),
            outbound,
            shutdown: shutdown.clone(),
        };
        let outbox = Outbox {
            id: connection.id,
            receiver,
            shutdown,
        };
        (connection, outbox)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Queues a frame for delivery.
    ///
    /// A full queue means the peer has stopped reading: the connection is closed and
    /// the frame dropped.
    pub fn send(&self, frame: Arc<str>) -> Result<(), HubError> {
        if !self.is_open() {
            return Err(HubError::ConnectionClosed(self.id));
        }
        match self.outbound.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.close();
                Err(HubError::Backpressure(self.id))
            }
            Err(TrySendError::Closed(_)) => {
                self.close();
                Err(HubError::ConnectionClosed(self.id))
            }
        }
    }

    /// Closes the connection. Frames queued before this call are still flushed.
    pub fn close(&self) {
        if self.is_open() {
            debug!(connection = self.id, "closing connection");
        }
        self.shutdown.cancel();
    }

    /// Resolves once the connection has been closed from either side.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

/// Receiving end of a connection's outbound queue.
pub struct Outbox {
    id: ConnectionId,
    receiver: Receiver<Arc<str>>,
    shutdown: CancellationToken,
}

impl Outbox {
    /// Takes a queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.try_recv().ok()
    }

    /// Forwards queued frames to `sink` until the connection closes, then flushes
    /// whatever is still queued and closes the sink.
    ///
    /// Once the connection is closed, every write and the final close get at most
    /// [`CLOSE_GRACE`]; a peer that stopped reading cannot hold the writer open.
    pub async fn drain_into<K: SinkAdapter>(mut self, mut sink: K) {
        let mut stalled = false;
        loop {
            tokio::select! {
                biased;
                frame = self.receiver.recv() => match frame {
                    Some(frame) => {
                        let written = tokio::select! {
                            result = sink.send(frame) => result,
                            _ = grace_expired(&self.shutdown) => {
                                debug!(connection = self.id, "write still pending after close");
                                stalled = true;
                                break;
                            }
                        };
                        if let Err(e) = written {
                            debug!(connection = self.id, "write failed: {}", e);
                            self.shutdown.cancel();
                            return;
                        }
                    }
                    None => break,
                },
                _ = self.shutdown.cancelled() => break,
            }
        }

        if !stalled {
            let flush = async {
                while let Ok(frame) = self.receiver.try_recv() {
                    if sink.send(frame).await.is_err() {
                        break;
                    }
                }
            };
            if timeout(CLOSE_GRACE, flush).await.is_err() {
                debug!(connection = self.id, "flush timed out, dropping queued frames");
            }
        }
        match timeout(CLOSE_GRACE, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(connection = self.id, "close failed: {}", e),
            Err(_) => debug!(connection = self.id, "close timed out"),
        }
        self.shutdown.cancel();
    }
}

// Resolves CLOSE_GRACE after the connection was closed.
async fn grace_expired(shutdown: &CancellationToken) {
    shutdown.cancelled().await;
    sleep(CLOSE_GRACE).await;
}

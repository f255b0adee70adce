
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::HubError;
use crate::hub::Hub;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{info, warn};
use tungstenite::{Message, Utf8Bytes};

// Pause after a failed accept, e.g. when the process is out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

struct WSSink {
    sink: SplitSink<WebSocketStream<TcpStream>, Message>,
}

#[async_trait]
impl SinkAdapter for WSSink {
    async fn send(&mut self, frame: Arc<str>) -> Result<(), HubError> {
        let message = Message::Text(Utf8Bytes::from(frame.to_string()));
        self.sink.send(message).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.sink.close().await?;
        Ok(())
    }
}

struct WSStream {
    stream: SplitStream<WebSocketStream<TcpStream>>,
}

#[async_trait]
impl StreamAdapter for WSStream {
    async fn next(&mut self) -> Result<Option<String>, HubError> {
        loop {
            let message = match self.stream.next().await {
                Some(message) => message?,
                None => return Ok(None),
            };
            match message {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(_) => return Err(HubError::UnsupportedFrame),
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

/// Serves a [`Hub`] from a bare TCP listener, without an HTTP router in front.
pub struct WebsocketJoint {
    hub: Arc<Hub>,
    tcp_listener: Option<TcpListener>,
}

impl WebsocketJoint {
    pub fn new(hub: Arc<Hub>) -> Self {
        WebsocketJoint {
            hub,
            tcp_listener: None,
        }
    }

    pub fn bind_listener(&mut self, listener: TcpListener) {
        self.tcp_listener = Some(listener);
    }

    pub async fn bind_addr(&mut self, addr: &str) -> Result<(), HubError> {
        let tcp_listener = TcpListener::bind(addr).await?;
        self.tcp_listener = Some(tcp_listener);
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.tcp_listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Accepts sockets forever, one task per socket.
    pub async fn listen(&mut self) -> Result<(), HubError> {
        let tcp_listener = self.tcp_listener.take().ok_or_else(|| {
            HubError::InvalidConfig("websocket joint has no listener bound".to_string())
        })?;
        info!("accepting websocket connections on {:?}", tcp_listener.local_addr().ok());

        loop {
            match tcp_listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(Self::stream_worker(stream, peer, self.hub.clone()));
                }
                Err(e) => {
                    warn!("accept failed: {}", e);
                    sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    async fn stream_worker(stream: TcpStream, peer: SocketAddr, hub: Arc<Hub>) {
        let websocket = match accept_async(stream).await {
            Ok(websocket) => websocket,
            Err(e) => {
                warn!(%peer, "websocket handshake failed: {}", e);
                return;
            }
        };
        let (sink, stream) = websocket.split();

        let mut stream_wrapper = WSStream { stream };

        let sink_wrapper = WSSink { sink };

        hub.handle_stream(&mut stream_wrapper, sink_wrapper).await;
    }
}

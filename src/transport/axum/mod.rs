
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::HubError;
use crate::hub::{Hub, HubStats};
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;

pub struct AxumWSSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl SinkAdapter for AxumWSSink {
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

pub struct AxumWSStream {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl StreamAdapter for AxumWSStream {
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
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }
}

/// Serves a [`Hub`] over axum WebSocket routes.
#[derive(Clone)]
pub struct AxumWSJoint {
    hub: Arc<Hub>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: HubStats,
}

impl AxumWSJoint {
    pub fn new(hub: Arc<Hub>) -> Self {
        AxumWSJoint { hub }
    }

    pub async fn ws_handler(ws: WebSocketUpgrade, hub: Arc<Hub>) -> impl IntoResponse {
        ws.on_upgrade(|socket| async move {
            let (sink, stream) = socket.split();

            let mut stream_wrapper = AxumWSStream { stream };

            let sink_wrapper = AxumWSSink { sink };

            hub.handle_stream(&mut stream_wrapper, sink_wrapper).await;
        })
    }

    async fn health_handler(hub: Arc<Hub>) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "ok",
            stats: hub.stats().await,
        })
    }

    /// Mounts the WebSocket endpoint at `path`.
    pub fn attach_router(&self, path: &str, router: Router) -> Router {
        let hub = self.hub.clone();
        router.route(path, get(move |ws| AxumWSJoint::ws_handler(ws, hub)))
    }

    /// Mounts a JSON health endpoint reporting room and connection counts.
    pub fn attach_health(&self, path: &str, router: Router) -> Router {
        let hub = self.hub.clone();
        router.route(path, get(move || AxumWSJoint::health_handler(hub)))
    }
}

//! `Connection` implementation over an axum WebSocket.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use knightwire_core::connection::Connection;
use knightwire_core::error::RelayError;
use knightwire_core::protocol::StateMessage;
use tokio::sync::Mutex;
use tracing::debug;

/// Write half of a relay WebSocket.
///
/// The sink sits behind an async mutex so the lifecycle task and the
/// dispatcher never interleave frames. Closing takes the sink out; later
/// sends fail with a transport error.
pub struct WsConnection {
    sink: Mutex<Option<SplitSink<WebSocket, Message>>>,
}

impl WsConnection {
    /// Wraps the write half of a split socket.
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
        }
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&self, message: &StateMessage) -> Result<(), RelayError> {
        let frame = Message::Text(message.encode()?.into());
        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            return Err(RelayError::Transport("connection already closed".into()));
        };
        sink.send(frame)
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    async fn close(&self) {
        let Some(mut sink) = self.sink.lock().await.take() else {
            return;
        };
        if let Err(e) = sink.close().await {
            debug!(error = %e, "close handshake failed");
        }
    }
}

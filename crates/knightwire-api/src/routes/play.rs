//! The relay socket at `/ws`.
//!
//! Each upgraded connection gets one task that registers a session, sends the
//! welcome, activates the session, and then forwards decoded moves to the
//! dispatcher until the socket ends. Teardown removes the session by
//! connection id, so it cannot clobber a newer session that reused the
//! identity.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::{Router, routing::get};
use futures_util::{Stream, StreamExt};
use knightwire_core::connection::Connection;
use knightwire_core::error::RelayError;
use knightwire_core::protocol::MoveRequest;
use knightwire_session::application::dispatcher::MoveEnvelope;
use knightwire_session::domain::session::SessionSnapshot;
use tracing::{Span, debug, info, instrument, warn};

use crate::connection::WsConnection;
use crate::state::AppState;

/// Why a connection's read loop ended.
#[derive(Debug)]
enum Disconnect {
    /// The peer closed the socket or the stream ended.
    Closed,
    /// No frame arrived within the idle timeout.
    IdleTimeout,
    /// Reading from the socket failed.
    Transport(axum::Error),
    /// A frame could not be decoded as a move.
    Protocol(RelayError),
    /// The dispatcher is no longer accepting moves.
    DispatcherGone,
}

/// GET /ws
async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_failed_upgrade(|e| warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| run_connection(socket, state))
}

/// Splits an upgraded socket and serves it.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (sink, stream) = socket.split();
    let connection: Arc<dyn Connection> = Arc::new(WsConnection::new(sink));
    serve_session(connection, stream, &state).await;
}

/// Drives one relay connection from welcome to teardown.
///
/// The session is registered as pending and only activated once the welcome
/// has been written, so no reply can overtake it. If the welcome fails the
/// session is removed and `frames` is never read.
#[instrument(skip_all, fields(identity, connection_id))]
pub async fn serve_session<S>(connection: Arc<dyn Connection>, frames: S, state: &AppState)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let session = state.registry.register(Arc::clone(&connection));
    let span = Span::current();
    span.record("identity", session.identity.as_str());
    span.record("connection_id", tracing::field::display(session.connection_id));

    if let Err(e) = connection.send(&session.welcome()).await {
        warn!(error = %e, "welcome failed");
        teardown(state, &session, connection.as_ref()).await;
        return;
    }
    state.registry.activate(session.connection_id);

    match read_moves(frames, &session, state).await {
        Disconnect::Closed => info!("connection closed by peer"),
        Disconnect::IdleTimeout => info!("connection idle, closing"),
        Disconnect::Transport(e) => warn!(error = %e, "read failed"),
        Disconnect::Protocol(e) => warn!(error = %e, "malformed frame, closing"),
        Disconnect::DispatcherGone => warn!("dispatcher stopped, closing"),
    }

    teardown(state, &session, connection.as_ref()).await;
}

async fn read_moves<S>(mut frames: S, session: &SessionSnapshot, state: &AppState) -> Disconnect
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = match state.idle_timeout {
            Some(idle) => match tokio::time::timeout(idle, frames.next()).await {
                Ok(next) => next,
                Err(_) => return Disconnect::IdleTimeout,
            },
            None => frames.next().await,
        };

        let request = match next {
            None | Some(Ok(Message::Close(_))) => return Disconnect::Closed,
            Some(Err(e)) => return Disconnect::Transport(e),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Text(text))) => MoveRequest::decode(text.as_str().as_bytes()),
            Some(Ok(Message::Binary(bytes))) => MoveRequest::decode(&bytes),
        };

        let request = match request {
            Ok(request) => request,
            Err(e) => return Disconnect::Protocol(e),
        };

        let envelope = MoveEnvelope::new(
            session.connection_id,
            request.target_or(&session.identity),
            request.notation.clone(),
        );
        debug!(
            correlation_id = %envelope.correlation_id,
            target = %envelope.identity,
            notation = %envelope.notation,
            "move queued"
        );
        if state.moves.send(envelope).is_err() {
            return Disconnect::DispatcherGone;
        }
    }
}

async fn teardown(state: &AppState, session: &SessionSnapshot, connection: &dyn Connection) {
    state.registry.remove(session.connection_id);
    connection.close().await;
}

/// Returns the router for the relay socket.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

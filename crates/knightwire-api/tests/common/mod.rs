//! Shared test helpers for relay integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use knightwire_core::protocol::StateMessage;
use knightwire_core::rng::StdRngSource;
use knightwire_core::rules::RulesEngine;
use knightwire_rules::ChessEngine;
use knightwire_session::application::registry::SessionRegistry;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use knightwire_api::app;
use knightwire_api::state::AppState;

/// Client side of a relay socket.
pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a client waits before concluding the server sent nothing.
pub const SILENCE: Duration = Duration::from_millis(300);

/// A relay server listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<SessionRegistry>,
}

/// Build a registry with the chess engine and a fixed identity seed.
pub fn test_registry() -> Arc<SessionRegistry> {
    Arc::new(SessionRegistry::new(
        Arc::new(ChessEngine),
        Box::new(StdRngSource::seeded(42)),
    ))
}

/// Build the full app router. Uses the same wiring as `main.rs`.
pub fn build_test_app() -> (Router, Arc<SessionRegistry>) {
    let registry = test_registry();
    let (state, _dispatcher) = AppState::with_dispatcher(Arc::clone(&registry), None);
    (app(state), registry)
}

/// Serve the app on 127.0.0.1 with no idle timeout.
pub async fn spawn_server() -> TestServer {
    spawn_server_with(None).await
}

/// Serve the app on 127.0.0.1 with the given idle timeout.
pub async fn spawn_server_with(idle_timeout: Option<Duration>) -> TestServer {
    let registry = test_registry();
    let (state, _dispatcher) = AppState::with_dispatcher(Arc::clone(&registry), idle_timeout);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    TestServer { addr, registry }
}

impl TestServer {
    /// Open a relay socket.
    pub async fn connect(&self) -> Client {
        let (client, _response) = tokio_tungstenite::connect_async(format!("ws://{}/ws", self.addr))
            .await
            .unwrap();
        client
    }

    /// Open a relay socket and consume its welcome.
    pub async fn connect_welcomed(&self) -> (Client, StateMessage) {
        let mut client = self.connect().await;
        let welcome = recv_state(&mut client).await;
        (client, welcome)
    }

    /// Poll until `identity` is no longer registered.
    pub async fn wait_until_gone(&self, identity: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.registry.contains(identity) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("session {identity} was never removed"));
    }
}

/// Receive the next state message, failing after five seconds.
pub async fn recv_state(client: &mut Client) -> StateMessage {
    let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for state")
        .expect("stream ended")
        .expect("read failed");
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

/// Send a JSON value as a text frame.
pub async fn send_json(client: &mut Client, value: &serde_json::Value) {
    client
        .send(Message::text(value.to_string()))
        .await
        .unwrap();
}

/// Send a move for the sender's own session.
pub async fn send_move(client: &mut Client, notation: &str) {
    send_json(client, &serde_json::json!({ "move": notation })).await;
}

/// Assert that no data frame arrives within [`SILENCE`].
pub async fn expect_silence(client: &mut Client) {
    match tokio::time::timeout(SILENCE, client.next()).await {
        Err(_) => {}
        Ok(frame) => panic!("expected silence, got {frame:?}"),
    }
}

/// Assert that the server ends the connection.
pub async fn expect_closed(client: &mut Client) {
    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                None | Some(Err(_) | Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "server never closed the connection");
}

/// Rendering of the starting position after `moves`.
pub fn render_after(moves: &[&str]) -> String {
    let mut game = ChessEngine.new_game();
    for notation in moves {
        game.play(notation).unwrap();
    }
    game.render()
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use knightwire_session::application::dispatcher::{MoveDispatcher, MoveSender, move_queue};
use knightwire_session::application::registry::SessionRegistry;
use tokio::task::JoinHandle;

/// Application state shared across all request handlers and connections.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live sessions.
    pub registry: Arc<SessionRegistry>,
    /// Producer half of the dispatcher's move queue.
    pub moves: MoveSender,
    /// Read timeout for relay connections; `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        moves: MoveSender,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            moves,
            idle_timeout,
        }
    }

    /// Creates the move queue, spawns the dispatcher task on the current
    /// runtime, and returns state wired to it.
    ///
    /// The dispatcher stops once every clone of the returned state is dropped.
    #[must_use]
    pub fn with_dispatcher(
        registry: Arc<SessionRegistry>,
        idle_timeout: Option<Duration>,
    ) -> (Self, JoinHandle<()>) {
        let (moves, inbox) = move_queue();
        let dispatcher = MoveDispatcher::new(Arc::clone(&registry));
        let handle = tokio::spawn(dispatcher.run(inbox));
        (Self::new(registry, moves, idle_timeout), handle)
    }
}

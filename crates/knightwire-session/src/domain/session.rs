//! The session bound to one live connection.

use std::fmt;
use std::sync::Arc;

use knightwire_core::connection::Connection;
use knightwire_core::error::RelayError;
use knightwire_core::protocol::StateMessage;
use knightwire_core::rules::Game;
use tracing::warn;
use uuid::Uuid;

/// Process-unique identifier of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Whether the session's game is still being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No terminal position reached yet.
    InProgress,
    /// The rules engine reported this result.
    Terminal(String),
}

impl SessionStatus {
    /// Short machine-readable label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Terminal(_) => "terminal",
        }
    }

    /// The recorded result, if terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<&str> {
        match self {
            Self::InProgress => None,
            Self::Terminal(outcome) => Some(outcome),
        }
    }
}

/// Read-only copy of a session's state, safe to hold outside the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Registry key.
    pub connection_id: ConnectionId,
    /// Display name used for addressing.
    pub identity: String,
    /// Current board diagram.
    pub rendered: String,
    /// Game status.
    pub status: SessionStatus,
}

impl SessionSnapshot {
    /// The welcome message for this session.
    #[must_use]
    pub fn welcome(&self) -> StateMessage {
        StateMessage::welcome(self.identity.clone(), self.rendered.clone())
    }
}

/// One connection, one identity, one game.
pub struct Session {
    connection_id: ConnectionId,
    identity: String,
    connection: Arc<dyn Connection>,
    game: Box<dyn Game>,
    status: SessionStatus,
}

impl Session {
    /// Creates a session for a freshly opened connection.
    #[must_use]
    pub fn new(
        connection_id: ConnectionId,
        identity: String,
        connection: Arc<dyn Connection>,
        game: Box<dyn Game>,
    ) -> Self {
        Self {
            connection_id,
            identity,
            connection,
            game,
            status: SessionStatus::InProgress,
        }
    }

    /// Registry key of the owning connection.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Display name.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Shared handle to the owning connection.
    #[must_use]
    pub fn connection(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.connection)
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Current board diagram.
    #[must_use]
    pub fn rendered(&self) -> String {
        self.game.render()
    }

    /// Copies the observable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection_id: self.connection_id,
            identity: self.identity.clone(),
            rendered: self.rendered(),
            status: self.status.clone(),
        }
    }

    /// Applies one move and builds the state reply.
    ///
    /// The move is handed to the rules engine unconditionally; a finished
    /// game rejects it there. If the engine cannot evaluate the new position
    /// the reply carries no outcome and the session stays in progress.
    ///
    /// # Errors
    ///
    /// Returns the engine's error (normally `RelayError::IllegalMove`) when
    /// the move is rejected. The position is unchanged in that case.
    pub fn apply_move(&mut self, notation: &str) -> Result<StateMessage, RelayError> {
        self.game.play(notation)?;

        let outcome = match self.game.outcome() {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    identity = %self.identity,
                    error = %e,
                    "outcome query failed, treating position as non-terminal"
                );
                None
            }
        };

        if let Some(result) = &outcome {
            self.status = SessionStatus::Terminal(result.clone());
        }

        Ok(StateMessage {
            identity: self.identity.clone(),
            rendered: self.game.render(),
            outcome,
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connection_id", &self.connection_id)
            .field("identity", &self.identity)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

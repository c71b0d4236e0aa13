//! Wire messages exchanged over a relay connection.
//!
//! Every frame is a JSON object. The client sends [`MoveRequest`]s; the
//! server answers with [`StateMessage`]s, the first of which (the welcome)
//! is pushed unprompted right after the connection opens.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// A move sent by a client.
///
/// `identity` addresses the session the move is meant for. When it is absent
/// or empty the move targets the sender's own session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveRequest {
    /// Identity of the addressed session. `username` is accepted for older
    /// clients.
    #[serde(default, alias = "username")]
    pub identity: Option<String>,
    /// Move in the rules engine's notation.
    #[serde(rename = "move")]
    pub notation: String,
}

impl MoveRequest {
    /// Decodes a move request from a raw frame payload.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Protocol` if the payload is not a JSON object
    /// with a string `move` field.
    pub fn decode(payload: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(payload).map_err(|e| RelayError::Protocol(e.to_string()))
    }

    /// Returns the addressed identity, falling back to `own` when the request
    /// does not name one.
    #[must_use]
    pub fn target_or<'a>(&'a self, own: &'a str) -> &'a str {
        match self.identity.as_deref() {
            Some(identity) if !identity.is_empty() => identity,
            _ => own,
        }
    }
}

/// Session state pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMessage {
    /// Identity of the session this state belongs to.
    pub identity: String,
    /// Human-readable board diagram.
    pub rendered: String,
    /// Game result, present only once the position is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl StateMessage {
    /// Builds the welcome message sent once when a session is created.
    #[must_use]
    pub fn welcome(identity: impl Into<String>, rendered: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            rendered: rendered.into(),
            outcome: None,
        }
    }

    /// Serializes the message to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Protocol` if serialization fails.
    pub fn encode(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(|e| RelayError::Protocol(e.to_string()))
    }
}

//! Relay error taxonomy.

use thiserror::Error;

/// Top-level error type for the session relay.
///
/// Transport and protocol errors are fatal to the connection they occur on.
/// The remaining variants are per-message failures that the dispatcher logs
/// and discards.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Reading from or writing to a connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// An inbound payload could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No live session carries the requested identity.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The rules engine rejected a move.
    #[error("illegal move {notation:?}: {reason}")]
    IllegalMove {
        /// The notation as received.
        notation: String,
        /// Why the rules engine rejected it.
        reason: String,
    },

    /// The rules engine failed to answer a query.
    #[error("rules engine error: {0}")]
    RulesEngine(String),
}

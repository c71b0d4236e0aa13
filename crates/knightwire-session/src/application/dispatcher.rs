//! The move dispatcher.
//!
//! A single task drains the move queue in arrival order. For each envelope it
//! resolves the addressed session, applies the move through the rules engine,
//! and replies on that session's connection only. Rejected moves and unknown
//! identities get no reply.

use std::sync::Arc;

use knightwire_core::protocol::StateMessage;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::registry::SessionRegistry;
use crate::domain::session::ConnectionId;

/// Producer half of the move queue, held by every connection task.
pub type MoveSender = mpsc::UnboundedSender<MoveEnvelope>;

/// Consumer half of the move queue, owned by the dispatcher.
pub type MoveReceiver = mpsc::UnboundedReceiver<MoveEnvelope>;

/// Creates the unbounded move queue.
#[must_use]
pub fn move_queue() -> (MoveSender, MoveReceiver) {
    mpsc::unbounded_channel()
}

/// A move addressed to a session by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEnvelope {
    /// Correlation ID for tracing this move through the system.
    pub correlation_id: Uuid,
    /// Connection the move arrived on.
    pub origin: ConnectionId,
    /// Identity of the addressed session.
    pub identity: String,
    /// Move notation as received.
    pub notation: String,
}

impl MoveEnvelope {
    /// Wraps a move with a fresh correlation ID.
    #[must_use]
    pub fn new(origin: ConnectionId, identity: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            origin,
            identity: identity.into(),
            notation: notation.into(),
        }
    }
}

/// What happened to one dispatched move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The move was applied and this state was sent.
    Replied(StateMessage),
    /// No live session has the addressed identity.
    SessionNotFound,
    /// The rules engine rejected the move.
    IllegalMove,
    /// The move was applied but the reply could not be delivered; the session
    /// has been torn down.
    ConnectionLost,
}

/// Single consumer of the move queue.
#[derive(Debug, Clone)]
pub struct MoveDispatcher {
    registry: Arc<SessionRegistry>,
}

impl MoveDispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Processes envelopes until every sender has been dropped.
    pub async fn run(self, mut inbox: MoveReceiver) {
        info!("move dispatcher started");
        while let Some(envelope) = inbox.recv().await {
            self.dispatch(envelope).await;
        }
        info!("move queue closed, dispatcher stopping");
    }

    /// Applies one move and replies to the addressed session.
    #[instrument(
        skip(self, envelope),
        fields(
            correlation_id = %envelope.correlation_id,
            origin = %envelope.origin,
            identity = %envelope.identity,
            notation = %envelope.notation,
        )
    )]
    pub async fn dispatch(&self, envelope: MoveEnvelope) -> DispatchOutcome {
        let applied = self.registry.update(&envelope.identity, |session| {
            session
                .apply_move(&envelope.notation)
                .map(|reply| (session.connection_id(), session.connection(), reply))
        });

        let (connection_id, connection, reply) = match applied {
            Err(e) => {
                info!(error = %e, "move discarded, no live session");
                return DispatchOutcome::SessionNotFound;
            }
            Ok(Err(e)) => {
                info!(error = %e, "move discarded, rejected by rules engine");
                return DispatchOutcome::IllegalMove;
            }
            Ok(Ok(applied)) => applied,
        };

        // The registry lock is released here; the write may suspend.
        if let Err(e) = connection.send(&reply).await {
            warn!(error = %e, %connection_id, "reply failed, tearing down session");
            connection.close().await;
            self.registry.remove(connection_id);
            return DispatchOutcome::ConnectionLost;
        }

        if let Some(outcome) = &reply.outcome {
            info!(%outcome, "game finished");
        }
        DispatchOutcome::Replied(reply)
    }
}

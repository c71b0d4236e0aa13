//! The session registry.
//!
//! The registry is the single source of truth for which connections are live
//! and which game each one is playing. Every operation takes the registry's
//! lock for its whole duration and never awaits while holding it, so
//! connection tasks registering and removing sessions cannot race the
//! dispatcher's lookups and mutations.
//!
//! A session is registered as pending: its identity is reserved but it cannot
//! be addressed until [`SessionRegistry::activate`] is called, which the
//! connection task does once the welcome has been written.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use knightwire_core::connection::Connection;
use knightwire_core::error::RelayError;
use knightwire_core::rng::DeterministicRng;
use knightwire_core::rules::RulesEngine;
use tracing::{debug, info};

use crate::domain::identity::IdentityGenerator;
use crate::domain::session::{ConnectionId, Session, SessionSnapshot};

/// Sessions indexed by connection and by identity.
#[derive(Debug, Default)]
struct SessionTable {
    by_connection: HashMap<ConnectionId, Session>,
    by_identity: HashMap<String, ConnectionId>,
    pending: HashSet<ConnectionId>,
}

impl SessionTable {
    fn contains_identity(&self, identity: &str) -> bool {
        self.by_identity.contains_key(identity)
    }

    fn insert_pending(&mut self, session: Session) {
        self.by_identity
            .insert(session.identity().to_owned(), session.connection_id());
        self.pending.insert(session.connection_id());
        self.by_connection.insert(session.connection_id(), session);
    }

    fn activate(&mut self, connection_id: ConnectionId) -> bool {
        self.pending.remove(&connection_id)
    }

    fn remove(&mut self, connection_id: ConnectionId) -> Option<Session> {
        let session = self.by_connection.remove(&connection_id)?;
        self.by_identity.remove(session.identity());
        self.pending.remove(&connection_id);
        Some(session)
    }

    /// The active session with `identity`; pending sessions are skipped.
    fn get_active_mut(&mut self, identity: &str) -> Option<&mut Session> {
        let connection_id = self.by_identity.get(identity)?;
        if self.pending.contains(connection_id) {
            return None;
        }
        self.by_connection.get_mut(connection_id)
    }
}

#[derive(Debug)]
struct RegistryState {
    sessions: SessionTable,
    identities: IdentityGenerator,
}

/// Thread-safe mapping from connection to live session.
pub struct SessionRegistry {
    engine: Arc<dyn RulesEngine>,
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    /// Creates an empty registry. `rng` seeds identity generation for the
    /// registry's whole lifetime.
    #[must_use]
    pub fn new(engine: Arc<dyn RulesEngine>, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            engine,
            state: Mutex::new(RegistryState {
                sessions: SessionTable::default(),
                identities: IdentityGenerator::new(rng),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Every critical section leaves the table consistent before it can
        // panic, so a poisoned lock is still safe to use.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates and registers a pending session for a new connection.
    ///
    /// The identity is unique among live sessions; generation and insertion
    /// happen under the same lock. The session stays unaddressable until
    /// [`activate`](Self::activate) is called.
    pub fn register(&self, connection: Arc<dyn Connection>) -> SessionSnapshot {
        let game = self.engine.new_game();
        let mut guard = self.lock();
        let RegistryState {
            sessions,
            identities,
        } = &mut *guard;

        let identity = identities.generate(|candidate| sessions.contains_identity(candidate));
        let session = Session::new(ConnectionId::new(), identity, connection, game);
        let snapshot = session.snapshot();
        sessions.insert_pending(session);
        let live = sessions.by_connection.len();
        drop(guard);

        info!(
            identity = %snapshot.identity,
            connection_id = %snapshot.connection_id,
            live,
            "session registered"
        );
        snapshot
    }

    /// Makes a pending session addressable.
    ///
    /// Returns `false` if the session is unknown or already active.
    pub fn activate(&self, connection_id: ConnectionId) -> bool {
        let activated = self.lock().sessions.activate(connection_id);
        if activated {
            debug!(%connection_id, "session activated");
        }
        activated
    }

    /// Looks up an active session by identity.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::SessionNotFound` if no active session has that
    /// identity.
    pub fn lookup(&self, identity: &str) -> Result<SessionSnapshot, RelayError> {
        self.update(identity, |session| session.snapshot())
    }

    /// Runs `f` against the active session with `identity` while holding the
    /// lock.
    ///
    /// `f` must not block; it is meant for synchronous rules-engine calls.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::SessionNotFound` if no active session has that
    /// identity. Pending sessions are reported the same way.
    pub fn update<T>(
        &self,
        identity: &str,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, RelayError> {
        let mut guard = self.lock();
        let session = guard
            .sessions
            .get_active_mut(identity)
            .ok_or_else(|| RelayError::SessionNotFound(identity.to_owned()))?;
        Ok(f(session))
    }

    /// Removes the session owned by `connection_id`.
    ///
    /// Idempotent: returns `false` if the session was already gone.
    pub fn remove(&self, connection_id: ConnectionId) -> bool {
        let removed = self.lock().sessions.remove(connection_id);
        match removed {
            Some(session) => {
                info!(
                    identity = %session.identity(),
                    %connection_id,
                    "session removed"
                );
                true
            }
            None => {
                debug!(%connection_id, "session already removed");
                false
            }
        }
    }

    /// Whether a live session, pending or active, has `identity`.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.lock().sessions.contains_identity(identity)
    }

    /// Identities of all active sessions, sorted.
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        let guard = self.lock();
        let sessions = &guard.sessions;
        let mut identities: Vec<String> = sessions
            .by_identity
            .iter()
            .filter(|(_, connection_id)| !sessions.pending.contains(connection_id))
            .map(|(identity, _)| identity.clone())
            .collect();
        drop(guard);
        identities.sort();
        identities
    }

    /// Number of live sessions, pending included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().sessions.by_connection.len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

//! Test connections — in-memory `Connection` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use knightwire_core::connection::Connection;
use knightwire_core::error::RelayError;
use knightwire_core::protocol::StateMessage;

/// A connection that records every message sent on it and always succeeds
/// until closed. Sends after `close` fail like a dropped socket would.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    sent: Mutex<Vec<StateMessage>>,
    closed: AtomicBool,
}

impl RecordingConnection {
    /// Create an open connection with no recorded messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all messages sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<StateMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn send(&self, message: &StateMessage) -> Result<(), RelayError> {
        if self.is_closed() {
            return Err(RelayError::Transport("connection closed".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A connection whose every send fails with a transport error. Useful for
/// testing teardown paths.
#[derive(Debug, Default)]
pub struct FailingConnection {
    closed: AtomicBool,
}

impl FailingConnection {
    /// Create a new failing connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for FailingConnection {
    async fn send(&self, _message: &StateMessage) -> Result<(), RelayError> {
        Err(RelayError::Transport("connection reset by peer".into()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

//! Outbound half of a client connection.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::protocol::StateMessage;

/// Write side of one client connection.
///
/// Implementations serialize concurrent writers so frames never interleave.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Sends one state message as a single frame.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Transport` if the frame could not be written,
    /// typically because the peer is gone.
    async fn send(&self, message: &StateMessage) -> Result<(), RelayError>;

    /// Closes the connection. Closing twice is a no-op.
    async fn close(&self);
}

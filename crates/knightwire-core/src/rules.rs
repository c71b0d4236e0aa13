//! Rules engine abstraction.
//!
//! The relay never interprets moves itself. It hands notation to a [`Game`]
//! and trusts the engine to reject anything illegal, including every move
//! attempted after the game has ended.

use crate::error::RelayError;

/// Factory for fresh games.
pub trait RulesEngine: Send + Sync {
    /// Returns a game in its starting position.
    fn new_game(&self) -> Box<dyn Game>;
}

/// One game position owned by a session.
pub trait Game: Send {
    /// Applies a move given in the engine's notation.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::IllegalMove` if the notation does not parse or the
    /// move is not legal in the current position. The position is unchanged
    /// on error.
    fn play(&mut self, notation: &str) -> Result<(), RelayError>;

    /// Renders the current position as a deterministic text diagram.
    fn render(&self) -> String;

    /// Returns the result string if the position is terminal.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::RulesEngine` if the engine cannot evaluate the
    /// position.
    fn outcome(&self) -> Result<Option<String>, RelayError>;
}

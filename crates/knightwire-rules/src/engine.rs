//! `RulesEngine` implementation for standard chess.

use knightwire_core::rules::{Game, RulesEngine};

use crate::domain::game::ChessGame;

/// Rules engine that starts every session from the standard chess position.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessEngine;

impl RulesEngine for ChessEngine {
    fn new_game(&self) -> Box<dyn Game> {
        Box::new(ChessGame::new())
    }
}

//! Chess domain: game state and board rendering.

pub mod board;
pub mod game;

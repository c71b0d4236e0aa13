//! Knightwire — chess rules engine.
//!
//! Implements the `RulesEngine` and `Game` traits from `knightwire-core` on
//! top of `shakmaty`. Moves are Standard Algebraic Notation; positions render
//! as a Unicode board diagram.

pub mod domain;
pub mod engine;

pub use engine::ChessEngine;

//! Shared test doubles for the Knightwire session relay.

mod connection;
mod engine;
mod rng;

pub use connection::{FailingConnection, RecordingConnection};
pub use engine::{OutcomeScript, ScriptedEngine, ScriptedGame};
pub use rng::{MockRng, SequenceRng};

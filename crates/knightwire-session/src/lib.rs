//! Knightwire — Session relay.
//!
//! Responsible for per-connection sessions, the registry that tracks them,
//! and the single dispatcher that applies inbound moves and replies to the
//! addressed session.

pub mod application;
pub mod domain;

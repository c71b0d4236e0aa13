//! Knightwire Core — shared abstractions for the session relay.
//!
//! This crate defines the traits, wire types, and error taxonomy that the
//! rules engine, the session layer, and the server depend on. It contains no
//! infrastructure code.

pub mod connection;
pub mod error;
pub mod protocol;
pub mod rng;
pub mod rules;

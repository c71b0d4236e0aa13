//! Session domain types.

pub mod identity;
pub mod session;

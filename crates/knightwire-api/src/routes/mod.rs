//! Route modules.

pub mod health;
pub mod play;
pub mod sessions;

//! Session registry and move dispatch.

pub mod dispatcher;
pub mod registry;

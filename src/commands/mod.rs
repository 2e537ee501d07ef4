//! Commands
//!
//! IPC entry points called from the UI layer. Each returns a
//! `CommandResponse` wrapped in `Result<_, String>`.

pub mod assistant_types;

pub use assistant_types::*;

//! poelookup library
//!
//! Price and wiki lookups for Path of Exile items, exposed as chat command
//! handlers. The modules are public for use by the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod session;

pub use commands::{Command, CommandError, CommandKind};
pub use session::Session;

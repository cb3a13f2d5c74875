//! The `mcup` command line
//!
//! Everything except argument parsing and process exit lives here so the
//! invocation layer can be driven from tests.

pub mod commands;
pub mod context;
pub mod execute;

pub use commands::{Commands, UpdateArgs};
pub use context::Context;

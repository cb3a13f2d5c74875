//! Core domain types, errors, and constants for the `mcup` application.
//!
//! This crate establishes the data structures and error handling shared by
//! every other crate in the workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the flat `Error` enum, its `ErrorKind`, the stable
//!   process exit codes, and the `Result` type alias.
//! - **`types`**: Build metadata, version intents, download targets and backup
//!   jobs as they flow between the resolver, the fetcher and the backup
//!   orchestrator.
//! - **`constants`**: API endpoints, cache lifetimes and archive naming.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, ErrorKind, Result},
    types::*,
};

//! Shared utilities for mcup
//!
//! This crate provides the filesystem, hashing, logging and transport
//! plumbing used throughout the mcup workspace.

pub mod atomic_file;
pub mod cleanup;
pub mod hashing;
pub mod network;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use cleanup::*;
pub use hashing::*;
pub use network::*;
pub use xdg::*;

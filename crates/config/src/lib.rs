//! Configuration parsing and validation for mcup
//!
//! This crate reads the YAML file describing the managed servers and turns
//! each entry into validated settings the rest of the tool can act on.

pub mod config;
pub mod loader;

pub use config::*;
pub use loader::*;

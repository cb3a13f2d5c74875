//! Cache system for mcup
//!
//! This crate provides the two layers every remote lookup goes through:
//! - `store`: a single-file, TTL-aware key/value cache
//! - `metadata`: the build metadata API client that reads through that cache

pub mod entry;
pub mod metadata;
pub mod store;

pub use entry::CacheEntry;
pub use metadata::MetadataClient;
pub use store::CacheStore;

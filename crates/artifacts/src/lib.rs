//! Artifact acquisition for mcup
//!
//! Turns "give me the stable Paper build" into a verified jar on disk:
//!
//! - `project`: the built-in catalogue of downloadable projects
//! - `resolver`: latest / stable / specific version strategies
//! - `fetcher`: canonical file naming and hash-verified conditional downloads
//! - `pipeline`: resolve, describe and fetch in one call

pub mod fetcher;
pub mod pipeline;
pub mod project;
pub mod resolver;

pub use fetcher::{versioned_file_name, Acquired, ArtifactFetcher};
pub use pipeline::Pipeline;
pub use project::{DownloadSegment, Project};
pub use resolver::{strategy_for, VersionResolver};

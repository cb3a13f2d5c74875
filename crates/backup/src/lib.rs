//! Backups of a running server's data directory
//!
//! A backup run pauses the server's own saving through its terminal session,
//! writes `mcbackup_<dir>_<YYYY-MM-DD-HH>.tar.gz`, resumes saving, and then
//! prunes archives of the same directory that are past their retention.
//!
//! ## Key Components
//!
//! - **`session`**: the [`SessionControl`] seam and its `screen` implementation
//! - **`archive`**: exclusion-filtered gzip tarballs of a directory's top level
//! - **`retention`**: age-based pruning scoped to one source directory
//! - **`orchestrator`**: the run itself, with resume guaranteed on every exit path

pub mod archive;
pub mod orchestrator;
pub mod retention;
pub mod session;

pub use archive::create_archive;
pub use orchestrator::{archive_path, BackupOrchestrator, BackupOutcome, BackupState};
pub use retention::sweep;
pub use session::{ScreenSession, SessionControl};

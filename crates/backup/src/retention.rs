//! Age-based pruning of backup archives
//!
//! Only files named `mcbackup_*.tar.gz` that also contain the
//! `mcbackup_<dir>_` fragment of the directory being backed up are ever
//! considered, so several servers can share one backup folder. The match is
//! a substring test: a directory named `mc` also claims `mcbackup_mc_...`
//! fragments that appear inside longer names.

use mcup_core::{Error, Result, ARCHIVE_PREFIX, ARCHIVE_SUFFIX};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Delete archives of `source_base_name` last modified more than
/// `retention_days` before `now`, returning what was deleted
///
/// A file that cannot be inspected or removed is logged and skipped.
pub fn sweep(
    archive_directory: &Path,
    source_base_name: &str,
    retention_days: u32,
    now: SystemTime,
) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(archive_directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::file_system(archive_directory, "list backups", e)),
    };

    let max_age = Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY);
    let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
    let fragment = format!("{ARCHIVE_PREFIX}{source_base_name}_");

    let mut deleted = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable backup directory entry");
                continue;
            }
        };
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        if !name.starts_with(ARCHIVE_PREFIX) || !name.ends_with(ARCHIVE_SUFFIX) {
            continue;
        }
        if !source_base_name.is_empty() && !name.contains(&fragment) {
            continue;
        }

        match prune(&path, cutoff) {
            Ok(true) => {
                tracing::info!(path = %path.display(), "removed expired backup");
                deleted.push(path);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not check or delete backup");
            }
        }
    }

    Ok(deleted)
}

fn prune(path: &Path, cutoff: SystemTime) -> io::Result<bool> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() || metadata.modified()? >= cutoff {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

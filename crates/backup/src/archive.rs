//! Gzip tarballs of a directory's top-level entries

use flate2::write::GzEncoder;
use flate2::Compression;
use globset::{Glob, GlobSet, GlobSetBuilder};
use mcup_core::{Error, Result};
use mcup_utils::WorkingDirGuard;
use std::env;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Archive every top-level entry of `source_directory` not matched by
/// `exclude_globs` into `archive_path`
///
/// Entries are stored relative to the source directory, recursively, with
/// symlinks kept as links. The process working directory is the source
/// directory while the archive is written and is restored before returning.
/// A failed archive is removed rather than left half-written.
pub fn create_archive(
    source_directory: &Path,
    archive_path: &Path,
    exclude_globs: &[String],
) -> Result<()> {
    let excludes = build_excludes(exclude_globs, archive_path)?;
    let archive_path = absolute(archive_path)?;

    let result = write_archive(source_directory, &archive_path, &excludes);
    if result.is_err() && archive_path.exists() {
        if let Err(e) = fs::remove_file(&archive_path) {
            tracing::warn!(path = %archive_path.display(), error = %e, "could not remove partial archive");
        }
    }
    result
}

fn write_archive(source_directory: &Path, archive_path: &Path, excludes: &GlobSet) -> Result<()> {
    let archive_error = |e: io::Error| Error::archive(archive_path, e);

    let _cwd = WorkingDirGuard::enter(source_directory).map_err(|e| Error::Archive {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
        source: None,
    })?;

    let mut names = Vec::new();
    for entry in fs::read_dir(".").map_err(archive_error)? {
        let entry = entry.map_err(archive_error)?;
        let name = entry.file_name();
        if excludes.is_match(Path::new(&name)) {
            tracing::debug!(entry = %name.to_string_lossy(), "excluded from backup");
            continue;
        }
        names.push(PathBuf::from(name));
    }
    names.sort();

    let file = File::create(archive_path).map_err(archive_error)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    for name in &names {
        let metadata = fs::symlink_metadata(name).map_err(archive_error)?;
        if metadata.is_dir() {
            builder.append_dir_all(name, name).map_err(archive_error)?;
        } else {
            builder.append_path_with_name(name, name).map_err(archive_error)?;
        }
    }

    let encoder = builder.into_inner().map_err(archive_error)?;
    encoder.finish().map_err(archive_error)?.sync_all().map_err(archive_error)?;

    tracing::debug!(path = %archive_path.display(), entries = names.len(), "archive written");
    Ok(())
}

fn build_excludes(patterns: &[String], archive_path: &Path) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::Archive {
            path: archive_path.to_path_buf(),
            message: format!("invalid exclude pattern '{pattern}': {e}"),
            source: None,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::Archive {
        path: archive_path.to_path_buf(),
        message: format!("failed to build exclude patterns: {e}"),
        source: None,
    })
}

// The working directory changes while writing, so anchor the output first
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir()
        .map_err(|e| Error::file_system(PathBuf::from("."), "read working directory", e))?;
    Ok(cwd.join(path))
}

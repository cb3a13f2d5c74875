use mcup_core::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// RAII guard for the process working directory
///
/// The working directory is shared by the whole process, so whoever changes
/// it must put it back before returning control.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    /// Change into `dir`, remembering where we came from
    pub fn enter(dir: &Path) -> Result<Self> {
        let original = env::current_dir()
            .map_err(|e| Error::file_system(PathBuf::from("."), "read working directory", e))?;

        env::set_current_dir(dir)
            .map_err(|e| Error::file_system(dir.to_path_buf(), "change working directory", e))?;

        tracing::debug!(from = %original.display(), to = %dir.display(), "entered directory");

        Ok(Self { original })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            tracing::error!(
                "Failed to restore working directory {}: {}",
                self.original.display(),
                e
            );
        } else {
            tracing::debug!(to = %self.original.display(), "restored working directory");
        }
    }
}

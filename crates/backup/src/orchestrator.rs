//! One backup run as a small state machine
//!
//! `IDLE -> SAVE_PAUSED -> ARCHIVING -> SAVE_RESUMED -> RETENTION_SWEEP -> DONE`
//!
//! Pausing and resuming go through the server's session and are best effort:
//! a server that cannot be reached is logged and the run carries on. Once a
//! pause has been attempted, the resume is attempted on every exit path.

use crate::archive::create_archive;
use crate::retention::sweep;
use crate::session::SessionControl;
use chrono::{DateTime, Local};
use mcup_core::{
    BackupJob, Error, ErrorKind, Result, ARCHIVE_HOUR_FORMAT, ARCHIVE_PREFIX, ARCHIVE_SUFFIX,
};
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    Idle,
    SavePaused,
    Archiving,
    SaveResumed,
    RetentionSweep,
    Done,
}

impl BackupState {
    pub fn as_str(self) -> &'static str {
        match self {
            BackupState::Idle => "IDLE",
            BackupState::SavePaused => "SAVE_PAUSED",
            BackupState::Archiving => "ARCHIVING",
            BackupState::SaveResumed => "SAVE_RESUMED",
            BackupState::RetentionSweep => "RETENTION_SWEEP",
            BackupState::Done => "DONE",
        }
    }
}

/// Result of an hourly backup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Created(PathBuf),
    /// This hour's archive already exists; nothing was touched
    AlreadyExists(PathBuf),
}

/// `{archive_directory}/mcbackup_{dir}_{YYYY-MM-DD-HH}.tar.gz`
pub fn archive_path(job: &BackupJob, now: DateTime<Local>) -> PathBuf {
    job.archive_directory.join(format!(
        "{ARCHIVE_PREFIX}{}_{}{ARCHIVE_SUFFIX}",
        job.source_base_name(),
        now.format(ARCHIVE_HOUR_FORMAT)
    ))
}

pub struct BackupOrchestrator<'s> {
    session: &'s dyn SessionControl,
}

impl<'s> BackupOrchestrator<'s> {
    pub fn new(session: &'s dyn SessionControl) -> Self {
        Self { session }
    }

    /// Back up at most once per hour: if this hour's archive exists the run
    /// does not start at all
    pub fn run_hourly(&self, job: &BackupJob, now: DateTime<Local>) -> Result<BackupOutcome> {
        let path = archive_path(job, now);
        if path.exists() {
            tracing::info!(path = %path.display(), "backup for this hour already exists");
            return Ok(BackupOutcome::AlreadyExists(path));
        }
        self.run(job, now).map(BackupOutcome::Created)
    }

    /// Perform one backup run and return the archive written
    pub fn run(&self, job: &BackupJob, now: DateTime<Local>) -> Result<PathBuf> {
        let path = archive_path(job, now);
        transition(BackupState::Idle, job);

        fs::create_dir_all(&job.archive_directory).map_err(|e| {
            Error::file_system(&job.archive_directory, "create backup directory", e)
        })?;

        {
            let _resume = self.pause(job, now);

            transition(BackupState::Archiving, job);
            create_archive(&job.source_directory, &path, &job.exclude_globs)?;
            tracing::info!(path = %path.display(), "backup archive created");
        }

        transition(BackupState::RetentionSweep, job);
        let removed = sweep(
            &job.archive_directory,
            &job.source_base_name(),
            job.retention_days,
            SystemTime::from(now),
        )?;
        tracing::debug!(removed = removed.len(), "retention sweep finished");

        transition(BackupState::Done, job);
        Ok(path)
    }

    fn pause<'a>(&'a self, job: &'a BackupJob, now: DateTime<Local>) -> ResumeGuard<'a> {
        let notice = format!(
            "say Backup starting at {}. World no longer saving!...",
            now.format(MESSAGE_TIME_FORMAT)
        );
        for line in [notice.as_str(), "save-off", "save-all"] {
            if !notify(self.session, &job.session_name, line) {
                break;
            }
        }
        transition(BackupState::SavePaused, job);

        ResumeGuard {
            session: self.session,
            job,
        }
    }
}

/// Turns saving back on when dropped
struct ResumeGuard<'a> {
    session: &'a dyn SessionControl,
    job: &'a BackupJob,
}

impl Drop for ResumeGuard<'_> {
    fn drop(&mut self) {
        let notice = format!(
            "say Backup complete at {}! World now saving.",
            Local::now().format(MESSAGE_TIME_FORMAT)
        );
        for line in ["save-on", notice.as_str()] {
            if !notify(self.session, &self.job.session_name, line) {
                break;
            }
        }
        transition(BackupState::SaveResumed, self.job);
    }
}

// Session failures never fail the backup. Returns whether it is worth
// sending further lines.
fn notify(session: &dyn SessionControl, name: &str, line: &str) -> bool {
    match session.send_line(name, line) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::ControlToolMissing => {
            tracing::warn!(error = %e, "cannot manage server saving");
            false
        }
        Err(e) => {
            tracing::warn!(session = name, error = %e, "server did not take command '{line}'");
            true
        }
    }
}

fn transition(state: BackupState, job: &BackupJob) {
    tracing::info!(
        state = state.as_str(),
        source = %job.source_directory.display(),
        "backup state"
    );
}

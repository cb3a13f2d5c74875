use crate::context::Context;
use chrono::Local;
use mcup_backup::{BackupOrchestrator, BackupOutcome, ScreenSession, SessionControl};
use mcup_config::ServerConfig;
use mcup_core::Result;

pub fn execute(context: &Context, server: &str) -> Result<()> {
    let server = context.config()?.server(server)?;
    backup_server(&server, &ScreenSession::new())?;
    Ok(())
}

/// Hourly backup of `server`'s directory through `session`
pub fn backup_server(server: &ServerConfig, session: &dyn SessionControl) -> Result<BackupOutcome> {
    let job = server.backup_job();
    tracing::info!(server = %server.name, source = %job.source_directory.display(), "backing up");
    BackupOrchestrator::new(session).run_hourly(&job, Local::now())
}

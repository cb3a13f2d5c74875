//! The update command and the invocation layer around the acquisition
//! pipeline
//!
//! Every project is attempted even when an earlier one fails; the first
//! failure is what the command finally reports.

use super::backup::backup_server;
use super::UpdateArgs;
use crate::context::Context;
use mcup_artifacts::{Acquired, Pipeline, Project};
use mcup_backup::{BackupOutcome, ScreenSession, SessionControl};
use mcup_config::ServerConfig;
use mcup_core::{Error, Result, VersionIntent, DEFAULT_DOWNLOAD_DIRECTORY};
use mcup_utils::{HttpTransport, Transport};
use std::path::PathBuf;

/// What happened to one project
#[derive(Debug)]
pub struct ProjectOutcome {
    pub project: &'static str,
    pub result: Result<Acquired>,
}

#[derive(Debug, Default)]
pub struct UpdateReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl UpdateReport {
    /// Whether any project wrote a new file
    pub fn any_new(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(&o.result, Ok(acquired) if acquired.is_new()))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProjectOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// The first failure, if any
    pub fn into_result(self) -> Result<()> {
        match self.outcomes.into_iter().find_map(|o| o.result.err()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Projects to acquire and the version each should track
///
/// Paper follows `--paper-version`, then the server's `paper_version`, then
/// the stable channel.
pub fn plan(
    paper_version: Option<&str>,
    server: Option<&ServerConfig>,
) -> Result<Vec<(Project, VersionIntent)>> {
    let paper_intent = match paper_version {
        Some(version) => Some(VersionIntent::parse(Some(version))),
        None => server.and_then(ServerConfig::paper_intent),
    };

    let mut plan = Vec::with_capacity(Project::ALL.len());
    for project in Project::ALL {
        let intent = match (&paper_intent, project == Project::PAPER) {
            (Some(intent), true) => intent.clone(),
            _ => project.default_intent(),
        };
        if let VersionIntent::Specific(version) = &intent {
            if version.trim().is_empty() {
                return Err(Error::InvalidVersion {
                    message: format!("empty version for {}", project.name),
                });
            }
        }
        plan.push((project, intent));
    }
    Ok(plan)
}

/// Run the pipeline for every planned project, containing each failure
pub fn update_artifacts(pipeline: &Pipeline<'_>, plan: &[(Project, VersionIntent)]) -> UpdateReport {
    let mut report = UpdateReport::default();
    for (project, intent) in plan {
        let result = pipeline.acquire(project, intent);
        match &result {
            Ok(Acquired::Downloaded(path)) => {
                tracing::info!(project = project.name, path = %path.display(), "new build downloaded");
            }
            Ok(Acquired::AlreadyPresent(path)) => {
                tracing::info!(project = project.name, path = %path.display(), "up to date");
            }
            Err(e) => {
                tracing::error!(
                    project = project.name,
                    directory = %pipeline.download_directory().display(),
                    kind = %e.kind(),
                    "error downloading {}: {e}",
                    project.name
                );
            }
        }
        report.outcomes.push(ProjectOutcome {
            project: project.name,
            result,
        });
    }
    report
}

/// Download, then back up the server if anything changed
pub fn update(
    args: &UpdateArgs,
    server: Option<&ServerConfig>,
    pipeline: &Pipeline<'_>,
    session: &dyn SessionControl,
) -> Result<Option<BackupOutcome>> {
    let plan = plan(args.paper_version.as_deref(), server)?;
    let report = update_artifacts(pipeline, &plan);

    let backup = match server {
        Some(server) if report.any_new() => Some(backup_server(server, session)?),
        Some(_) => {
            tracing::info!("no new builds, skipping backup");
            None
        }
        None => None,
    };

    report.into_result()?;
    Ok(backup)
}

pub fn execute(args: UpdateArgs, context: &Context) -> Result<()> {
    let (config, server) = match &args.server {
        Some(name) => {
            let config = context.config()?;
            let server = config.server(name)?;
            (config, Some(server))
        }
        None => (context.optional_config()?, None),
    };

    let download_directory = server
        .as_ref()
        .map_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIRECTORY), |s| s.download_directory.clone());

    let store = context.cache_store(&config);
    let transport = HttpTransport::new()?;
    let transport: &dyn Transport = &transport;
    let pipeline = Pipeline::new(&store, transport, download_directory);

    update(&args, server.as_ref(), &pipeline, &ScreenSession::new())?;
    Ok(())
}

//! Resolve, describe, fetch

use crate::fetcher::{Acquired, ArtifactFetcher};
use crate::project::Project;
use crate::resolver::strategy_for;
use mcup_cache::{CacheStore, MetadataClient};
use mcup_core::{Error, Result, VersionIntent};
use mcup_utils::Transport;
use std::path::{Path, PathBuf};

/// Everything a run needs to acquire artifacts into one directory
pub struct Pipeline<'a> {
    store: &'a CacheStore,
    transport: &'a dyn Transport,
    download_directory: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a CacheStore,
        transport: &'a dyn Transport,
        download_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            transport,
            download_directory: download_directory.into(),
        }
    }

    pub fn download_directory(&self) -> &Path {
        &self.download_directory
    }

    /// Bring the build `intent` selects for `project` into the download directory
    pub fn acquire(&self, project: &Project, intent: &VersionIntent) -> Result<Acquired> {
        let client = MetadataClient::new(self.store, self.transport, project.api_base, project.name);

        let resolved = strategy_for(intent, &client)?.resolve()?;
        let build = match resolved.build {
            Some(build) => build,
            None => client
                .builds(&resolved.version)?
                .last()
                .map(|summary| summary.build)
                .ok_or_else(|| Error::NoBuildsFound {
                    project: project.name.to_string(),
                    version: resolved.version.clone(),
                })?,
        };
        tracing::info!(
            project = project.name,
            %intent,
            version = %resolved.version,
            build,
            "resolved build"
        );

        let descriptor = client.build(&resolved.version, build)?;
        let target = ArtifactFetcher::target(project, &client, &descriptor, &self.download_directory)?;
        ArtifactFetcher::new(self.transport).fetch(&target)
    }
}

//! Version resolution strategies
//!
//! `Latest` and `Specific` are projections over lists the metadata client
//! already has. `Stable` has to discover stability by walking channel flags,
//! newest version first, newest build first.

use mcup_cache::MetadataClient;
use mcup_core::{Error, Result, ResolvedVersion, VersionIntent};

/// Turns an intent into a concrete version and, where known, a build
pub trait VersionResolver {
    fn resolve(&self) -> Result<ResolvedVersion>;
}

/// Newest version, newest build
pub struct LatestResolver<'c> {
    client: &'c MetadataClient<'c>,
}

impl<'c> LatestResolver<'c> {
    pub fn new(client: &'c MetadataClient<'c>) -> Self {
        Self { client }
    }
}

impl VersionResolver for LatestResolver<'_> {
    fn resolve(&self) -> Result<ResolvedVersion> {
        let project = self.client.project();
        let versions = self.client.versions()?;
        let version = versions.last().ok_or_else(|| Error::NoVersionsFound {
            project: project.to_string(),
        })?;

        let builds = self.client.builds(version)?;
        let build = builds.last().ok_or_else(|| Error::NoBuildsFound {
            project: project.to_string(),
            version: version.clone(),
        })?;

        tracing::debug!(project, version, build = build.build, "resolved latest build");
        Ok(ResolvedVersion::new(version.clone(), Some(build.build)))
    }
}

/// Newest build on the stable channel of the newest version that has one
pub struct StableResolver<'c> {
    client: &'c MetadataClient<'c>,
}

impl<'c> StableResolver<'c> {
    pub fn new(client: &'c MetadataClient<'c>) -> Self {
        Self { client }
    }
}

impl VersionResolver for StableResolver<'_> {
    fn resolve(&self) -> Result<ResolvedVersion> {
        let project = self.client.project();
        let versions = self.client.versions()?;
        if versions.is_empty() {
            return Err(Error::NoVersionsFound {
                project: project.to_string(),
            });
        }

        for version in versions.iter().rev() {
            let builds = self.client.builds(version)?;
            if builds.is_empty() {
                tracing::debug!(project, version, "no builds, trying older version");
                continue;
            }

            if let Some(stable) = builds.iter().rev().find(|build| build.is_stable()) {
                tracing::debug!(project, version, build = stable.build, "resolved stable build");
                return Ok(ResolvedVersion::new(version.clone(), Some(stable.build)));
            }
        }

        Err(Error::NoStableBuildFound {
            project: project.to_string(),
        })
    }
}

/// A version named by the user; its build is left for the caller to pick
#[derive(Debug)]
pub struct SpecificResolver {
    version: String,
}

impl SpecificResolver {
    pub fn new(version: impl Into<String>) -> Result<Self> {
        let version = version.into().trim().to_string();
        if version.is_empty() {
            return Err(Error::InvalidVersion {
                message: "a specific version must not be empty".to_string(),
            });
        }
        Ok(Self { version })
    }
}

impl VersionResolver for SpecificResolver {
    fn resolve(&self) -> Result<ResolvedVersion> {
        Ok(ResolvedVersion::new(self.version.clone(), None))
    }
}

/// Pick the strategy for `intent`
pub fn strategy_for<'c>(
    intent: &VersionIntent,
    client: &'c MetadataClient<'c>,
) -> Result<Box<dyn VersionResolver + 'c>> {
    Ok(match intent {
        VersionIntent::Latest => Box::new(LatestResolver::new(client)),
        VersionIntent::Stable => Box::new(StableResolver::new(client)),
        VersionIntent::Specific(version) => Box::new(SpecificResolver::new(version.clone())?),
    })
}

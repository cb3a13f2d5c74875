use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::constants::STABLE_CHANNEL;

/// One downloadable file of a build, as published by the metadata API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    #[serde(rename = "name", default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Full metadata of one published build
///
/// Fields are optional because the upstream APIs do not promise them; the
/// artifact fetcher refuses to act on a descriptor with holes in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub build: Option<u64>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub downloads: BTreeMap<String, DownloadEntry>,
}

impl BuildDescriptor {
    /// Whether this build was published on the stable channel
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.channel == STABLE_CHANNEL
    }
}

/// An entry of a version's build list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub build: u64,
    #[serde(default)]
    pub channel: String,
}

impl BuildSummary {
    #[must_use]
    pub fn new(build: u64, channel: impl Into<String>) -> Self {
        Self {
            build,
            channel: channel.into(),
        }
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.channel == STABLE_CHANNEL
    }
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionIntent {
    Latest,
    Stable,
    Specific(String),
}

impl VersionIntent {
    /// Interpret user input: `latest`, `stable` (also the default when
    /// nothing is given), or anything else as an explicit version.
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("stable") => VersionIntent::Stable,
            Some("latest") => VersionIntent::Latest,
            Some(version) => VersionIntent::Specific(version.to_string()),
        }
    }
}

impl fmt::Display for VersionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionIntent::Latest => f.write_str("latest"),
            VersionIntent::Stable => f.write_str("stable"),
            VersionIntent::Specific(version) => write!(f, "{version}"),
        }
    }
}

/// Outcome of version resolution; `build` is `None` when the caller still
/// has to pick a build of `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub build: Option<u64>,
}

impl ResolvedVersion {
    #[must_use]
    pub fn new(version: impl Into<String>, build: Option<u64>) -> Self {
        Self {
            version: version.into(),
            build,
        }
    }
}

/// A fully resolved download instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTarget {
    pub source_url: String,
    pub destination: PathBuf,
    pub expected_sha256: String,
    pub label: String,
}

/// Everything needed for one backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupJob {
    pub source_directory: PathBuf,
    pub archive_directory: PathBuf,
    pub session_name: String,
    pub exclude_globs: Vec<String>,
    pub retention_days: u32,
}

impl BackupJob {
    /// Last component of the source directory, ignoring trailing separators
    #[must_use]
    pub fn source_base_name(&self) -> String {
        base_name(&self.source_directory)
    }
}

fn base_name(path: &Path) -> String {
    match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        _ => String::new(),
    }
}

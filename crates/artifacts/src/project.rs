use mcup_core::{VersionIntent, GEYSER_API_BASE, PAPER_API_BASE};

/// Which path segment names the artifact in a download URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadSegment {
    /// The file name published in the build descriptor (Paper)
    FileName,
    /// The download key itself (GeyserMC)
    DownloadKey,
}

/// A downloadable project and how its API publishes artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub name: &'static str,
    pub api_base: &'static str,
    /// Key under `downloads` in the build descriptor
    pub download_key: &'static str,
    pub segment: DownloadSegment,
    /// Set for projects that publish the same literal file name every build
    pub filename_pattern: Option<&'static str>,
    pub stable_by_default: bool,
}

impl Project {
    pub const PAPER: Project = Project {
        name: "paper",
        api_base: PAPER_API_BASE,
        download_key: "application",
        segment: DownloadSegment::FileName,
        filename_pattern: None,
        stable_by_default: true,
    };

    pub const GEYSER: Project = Project {
        name: "geyser",
        api_base: GEYSER_API_BASE,
        download_key: "spigot",
        segment: DownloadSegment::DownloadKey,
        filename_pattern: Some("Geyser-Spigot-*-SNAPSHOT.jar"),
        stable_by_default: false,
    };

    pub const FLOODGATE: Project = Project {
        name: "floodgate",
        api_base: GEYSER_API_BASE,
        download_key: "spigot",
        segment: DownloadSegment::DownloadKey,
        filename_pattern: Some("Floodgate-Spigot-*-SNAPSHOT.jar"),
        stable_by_default: false,
    };

    /// Every built-in project, in download order
    pub const ALL: [Project; 3] = [Project::PAPER, Project::GEYSER, Project::FLOODGATE];

    /// Intent used when the user did not ask for anything specific
    pub fn default_intent(&self) -> VersionIntent {
        if self.stable_by_default {
            VersionIntent::Stable
        } else {
            VersionIntent::Latest
        }
    }
}

//! Configuration types

use mcup_core::{BackupJob, Error, Result, VersionIntent, DEFAULT_RETENTION_DAYS, DEFAULT_SCREEN_NAME};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the metadata cache lives; defaults to the XDG cache directory
    pub cache_file: Option<PathBuf>,
    pub servers: BTreeMap<String, RawServerConfig>,
}

/// A server entry exactly as written; see [`Config::server`] for validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawServerConfig {
    pub download_directory: Option<String>,
    pub server_directory: Option<String>,
    pub backup_directory: Option<String>,
    pub screen_name: Option<String>,
    pub backup_exclude: Vec<String>,
    pub retention_days: Option<u32>,
    pub paper_version: Option<String>,
}

/// A validated server entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub download_directory: PathBuf,
    pub server_directory: PathBuf,
    pub backup_directory: PathBuf,
    pub screen_name: String,
    pub backup_exclude: Vec<String>,
    pub retention_days: u32,
    pub paper_version: Option<String>,
}

impl Config {
    /// Look up and validate the server called `name`
    pub fn server(&self, name: &str) -> Result<ServerConfig> {
        let raw = self.servers.get(name).ok_or_else(|| Error::ServerNotFound {
            server: name.to_string(),
        })?;

        let required = |field: &str, value: &Option<String>| -> Result<PathBuf> {
            match value.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => Ok(expand_home(value)),
                _ => Err(Error::RequiredFieldMissing {
                    server: name.to_string(),
                    field: field.to_string(),
                }),
            }
        };

        Ok(ServerConfig {
            name: name.to_string(),
            download_directory: required("download_directory", &raw.download_directory)?,
            server_directory: required("server_directory", &raw.server_directory)?,
            backup_directory: required("backup_directory", &raw.backup_directory)?,
            screen_name: raw
                .screen_name
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SCREEN_NAME.to_string()),
            backup_exclude: raw.backup_exclude.clone(),
            retention_days: raw.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
            paper_version: raw.paper_version.clone().filter(|v| !v.trim().is_empty()),
        })
    }

    /// The configured cache file, with `~` expanded
    pub fn cache_file(&self) -> Option<PathBuf> {
        self.cache_file
            .as_deref()
            .and_then(Path::to_str)
            .map(expand_home)
    }
}

impl ServerConfig {
    pub fn backup_job(&self) -> BackupJob {
        BackupJob {
            source_directory: self.server_directory.clone(),
            archive_directory: self.backup_directory.clone(),
            session_name: self.screen_name.clone(),
            exclude_globs: self.backup_exclude.clone(),
            retention_days: self.retention_days,
        }
    }

    /// The configured Paper version, if any
    pub fn paper_intent(&self) -> Option<VersionIntent> {
        self.paper_version
            .as_deref()
            .map(|v| VersionIntent::parse(Some(v)))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcup_core::ErrorKind;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn server_defaults_are_filled_in() {
        let config = parse(
            r#"
servers:
  survival:
    download_directory: /srv/downloads
    server_directory: /srv/mc
    backup_directory: /srv/backups
"#,
        );

        let server = config.server("survival").unwrap();
        assert_eq!(server.screen_name, "minecraft");
        assert!(server.backup_exclude.is_empty());
        assert_eq!(server.retention_days, 30);
        assert_eq!(server.paper_intent(), None);

        let job = server.backup_job();
        assert_eq!(job.source_directory, PathBuf::from("/srv/mc"));
        assert_eq!(job.session_name, "minecraft");
    }

    #[test]
    fn optional_settings_are_read() {
        let config = parse(
            r#"
cache_file: /var/cache/mcup.json
servers:
  creative:
    download_directory: /d
    server_directory: /s
    backup_directory: /b
    screen_name: creative
    backup_exclude: ["*.log", "cache"]
    retention_days: 7
    paper_version: "1.20.4"
"#,
        );

        let server = config.server("creative").unwrap();
        assert_eq!(server.screen_name, "creative");
        assert_eq!(server.backup_exclude, vec!["*.log", "cache"]);
        assert_eq!(server.retention_days, 7);
        assert_eq!(server.paper_intent(), Some(VersionIntent::Specific("1.20.4".into())));
        assert_eq!(config.cache_file(), Some(PathBuf::from("/var/cache/mcup.json")));
    }

    #[test]
    fn missing_or_empty_required_field_is_named() {
        let config = parse(
            r#"
servers:
  survival:
    download_directory: /srv/downloads
    server_directory: ""
    backup_directory: /srv/backups
"#,
        );

        let err = config.server("survival").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldMissing);
        assert!(err.to_string().contains("server_directory"));
        assert!(err.to_string().contains("survival"));
    }

    #[test]
    fn unknown_server_is_not_found() {
        let err = Config::default().server("hub").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerNotFound);
    }

    #[test]
    fn home_expansion() {
        assert_eq!(expand_home("/abs"), PathBuf::from("/abs"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/mc"), home.join("mc"));
        }
    }
}

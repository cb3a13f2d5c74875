//! Configuration loader for mcup
//!
//! Finds the configuration file, reads it and parses it. A missing file is
//! reported together with the example configuration when one sits next to it.

use crate::config::Config;
use mcup_core::{Error, Result, CONFIG_FILE, EXAMPLE_CONFIG_FILE};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Loads `config.yaml` (or an explicitly chosen file)
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for `config.yaml` in the working directory
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// Load from `path` instead
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration; the file must exist
    pub fn load(&self) -> Result<Config> {
        match self.load_optional()? {
            Some(config) => Ok(config),
            None => Err(Error::ConfigMissing {
                path: self.path.clone(),
                example: self.example_path(),
            }),
        }
    }

    /// Load the configuration if the file exists
    pub fn load_optional(&self) -> Result<Option<Config>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::file_system(&self.path, "read configuration", e)),
        };

        tracing::debug!(path = %self.path.display(), "loading configuration");
        parse(&self.path, &content).map(Some)
    }

    fn example_path(&self) -> Option<PathBuf> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let example = dir.join(EXAMPLE_CONFIG_FILE);
        example.is_file().then_some(example)
    }
}

/// Parse configuration text; an empty document is an empty configuration
pub fn parse(path: &Path, content: &str) -> Result<Config> {
    let malformed = |e: serde_yaml::Error| Error::ConfigMalformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let value: serde_yaml::Value = if content.trim().is_empty() {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(content).map_err(malformed)?
    };

    match value {
        serde_yaml::Value::Null => Ok(Config::default()),
        value => serde_yaml::from_value(value).map_err(malformed),
    }
}

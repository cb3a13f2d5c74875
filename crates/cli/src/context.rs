use mcup_cache::CacheStore;
use mcup_config::{Config, ConfigLoader};
use mcup_core::Result;
use mcup_utils::XdgPaths;
use std::path::PathBuf;

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct Context {
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    fn loader(&self) -> ConfigLoader {
        match &self.config_path {
            Some(path) => ConfigLoader::new().path(path),
            None => ConfigLoader::new(),
        }
    }

    /// The configuration, which must exist
    pub fn config(&self) -> Result<Config> {
        self.loader().load()
    }

    /// The configuration if there is one
    pub fn optional_config(&self) -> Result<Config> {
        Ok(self.loader().load_optional()?.unwrap_or_default())
    }

    /// Metadata cache named by the configuration, else the XDG default
    pub fn cache_store(&self, config: &Config) -> CacheStore {
        let path = config
            .cache_file()
            .unwrap_or_else(XdgPaths::metadata_cache_file);
        tracing::debug!(path = %path.display(), "using metadata cache");
        CacheStore::new(path)
    }
}

use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for mcup
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CACHE_HOME/mcup or fallback
    pub fn cache_dir() -> PathBuf {
        Self::base("XDG_CACHE_HOME", ".cache").join("mcup")
    }

    /// Default location of the persisted metadata cache
    pub fn metadata_cache_file() -> PathBuf {
        Self::cache_dir().join("metadata.json")
    }

    fn base(var: &str, home_relative: &str) -> PathBuf {
        env::var(var)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join(home_relative))
                    .unwrap_or_else(|| PathBuf::from(home_relative))
            })
    }
}

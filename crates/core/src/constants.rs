/// Constants used throughout the mcup codebase
// Metadata APIs
pub const PAPER_API_BASE: &str = "https://api.papermc.io/v2";
pub const GEYSER_API_BASE: &str = "https://download.geysermc.org/v2";

// Release channel that marks a build as stable
pub const STABLE_CHANNEL: &str = "default";

// Cache lifetimes, in seconds
pub const VERSION_LIST_TTL_SECS: u64 = 7 * 24 * 3600;
pub const BUILD_LIST_TTL_SECS: u64 = 6 * 3600;

// Bound for every metadata request
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Configuration
pub const CONFIG_FILE: &str = "config.yaml";
pub const EXAMPLE_CONFIG_FILE: &str = "example.config.yaml";
pub const DEFAULT_DOWNLOAD_DIRECTORY: &str = "downloads";
pub const DEFAULT_SCREEN_NAME: &str = "minecraft";
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

// Environment variable names
pub const MCUP_LOG_VAR: &str = "MCUP_LOG";

// Backup archive naming: mcbackup_<dir>_<YYYY-MM-DD-HH>.tar.gz
pub const ARCHIVE_PREFIX: &str = "mcbackup_";
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";
pub const ARCHIVE_HOUR_FORMAT: &str = "%Y-%m-%d-%H";

// Session control
pub const SCREEN_BINARY: &str = "screen";

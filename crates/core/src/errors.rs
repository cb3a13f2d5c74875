use std::fmt;
use std::path::PathBuf;

/// Result type alias for mcup operations
pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for mcup operations
///
/// The enum is deliberately flat: every failure is one kind plus the context
/// needed to report it (url, path, version, build).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote API could not be reached or answered with a non-2xx status
    #[error("request to '{url}' failed: {message}")]
    RemoteRequest {
        url: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The remote API answered, but not with the structured data we expected
    #[error("malformed response from '{url}': {message}")]
    RemoteData { url: String, message: String },

    /// A build descriptor lacks a field required to download it
    #[error("{}", format_incomplete_metadata(.project, .version, .build, .missing))]
    BuildMetadataIncomplete {
        project: String,
        version: Option<String>,
        build: Option<u64>,
        missing: String,
    },

    /// The project lists no versions at all
    #[error("no versions found for project '{project}'")]
    NoVersionsFound { project: String },

    /// A version exists but has no published builds
    #[error("no builds found for {project} version {version}")]
    NoBuildsFound { project: String, version: String },

    /// Every version was scanned and none has a build on the stable channel
    #[error("no stable build found for any {project} version")]
    NoStableBuildFound { project: String },

    /// A user supplied version string is unusable
    #[error("invalid version: {message}")]
    InvalidVersion { message: String },

    /// The body ended before the declared content length was reached
    #[error("download from '{url}' to '{path}' was incomplete: received {received} of {expected} bytes")]
    DownloadIncomplete {
        url: String,
        path: PathBuf,
        expected: u64,
        received: u64,
    },

    /// Connection, timeout or status failure while downloading
    #[error("download from '{url}' failed: {message}")]
    DownloadTransport {
        url: String,
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The artifact could not be written to disk
    #[error("could not write download from '{url}' to '{path}': {source}")]
    DownloadFileSystem {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's SHA-256 could not be computed or does not match
    #[error("hash check failed for '{path}': {message}")]
    HashCheck { path: PathBuf, message: String },

    /// The session multiplexer binary is not installed
    #[error("session control tool '{tool}' is not installed")]
    ControlToolMissing { tool: String },

    /// The session multiplexer is installed but the session did not take the command
    #[error("session '{session}' is not running: {message}")]
    SessionNotRunning { session: String, message: String },

    /// The backup archive could not be created
    #[error("failed to create archive '{path}': {message}")]
    Archive {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The configuration file does not exist
    #[error("{}", format_config_missing(.path, .example))]
    ConfigMissing {
        path: PathBuf,
        example: Option<PathBuf>,
    },

    /// The configuration file is not valid YAML for our schema
    #[error("error parsing '{path}': {message}")]
    ConfigMalformed { path: PathBuf, message: String },

    /// A server entry lacks a required setting
    #[error("'{field}' is a required field for server '{server}'")]
    RequiredFieldMissing { server: String, field: String },

    /// `--server` names an entry that is not under `servers:`
    #[error("server configuration '{server}' not found under the 'servers' section")]
    ServerNotFound { server: String },

    /// The metadata cache could not be persisted
    #[error("cache file '{path}' could not be written: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// The kind of an [`Error`], independent of its context fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RemoteRequestFailed,
    RemoteDataMalformed,
    BuildMetadataIncomplete,
    NoVersionsFound,
    NoBuildsFound,
    NoStableBuildFound,
    InvalidVersion,
    DownloadIncomplete,
    DownloadTransportFailed,
    DownloadFileSystemFailed,
    HashCheckFailed,
    ControlToolMissing,
    SessionNotRunning,
    ArchiveFailed,
    ConfigMissing,
    ConfigMalformed,
    RequiredFieldMissing,
    ServerNotFound,
    CacheIo,
    FileSystem,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 20] = [
        ErrorKind::RemoteRequestFailed,
        ErrorKind::RemoteDataMalformed,
        ErrorKind::BuildMetadataIncomplete,
        ErrorKind::NoVersionsFound,
        ErrorKind::NoBuildsFound,
        ErrorKind::NoStableBuildFound,
        ErrorKind::InvalidVersion,
        ErrorKind::DownloadIncomplete,
        ErrorKind::DownloadTransportFailed,
        ErrorKind::DownloadFileSystemFailed,
        ErrorKind::HashCheckFailed,
        ErrorKind::ControlToolMissing,
        ErrorKind::SessionNotRunning,
        ErrorKind::ArchiveFailed,
        ErrorKind::ConfigMissing,
        ErrorKind::ConfigMalformed,
        ErrorKind::RequiredFieldMissing,
        ErrorKind::ServerNotFound,
        ErrorKind::CacheIo,
        ErrorKind::FileSystem,
    ];

    /// Stable kebab-case name, used in diagnostics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RemoteRequestFailed => "remote-request-failed",
            ErrorKind::RemoteDataMalformed => "remote-data-malformed",
            ErrorKind::BuildMetadataIncomplete => "build-metadata-incomplete",
            ErrorKind::NoVersionsFound => "no-versions-found",
            ErrorKind::NoBuildsFound => "no-builds-found",
            ErrorKind::NoStableBuildFound => "no-stable-build-found",
            ErrorKind::InvalidVersion => "invalid-version",
            ErrorKind::DownloadIncomplete => "download-incomplete",
            ErrorKind::DownloadTransportFailed => "download-transport-failed",
            ErrorKind::DownloadFileSystemFailed => "download-filesystem-failed",
            ErrorKind::HashCheckFailed => "hash-check-failed",
            ErrorKind::ControlToolMissing => "control-tool-missing",
            ErrorKind::SessionNotRunning => "session-not-running",
            ErrorKind::ArchiveFailed => "archive-failed",
            ErrorKind::ConfigMissing => "config-missing",
            ErrorKind::ConfigMalformed => "config-malformed",
            ErrorKind::RequiredFieldMissing => "required-field-missing",
            ErrorKind::ServerNotFound => "server-not-found",
            ErrorKind::CacheIo => "cache-io",
            ErrorKind::FileSystem => "file-system",
        }
    }

    /// Process exit code for this kind. Scripts depend on these values, so
    /// they must never be renumbered.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::RemoteRequestFailed => 10,
            ErrorKind::RemoteDataMalformed => 11,
            ErrorKind::BuildMetadataIncomplete => 12,
            ErrorKind::NoVersionsFound => 13,
            ErrorKind::NoBuildsFound => 14,
            ErrorKind::NoStableBuildFound => 15,
            ErrorKind::InvalidVersion => 16,
            ErrorKind::DownloadIncomplete => 20,
            ErrorKind::DownloadTransportFailed => 21,
            ErrorKind::DownloadFileSystemFailed => 22,
            ErrorKind::HashCheckFailed => 23,
            ErrorKind::ControlToolMissing => 30,
            ErrorKind::SessionNotRunning => 31,
            ErrorKind::ArchiveFailed => 32,
            ErrorKind::ConfigMissing => 40,
            ErrorKind::ConfigMalformed => 41,
            ErrorKind::RequiredFieldMissing => 42,
            ErrorKind::ServerNotFound => 43,
            ErrorKind::CacheIo => 50,
            ErrorKind::FileSystem => 51,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_incomplete_metadata(
    project: &str,
    version: &Option<String>,
    build: &Option<u64>,
    missing: &str,
) -> String {
    match (version, build) {
        (Some(version), Some(build)) => {
            format!("incomplete {project} metadata for version {version} build {build}: missing {missing}")
        }
        (Some(version), None) => {
            format!("incomplete {project} metadata for version {version}: missing {missing}")
        }
        _ => format!("incomplete {project} metadata: missing {missing}"),
    }
}

fn format_config_missing(path: &std::path::Path, example: &Option<PathBuf>) -> String {
    match example {
        Some(example) => format!(
            "configuration file '{}' not found; copy '{}' to '{}' and adjust it",
            path.display(),
            example.display(),
            path.display()
        ),
        None => format!("configuration file '{}' not found", path.display()),
    }
}

impl Error {
    /// The kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RemoteRequest { .. } => ErrorKind::RemoteRequestFailed,
            Error::RemoteData { .. } => ErrorKind::RemoteDataMalformed,
            Error::BuildMetadataIncomplete { .. } => ErrorKind::BuildMetadataIncomplete,
            Error::NoVersionsFound { .. } => ErrorKind::NoVersionsFound,
            Error::NoBuildsFound { .. } => ErrorKind::NoBuildsFound,
            Error::NoStableBuildFound { .. } => ErrorKind::NoStableBuildFound,
            Error::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Error::DownloadIncomplete { .. } => ErrorKind::DownloadIncomplete,
            Error::DownloadTransport { .. } => ErrorKind::DownloadTransportFailed,
            Error::DownloadFileSystem { .. } => ErrorKind::DownloadFileSystemFailed,
            Error::HashCheck { .. } => ErrorKind::HashCheckFailed,
            Error::ControlToolMissing { .. } => ErrorKind::ControlToolMissing,
            Error::SessionNotRunning { .. } => ErrorKind::SessionNotRunning,
            Error::Archive { .. } => ErrorKind::ArchiveFailed,
            Error::ConfigMissing { .. } => ErrorKind::ConfigMissing,
            Error::ConfigMalformed { .. } => ErrorKind::ConfigMalformed,
            Error::RequiredFieldMissing { .. } => ErrorKind::RequiredFieldMissing,
            Error::ServerNotFound { .. } => ErrorKind::ServerNotFound,
            Error::CacheIo { .. } => ErrorKind::CacheIo,
            Error::FileSystem { .. } => ErrorKind::FileSystem,
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }

    /// Create a remote request error
    #[must_use]
    pub fn remote_request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RemoteRequest {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote request error with a source error
    #[must_use]
    pub fn remote_request_with_source(
        url: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        Error::RemoteRequest {
            url: url.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a malformed remote data error
    #[must_use]
    pub fn remote_data(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RemoteData {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an incomplete build metadata error
    #[must_use]
    pub fn incomplete_metadata(
        project: impl Into<String>,
        version: Option<String>,
        build: Option<u64>,
        missing: impl Into<String>,
    ) -> Self {
        Error::BuildMetadataIncomplete {
            project: project.into(),
            version,
            build,
            missing: missing.into(),
        }
    }

    /// Create a download transport error
    #[must_use]
    pub fn download_transport(
        url: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Error::DownloadTransport {
            url: url.into(),
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a download file system error
    #[must_use]
    pub fn download_file_system(
        url: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::DownloadFileSystem {
            url: url.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a hash check error
    #[must_use]
    pub fn hash_check(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::HashCheck {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create an archive error
    #[must_use]
    pub fn archive(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Archive {
            path: path.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let codes: HashSet<u8> = ErrorKind::ALL.iter().map(|k| k.exit_code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
        assert!(!codes.contains(&0));
        // clap reserves 2 for usage errors
        assert!(!codes.contains(&2));
    }

    #[test]
    fn kind_names_are_kebab_case() {
        for kind in ErrorKind::ALL {
            let name = kind.as_str();
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '-'), "{name}");
        }
    }

    #[test]
    fn incomplete_metadata_message_includes_context() {
        let err = Error::incomplete_metadata("geyser", Some("2.4.0".into()), Some(123), "sha256");
        assert_eq!(err.kind(), ErrorKind::BuildMetadataIncomplete);
        assert_eq!(
            err.to_string(),
            "incomplete geyser metadata for version 2.4.0 build 123: missing sha256"
        );
    }

    #[test]
    fn config_missing_mentions_example_when_present() {
        let err = Error::ConfigMissing {
            path: PathBuf::from("config.yaml"),
            example: Some(PathBuf::from("example.config.yaml")),
        };
        assert!(err.to_string().contains("example.config.yaml"));
        assert_eq!(err.exit_code(), 40);
    }

    #[test]
    fn io_errors_convert_to_file_system() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::FileSystem);
    }
}

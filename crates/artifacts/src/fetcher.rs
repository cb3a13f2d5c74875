//! Canonical artifact naming and hash-verified conditional downloads

use crate::project::{DownloadSegment, Project};
use mcup_cache::MetadataClient;
use mcup_core::{ArtifactTarget, BuildDescriptor, Error, Result};
use mcup_utils::{digests_match, sha256_file, Transport};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

const BUFFER_SIZE: usize = 16 * 1024;
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

static SNAPSHOT_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(.+?)(-SNAPSHOT)?(\.jar)?$").ok());

/// What the fetcher did for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// A new file was written
    Downloaded(PathBuf),
    /// A file with the expected hash was already in place
    AlreadyPresent(PathBuf),
}

impl Acquired {
    pub fn path(&self) -> &Path {
        match self {
            Acquired::Downloaded(path) | Acquired::AlreadyPresent(path) => path,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Acquired::Downloaded(_))
    }
}

/// `{base}-v{version}-b{build}{ext}` for a published file name
///
/// When `pattern` marks the project as one that republishes the same literal
/// name (it contains `*` or `-SNAPSHOT`), a trailing `-SNAPSHOT` is dropped
/// from the base first.
pub fn versioned_file_name(
    project: &str,
    published: Option<&str>,
    pattern: Option<&str>,
    version: &str,
    build: u64,
) -> String {
    let default_name = format!("{project}-latest.jar");
    let published = published.filter(|name| !name.is_empty()).unwrap_or(&default_name);
    let (base, ext) = split_extension(published);

    let renames = pattern.is_some_and(|p| p.contains('*') || p.contains("-SNAPSHOT"));
    if !renames {
        return format!("{base}-v{version}-b{build}{ext}");
    }

    match SNAPSHOT_NAME.as_ref().and_then(|re| re.captures(published)) {
        Some(captures) => {
            let prefix = captures.get(1).map_or(base, |m| m.as_str());
            format!("{prefix}-v{version}-b{build}{ext}")
        }
        None => format!("{project}-latest-v{version}-b{build}.jar"),
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// A published name must stay inside the download directory
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Rate limit for download progress lines
struct ProgressThrottle {
    last: Option<Instant>,
    interval: Duration,
}

impl ProgressThrottle {
    fn new(interval: Duration) -> Self {
        Self {
            last: None,
            interval,
        }
    }

    fn should_report(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Downloads targets, skipping any whose file is already in place
pub struct ArtifactFetcher<'t> {
    transport: &'t dyn Transport,
}

impl<'t> ArtifactFetcher<'t> {
    pub fn new(transport: &'t dyn Transport) -> Self {
        Self { transport }
    }

    /// Build the download instruction for `descriptor`
    ///
    /// The version, build and hash must all be published; nothing is
    /// downloaded on partial metadata.
    pub fn target(
        project: &Project,
        client: &MetadataClient<'_>,
        descriptor: &BuildDescriptor,
        download_directory: &Path,
    ) -> Result<ArtifactTarget> {
        let incomplete = |missing: &str| {
            Error::incomplete_metadata(
                project.name,
                descriptor.version.clone(),
                descriptor.build,
                missing,
            )
        };

        let version = descriptor
            .version
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| incomplete("version"))?;
        let build = descriptor.build.ok_or_else(|| incomplete("build"))?;
        let download = descriptor
            .downloads
            .get(project.download_key)
            .ok_or_else(|| incomplete(&format!("downloads.{}", project.download_key)))?;
        let sha256 = download
            .sha256
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| incomplete(&format!("downloads.{}.sha256", project.download_key)))?;

        if let Some(name) = download.file_name.as_deref().filter(|n| !n.is_empty()) {
            if !is_plain_file_name(name) {
                return Err(Error::remote_data(
                    client.build_url(version, build),
                    format!(
                        "downloads.{}.name {name:?} is not a plain file name",
                        project.download_key
                    ),
                ));
            }
        }

        let file_name = versioned_file_name(
            project.name,
            download.file_name.as_deref(),
            project.filename_pattern,
            version,
            build,
        );

        let segment = match project.segment {
            DownloadSegment::FileName => download
                .file_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| incomplete(&format!("downloads.{}.name", project.download_key)))?,
            DownloadSegment::DownloadKey => project.download_key,
        };

        Ok(ArtifactTarget {
            source_url: client.download_url(version, build, segment),
            destination: download_directory.join(file_name),
            expected_sha256: sha256.to_string(),
            label: format!("{} version {version}, build {build}", project.name),
        })
    }

    /// Make sure `target.destination` holds the expected bytes
    pub fn fetch(&self, target: &ArtifactTarget) -> Result<Acquired> {
        if self.is_current(target)? {
            tracing::info!(path = %target.destination.display(), "{} already downloaded", target.label);
            return Ok(Acquired::AlreadyPresent(target.destination.clone()));
        }

        tracing::info!(url = %target.source_url, "downloading {}", target.label);
        self.download(target)?;
        tracing::info!(path = %target.destination.display(), "downloaded {}", target.label);
        Ok(Acquired::Downloaded(target.destination.clone()))
    }

    fn is_current(&self, target: &ArtifactTarget) -> Result<bool> {
        if !target.destination.is_file() {
            return Ok(false);
        }
        let actual = sha256_file(&target.destination).map_err(|e| {
            Error::hash_check(&target.destination, format!("could not hash existing file: {e}"))
        })?;
        if digests_match(&actual, &target.expected_sha256) {
            return Ok(true);
        }
        tracing::warn!(
            path = %target.destination.display(),
            "existing file does not match the published hash, downloading again"
        );
        Ok(false)
    }

    fn download(&self, target: &ArtifactTarget) -> Result<()> {
        let url = target.source_url.as_str();
        let path = target.destination.as_path();
        let fs_error = |e: io::Error| Error::download_file_system(url, path, e);

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(directory).map_err(fs_error)?;

        let mut stream = self
            .transport
            .fetch_stream(url)
            .map_err(|e| into_download_error(e, path))?;

        // Bytes land in a sibling temp file; the destination only ever sees a
        // complete, verified artifact.
        let mut temp = tempfile::Builder::new()
            .prefix(".mcup-")
            .suffix(".part")
            .tempfile_in(directory)
            .map_err(fs_error)?;

        let mut hasher = Sha256::new();
        let mut received: u64 = 0;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut progress = ProgressThrottle::new(PROGRESS_INTERVAL);
        loop {
            let read = match stream.body.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::DownloadTransport {
                        url: url.to_string(),
                        path: path.to_path_buf(),
                        message: format!("connection dropped after {received} bytes: {e}"),
                        source: Some(e.into()),
                    })
                }
            };
            temp.write_all(&buffer[..read]).map_err(fs_error)?;
            hasher.update(&buffer[..read]);
            received += read as u64;
            if progress.should_report(Instant::now()) {
                tracing::info!(received, total = ?stream.content_length, "downloading {}", target.label);
            }
        }
        temp.as_file().sync_all().map_err(fs_error)?;

        if let Some(expected) = stream.content_length.filter(|len| *len > 0) {
            if received != expected {
                return Err(Error::DownloadIncomplete {
                    url: url.to_string(),
                    path: path.to_path_buf(),
                    expected,
                    received,
                });
            }
        }

        let actual = hex::encode(hasher.finalize());
        if !digests_match(&actual, &target.expected_sha256) {
            return Err(Error::hash_check(
                path,
                format!("expected sha256 {}, got {actual}", target.expected_sha256),
            ));
        }

        temp.persist(path).map_err(|e| fs_error(e.error))?;
        Ok(())
    }
}

fn into_download_error(error: Error, path: &Path) -> Error {
    match error {
        Error::RemoteRequest {
            url,
            message,
            source,
        } => Error::DownloadTransport {
            url,
            path: path.to_path_buf(),
            message,
            source,
        },
        Error::RemoteData { url, message } => Error::download_transport(url, path, message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcup_cache::CacheStore;
    use mcup_core::{DownloadEntry, ErrorKind};
    use mcup_utils::{sha256_bytes, FakeTransport};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const URL: &str = "https://dl.example.test/artifact.jar";

    #[test]
    fn progress_is_reported_at_most_once_per_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(1));
        let start = Instant::now();

        assert!(throttle.should_report(start));
        assert!(!throttle.should_report(start + Duration::from_millis(400)));
        assert!(throttle.should_report(start + Duration::from_millis(1_000)));
        assert!(!throttle.should_report(start + Duration::from_millis(1_900)));
        assert!(throttle.should_report(start + Duration::from_millis(2_100)));
    }

    #[test]
    fn snapshot_names_get_version_and_build() {
        assert_eq!(
            versioned_file_name("geyser", Some("Geyser-Spigot.jar"), Some("*-SNAPSHOT.jar"), "2.4.0", 123),
            "Geyser-Spigot-v2.4.0-b123.jar"
        );
        assert_eq!(
            versioned_file_name(
                "floodgate",
                Some("Floodgate-Spigot-SNAPSHOT.jar"),
                Some("Floodgate-Spigot-*-SNAPSHOT.jar"),
                "2.2.3",
                110
            ),
            "Floodgate-Spigot-v2.2.3-b110.jar"
        );
    }

    #[test]
    fn plain_names_keep_their_base() {
        assert_eq!(
            versioned_file_name("paper", Some("paper-1.21-101.jar"), None, "1.21", 101),
            "paper-1.21-101-v1.21-b101.jar"
        );
        // Without a renaming pattern -SNAPSHOT stays in the base
        assert_eq!(
            versioned_file_name("geyser", Some("Geyser-SNAPSHOT.jar"), None, "2.4.0", 1),
            "Geyser-SNAPSHOT-v2.4.0-b1.jar"
        );
    }

    #[test]
    fn missing_published_name_falls_back_to_project_name() {
        assert_eq!(
            versioned_file_name("geyser", None, Some("*-SNAPSHOT.jar"), "2.4.0", 7),
            "geyser-latest-v2.4.0-b7.jar"
        );
    }

    fn target(dir: &Path, body: &[u8]) -> ArtifactTarget {
        ArtifactTarget {
            source_url: URL.to_string(),
            destination: dir.join("Geyser-Spigot-v2.4.0-b123.jar"),
            expected_sha256: sha256_bytes(body),
            label: "geyser version 2.4.0, build 123".to_string(),
        }
    }

    #[test]
    fn second_fetch_is_a_local_hit() {
        let dir = TempDir::new().unwrap();
        let body = b"jar bytes".to_vec();
        let transport = FakeTransport::new().with_bytes(URL, body.clone());
        let fetcher = ArtifactFetcher::new(&transport);
        let target = target(dir.path(), &body);

        let first = fetcher.fetch(&target).unwrap();
        let second = fetcher.fetch(&target).unwrap();

        assert_eq!(first, Acquired::Downloaded(target.destination.clone()));
        assert_eq!(second, Acquired::AlreadyPresent(target.destination.clone()));
        assert_eq!(transport.request_count(URL), 1);
        assert_eq!(fs::read(&target.destination).unwrap(), body);
    }

    #[test]
    fn stale_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let body = b"fresh".to_vec();
        let transport = FakeTransport::new().with_bytes(URL, body.clone());
        let target = target(dir.path(), &body);
        fs::write(&target.destination, b"stale").unwrap();

        let acquired = ArtifactFetcher::new(&transport).fetch(&target).unwrap();

        assert!(acquired.is_new());
        assert_eq!(fs::read(&target.destination).unwrap(), body);
    }

    #[test]
    fn short_body_is_incomplete_and_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let body = b"partial".to_vec();
        let transport = FakeTransport::new().with_truncated_bytes(URL, body.clone(), 1_000);
        let target = target(dir.path(), &body);

        let err = ArtifactFetcher::new(&transport).fetch(&target).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DownloadIncomplete);
        assert!(!target.destination.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn hash_mismatch_after_download_is_rejected() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new().with_bytes(URL, b"tampered".to_vec());
        let target = target(dir.path(), b"genuine");

        let err = ArtifactFetcher::new(&transport).fetch(&target).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HashCheckFailed);
        assert!(!target.destination.exists());
    }

    #[test]
    fn transport_and_filesystem_failures_are_distinct() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new().with_failure(URL, "server returned status 503");
        let err = ArtifactFetcher::new(&transport)
            .fetch(&target(dir.path(), b"x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DownloadTransportFailed);

        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        let transport = FakeTransport::new().with_bytes(URL, b"x".to_vec());
        let err = ArtifactFetcher::new(&transport)
            .fetch(&target(&blocker, b"x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DownloadFileSystemFailed);
    }

    fn descriptor(sha256: Option<&str>, build: Option<u64>) -> BuildDescriptor {
        let mut downloads = BTreeMap::new();
        downloads.insert(
            "application".to_string(),
            DownloadEntry {
                file_name: Some("paper-1.21-101.jar".to_string()),
                sha256: sha256.map(str::to_string),
            },
        );
        BuildDescriptor {
            version: Some("1.21".to_string()),
            build,
            channel: "default".to_string(),
            downloads,
        }
    }

    #[test]
    fn target_uses_published_name_for_paper_urls() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        let transport = FakeTransport::new();
        let client = MetadataClient::new(&store, &transport, Project::PAPER.api_base, "paper");

        let target = ArtifactFetcher::target(
            &Project::PAPER,
            &client,
            &descriptor(Some("abc"), Some(101)),
            Path::new("/srv/downloads"),
        )
        .unwrap();

        assert_eq!(
            target.source_url,
            "https://api.papermc.io/v2/projects/paper/versions/1.21/builds/101/downloads/paper-1.21-101.jar"
        );
        assert_eq!(
            target.destination,
            Path::new("/srv/downloads/paper-1.21-101-v1.21-b101.jar")
        );
        assert_eq!(target.expected_sha256, "abc");
    }

    #[test]
    fn incomplete_descriptor_never_downloads() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        let transport = FakeTransport::new();
        let client = MetadataClient::new(&store, &transport, Project::PAPER.api_base, "paper");

        for incomplete in [descriptor(None, Some(101)), descriptor(Some("abc"), None)] {
            let err = ArtifactFetcher::target(&Project::PAPER, &client, &incomplete, dir.path())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BuildMetadataIncomplete);
        }
        assert!(transport.requests().is_empty());
    }

    fn descriptor_named(name: &str) -> BuildDescriptor {
        let mut descriptor = descriptor(Some("abc"), Some(101));
        if let Some(entry) = descriptor.downloads.get_mut("application") {
            entry.file_name = Some(name.to_string());
        }
        descriptor
    }

    #[test]
    fn published_names_cannot_leave_the_download_directory() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        let transport = FakeTransport::new();
        let client = MetadataClient::new(&store, &transport, Project::PAPER.api_base, "paper");

        for name in ["../../escaped.jar", "/etc/passwd", "sub/dir.jar", ".."] {
            let err = ArtifactFetcher::target(
                &Project::PAPER,
                &client,
                &descriptor_named(name),
                dir.path(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::RemoteDataMalformed, "{name}");
            assert!(err.to_string().contains("downloads.application.name"), "{err}");
        }
        assert!(transport.requests().is_empty());
    }
}

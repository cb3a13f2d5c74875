use mcup_artifacts::{Pipeline, Project};
use mcup_backup::{BackupOutcome, SessionControl};
use mcup_cache::CacheStore;
use mcup_cli::commands::update::{plan, update, update_artifacts};
use mcup_cli::UpdateArgs;
use mcup_config::ServerConfig;
use mcup_core::{ErrorKind, Result, VersionIntent};
use mcup_utils::{sha256_bytes, FakeTransport};
use serde_json::json;
use serial_test::serial;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSession {
    lines: RefCell<Vec<String>>,
}

impl SessionControl for RecordingSession {
    fn send_line(&self, _session: &str, text: &str) -> Result<()> {
        self.lines.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Serve one build of `project` at `version`, published as `file_name`
fn serve(
    transport: FakeTransport,
    project: &Project,
    version: &str,
    build: u64,
    file_name: &str,
    jar: &[u8],
) -> FakeTransport {
    let base = format!("{}/projects/{}", project.api_base, project.name);
    let build_url = format!("{base}/versions/{version}/builds/{build}");
    let segment = if *project == Project::PAPER {
        file_name
    } else {
        project.download_key
    };
    transport
        .with_json(base.clone(), json!({"versions": [version]}))
        .with_json(
            format!("{base}/versions/{version}/builds"),
            json!({"builds": [{"build": build, "channel": "default"}]}),
        )
        .with_json(
            build_url.clone(),
            json!({
                "version": version,
                "build": build,
                "channel": "default",
                "downloads": {project.download_key: {"name": file_name, "sha256": sha256_bytes(jar)}}
            }),
        )
        .with_bytes(format!("{build_url}/downloads/{segment}"), jar.to_vec())
}

fn all_projects() -> FakeTransport {
    let transport = serve(FakeTransport::new(), &Project::PAPER, "1.21", 101, "paper-1.21-101.jar", b"paper");
    let transport = serve(transport, &Project::GEYSER, "2.4.0", 123, "Geyser-Spigot.jar", b"geyser");
    serve(transport, &Project::FLOODGATE, "2.2.3", 110, "Floodgate-Spigot.jar", b"floodgate")
}

fn server(root: &Path) -> ServerConfig {
    let server_directory = root.join("mc");
    fs::create_dir_all(server_directory.join("world")).unwrap();
    fs::write(server_directory.join("world").join("level.dat"), b"level").unwrap();
    ServerConfig {
        name: "survival".to_string(),
        download_directory: root.join("downloads"),
        server_directory,
        backup_directory: root.join("backups"),
        screen_name: "minecraft".to_string(),
        backup_exclude: Vec::new(),
        retention_days: 30,
        paper_version: None,
    }
}

#[test]
fn plan_defaults_and_overrides() {
    let defaults = plan(None, None).unwrap();
    assert_eq!(
        defaults,
        vec![
            (Project::PAPER, VersionIntent::Stable),
            (Project::GEYSER, VersionIntent::Latest),
            (Project::FLOODGATE, VersionIntent::Latest),
        ]
    );

    let temp_dir = TempDir::new().unwrap();
    let mut configured = server(temp_dir.path());
    configured.paper_version = Some("latest".to_string());
    assert_eq!(plan(None, Some(&configured)).unwrap()[0].1, VersionIntent::Latest);
    assert_eq!(
        plan(Some("1.20.4"), Some(&configured)).unwrap()[0].1,
        VersionIntent::Specific("1.20.4".into())
    );
    assert_eq!(
        plan(Some(" "), None).unwrap_err().kind(),
        ErrorKind::InvalidVersion
    );
}

#[test]
fn one_failing_project_does_not_block_the_others() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("cache.json"));
    let transport = serve(FakeTransport::new(), &Project::PAPER, "1.21", 101, "paper-1.21-101.jar", b"paper");
    let transport = serve(transport, &Project::FLOODGATE, "2.2.3", 110, "Floodgate-Spigot.jar", b"floodgate");
    let pipeline = Pipeline::new(&store, &transport, temp_dir.path().join("downloads"));

    let report = update_artifacts(&pipeline, &plan(None, None).unwrap());

    assert!(report.any_new());
    let failed: Vec<_> = report.failures().map(|o| o.project).collect();
    assert_eq!(failed, vec!["geyser"]);
    assert!(temp_dir.path().join("downloads/paper-1.21-101-v1.21-b101.jar").is_file());
    assert!(temp_dir.path().join("downloads/Floodgate-Spigot-v2.2.3-b110.jar").is_file());
    assert_eq!(report.into_result().unwrap_err().kind(), ErrorKind::RemoteRequestFailed);
}

#[test]
#[serial]
fn new_builds_trigger_one_backup_per_hour() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("cache.json"));
    let transport = all_projects();
    let server = server(temp_dir.path());
    let pipeline = Pipeline::new(&store, &transport, server.download_directory.clone());
    let session = RecordingSession::default();
    let args = UpdateArgs {
        server: Some(server.name.clone()),
        paper_version: None,
    };

    let backup = update(&args, Some(&server), &pipeline, &session).unwrap();

    let Some(BackupOutcome::Created(archive)) = backup else {
        panic!("expected a backup, got {backup:?}");
    };
    assert!(archive.is_file());
    assert!(session.lines.borrow().iter().any(|l| l == "save-off"));
    assert!(session.lines.borrow().iter().any(|l| l == "save-on"));

    // Nothing new the second time round, so no backup at all
    session.lines.borrow_mut().clear();
    let backup = update(&args, Some(&server), &pipeline, &session).unwrap();
    assert_eq!(backup, None);
    assert!(session.lines.borrow().is_empty());
}

#[test]
fn without_a_server_nothing_is_backed_up() {
    let temp_dir = TempDir::new().unwrap();
    let store = CacheStore::new(temp_dir.path().join("cache.json"));
    let transport = all_projects();
    let pipeline = Pipeline::new(&store, &transport, temp_dir.path().join("downloads"));
    let session = RecordingSession::default();

    let backup = update(&UpdateArgs::default(), None, &pipeline, &session).unwrap();

    assert_eq!(backup, None);
    assert!(session.lines.borrow().is_empty());
    assert_eq!(fs::read_dir(temp_dir.path().join("downloads")).unwrap().count(), 3);
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

fn sitebucket() -> Command {
    let mut cmd = Command::cargo_bin("sitebucket").expect("Binary exists");
    // Keep the test hermetic: no .env or shared AWS config should influence it.
    cmd.env("RUST_LOG", "off")
        .env("AWS_CONFIG_FILE", "/nonexistent/aws/config")
        .env("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/aws/credentials");
    cmd
}

#[test]
fn help_lists_every_subcommand() {
    sitebucket().arg("--help").assert().success().stdout(
        predicate::str::contains("list-buckets")
            .and(predicate::str::contains("list-bucket-objects"))
            .and(predicate::str::contains("setup-bucket"))
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("setup-domain"))
            .and(predicate::str::contains("list-records")),
    );
}

#[test]
fn sync_requires_pathname_and_bucket() {
    sitebucket()
        .arg("sync")
        .arg("./site")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BUCKET").or(predicate::str::contains("bucket")));
}

#[test]
fn sync_rejects_missing_path_before_contacting_aws() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    sitebucket()
        .arg("sync")
        .arg(&missing)
        .arg("my-site")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn sync_rejects_file_as_root() {
    let file = NamedTempFile::new().unwrap();

    sitebucket()
        .arg("sync")
        .arg(file.path())
        .arg("my-site")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn invalid_config_file_fails_with_parse_error() {
    let config = NamedTempFile::new().unwrap();
    write(config.path(), "website: [this is not a map").unwrap();

    sitebucket()
        .arg("--config")
        .arg(config.path())
        .arg("list-buckets")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config YAML"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{} {:?}", event.metadata().level(), event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use sitebucket::cli::{run, Cli, Commands};

    // A missing config file makes run() fail before any AWS client is built.
    let cli = Cli {
        config: Some(std::path::PathBuf::from("dummy.yaml")),
        profile: None,
        region: None,
        command: Commands::ListBuckets,
    };

    let result = run(cli).await;
    assert!(result.is_err(), "missing config file must be reported");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[tokio::test]
async fn per_file_sync_events_are_debug_level() {
    use sitebucket_core::config::SyncOptions;
    use sitebucket_core::contract::MockStorageProvider;
    use sitebucket_core::synchronise::sync_directory;

    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = tempdir().unwrap();
    write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();
    write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();
    let mut storage = MockStorageProvider::new();
    storage.expect_put_object().times(2).returning(|_| Ok(()));

    sync_directory(&storage, dir.path(), "my-site", &SyncOptions { concurrency: 1 })
        .await
        .expect("sync should succeed");

    let event_msgs = events.lock().unwrap();
    let per_file: Vec<&String> = event_msgs
        .iter()
        .filter(|msg| msg.contains("Uploading file") || msg.contains("Discovered file"))
        .collect();
    assert_eq!(per_file.len(), 4, "got: {:?}", event_msgs);
    assert!(per_file.iter().all(|msg| msg.starts_with("DEBUG")));
    assert!(event_msgs
        .iter()
        .any(|msg| msg.starts_with("INFO") && msg.contains("Directory sync complete")));
}

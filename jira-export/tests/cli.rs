use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{NamedTempFile, TempDir};

/// Creates a minimal config file pointing at a site that is never reached.
fn create_minimal_config(out: &TempDir) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    let yaml = format!(
        "jira:\n  base_url: https://acme.atlassian.net\nexport:\n  output_dir: {}\n",
        out.path().display()
    );
    write(config.path(), yaml).expect("Writing temp config failed");
    config
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("jira-export").expect("Binary exists");
    cmd.env_remove("JIRA_URL")
        .env_remove("JIRA_EMAIL")
        .env_remove("JIRA_API_TOKEN");
    cmd
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export").and(predicate::str::contains("check")));
}

#[test]
fn export_rejects_unknown_format() {
    let out = TempDir::new().unwrap();
    let config = create_minimal_config(&out);
    cmd()
        .args(["export", "--format", "odt", "--config"])
        .arg(config.path())
        .arg("PROJ-1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown export format"));
}

#[test]
fn export_fails_without_valid_keys() {
    let out = TempDir::new().unwrap();
    let config = create_minimal_config(&out);
    cmd()
        .arg("export")
        .arg("--config")
        .arg(config.path())
        .arg("not-a-key!")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid issue keys"));
}

#[test]
fn export_fails_without_credentials() {
    let out = TempDir::new().unwrap();
    let config = create_minimal_config(&out);
    cmd()
        .arg("export")
        .arg("--config")
        .arg(config.path())
        .arg("proj-1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JIRA_EMAIL"));
}

#[test]
fn export_fails_on_missing_config() {
    cmd()
        .args(["export", "--config", "/nonexistent/export.yaml", "PROJ-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
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
        self.events.lock().unwrap().push(format!("{event:?}"));
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

    use jira_export::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Check {
            config: std::path::PathBuf::from("dummy.yaml"),
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

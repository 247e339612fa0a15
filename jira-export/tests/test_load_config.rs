use jira_export::load_config::load_config;
use jira_export_core::ExportFormat;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A minimal config gets the defaults for every optional setting.
#[test]
#[serial]
fn minimal_config_uses_defaults() {
    env::remove_var("JIRA_URL");
    let file = config_file(
        r#"
jira:
  base_url: https://acme.atlassian.net
export:
  output_dir: ./tmp/exports
"#,
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.jira.base_url, "https://acme.atlassian.net");
    assert_eq!(config.jira.timeout_secs, 30);
    assert_eq!(config.export.output_dir, PathBuf::from("./tmp/exports"));
    assert_eq!(config.export.format, ExportFormat::Pdf);
    assert_eq!(config.export.concurrency, 1);
    assert!(config.export.embed_images);
    assert_eq!(config.style, jira_export_core::Style::default());
}

/// Style overrides merge with the defaults field by field.
#[test]
#[serial]
fn style_and_export_settings_are_read() {
    env::remove_var("JIRA_URL");
    let file = config_file(
        r##"
jira:
  base_url: https://acme.atlassian.net
  timeout_secs: 5
export:
  output_dir: out
  format: markdown
  concurrency: 4
  embed_images: false
style:
  page_width: 216
  page_height: 279
  max_comments: 3
  palette:
    primary: "#112233"
"##,
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.export.format, ExportFormat::Md);
    assert_eq!(config.export.concurrency, 4);
    assert!(!config.export.embed_images);
    assert_eq!(config.jira.timeout_secs, 5);
    assert_eq!(config.style.page_width, 216.0);
    assert_eq!(config.style.max_comments, 3);
    assert_eq!(config.style.palette.primary.hex(), "112233");
    assert_eq!(
        config.style.palette.success,
        jira_export_core::style::Palette::default().success
    );
}

#[test]
#[serial]
fn jira_url_env_overrides_the_file() {
    env::set_var("JIRA_URL", "https://other.atlassian.net");
    let file = config_file(
        "jira:\n  base_url: https://acme.atlassian.net\nexport:\n  output_dir: out\n",
    );
    let result = load_config(file.path());
    env::remove_var("JIRA_URL");

    assert_eq!(result.unwrap().jira.base_url, "https://other.atlassian.net");
}

#[test]
#[serial]
fn zero_concurrency_is_rejected() {
    env::remove_var("JIRA_URL");
    let file = config_file(
        "jira:\n  base_url: https://acme.atlassian.net\nexport:\n  output_dir: out\n  concurrency: 0\n",
    );
    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(msg.contains("concurrency"), "got: {msg}");
}

#[test]
#[serial]
fn base_url_must_be_http() {
    env::remove_var("JIRA_URL");
    let file = config_file("jira:\n  base_url: acme\nexport:\n  output_dir: out\n");
    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(msg.contains("base_url"), "got: {msg}");
}

#[test]
#[serial]
fn unknown_format_is_a_parse_error() {
    env::remove_var("JIRA_URL");
    let file = config_file(
        "jira:\n  base_url: https://acme.atlassian.net\nexport:\n  output_dir: out\n  format: odt\n",
    );
    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(msg.contains("parse") || msg.contains("YAML"), "got: {msg}");
}

/// If the config file is not valid YAML, load_config errors and reports as such.
#[test]
#[serial]
fn invalid_yaml_is_reported() {
    let file = config_file("not-yaml: [:::");
    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

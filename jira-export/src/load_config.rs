/// `load_config` module: loads the static YAML export config and applies environment overrides.
///
/// This module is the only place where untrusted YAML is parsed into the CLI's typed config.
///
/// # Responsibilities
/// - Parse the `jira`, `export` and optional `style` sections
/// - Fill defaults (PDF output, one issue at a time, images embedded, house style)
/// - Let `JIRA_URL` override the configured site
/// - Reject configs the exporter cannot run with, with clear diagnostics
///
/// Credentials never live in the file; see [`crate::jira`] for `JIRA_EMAIL` and `JIRA_API_TOKEN`.
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use jira_export_core::{ExportFormat, Style};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const URL_ENV: &str = "JIRA_URL";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub jira: JiraSection,
    pub export: ExportSection,
    #[serde(default)]
    pub style: Style,
}

#[derive(Debug, Deserialize)]
pub struct JiraSection {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExportSection {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_embed_images")]
    pub embed_images: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    1
}

fn default_embed_images() -> bool {
    true
}

/// Loads a static YAML config file (no secrets) and applies the `JIRA_URL` override.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading export config");

    let text = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Cannot read export config");
        anyhow::anyhow!("Failed to read config file {path_ref:?}: {e}")
    })?;
    debug!(config_path = ?path_ref, bytes = text.len(), "Export config read");

    let mut config: CliConfig = serde_yaml::from_str(&text).map_err(|e| {
        error!(
            error = %e,
            config_path = ?path_ref,
            "Export config is not valid YAML for this schema"
        );
        anyhow::anyhow!("Failed to parse config YAML {path_ref:?}: {e}")
    })?;
    info!(
        config_path = ?path_ref,
        base_url = %config.jira.base_url,
        format = %config.export.format,
        "Export config parsed"
    );

    if let Ok(url) = std::env::var(URL_ENV) {
        if !url.trim().is_empty() {
            info!(base_url = %url, "Jira site overridden from environment");
            config.jira.base_url = url.trim().to_owned();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &CliConfig) -> Result<()> {
    let base_url = config.jira.base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        error!(base_url, "Jira base_url must be an http(s) URL");
        return Err(anyhow::anyhow!(
            "jira.base_url must start with http:// or https://, got {base_url:?}"
        ));
    }
    if config.export.concurrency == 0 {
        error!("export.concurrency must be at least 1");
        return Err(anyhow::anyhow!("export.concurrency must be at least 1"));
    }
    if config.style.page_width <= config.style.margin_left + config.style.margin_right
        || config.style.page_height <= config.style.margin_top + config.style.margin_bottom
    {
        error!(?config.style, "Page margins leave no content area");
        return Err(anyhow::anyhow!("style margins leave no room for content"));
    }
    Ok(())
}

///
/// This module implements the CLI interface for jira-export: command parsing,
/// argument validation and the async entrypoint used by `main` and the tests.
///
/// All export logic (canonicalization, layout, renderers, bulk orchestration)
/// lives in the [`jira-export-core`] crate. This module only wires the Jira
/// client, the loaded config and the output writer together.
///
/// ## How To Use
/// - For command-line users: `jira-export export --config export.yaml PROJ-1 PROJ-2`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`jira-export-core`]: ../../jira-export-core/
use crate::jira::JiraClient;
use crate::load_config::{load_config, CliConfig};
use crate::output::write_outputs;
use anyhow::Result;
use clap::{Parser, Subcommand};
use jira_export_core::{ExportConfig, ExportFormat, Exporter, RenderOptions};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

lazy_static! {
    static ref ISSUE_KEY: Regex = Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").unwrap();
}

/// CLI for jira-export: render Jira issues as PDF, DOCX or Markdown.
#[derive(Parser)]
#[clap(
    name = "jira-export",
    version,
    about = "Export Jira issues to PDF, DOCX or Markdown documents"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the given issues using the given config file
    Export {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Output format (pdf, docx, md); overrides the config
        #[clap(long)]
        format: Option<ExportFormat>,
        /// Output directory; overrides the config
        #[clap(long)]
        out: Option<PathBuf>,
        /// File with one issue key per line; `#` starts a comment
        #[clap(long)]
        keys_file: Option<PathBuf>,
        /// Issue keys such as PROJ-123
        keys: Vec<String>,
    },
    /// Check that the configured site accepts the credentials in the environment
    Check {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Upper-cases and validates keys, dropping duplicates while keeping first-seen order.
/// Returns the valid keys and the rejected inputs.
pub fn normalize_keys<I, S>(raw: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut valid: Vec<String> = Vec::new();
    let mut invalid = Vec::new();
    for key in raw {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let upper = trimmed.to_uppercase();
        if ISSUE_KEY.is_match(&upper) {
            if !valid.contains(&upper) {
                valid.push(upper);
            }
        } else {
            invalid.push(trimmed.to_owned());
        }
    }
    (valid, invalid)
}

fn read_keys_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read keys file {path:?}: {e}"))?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect())
}

fn client_for(config: &CliConfig) -> Result<JiraClient> {
    JiraClient::new_from_env(
        &config.jira.base_url,
        Duration::from_secs(config.jira.timeout_secs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to construct Jira client: {e}"))
}

async fn export(
    config: PathBuf,
    format: Option<ExportFormat>,
    out: Option<PathBuf>,
    keys_file: Option<PathBuf>,
    keys: Vec<String>,
) -> Result<()> {
    let config = load_config(config)?;

    let mut raw_keys = keys;
    if let Some(path) = keys_file {
        raw_keys.extend(read_keys_file(&path)?);
    }
    let (keys, invalid) = normalize_keys(&raw_keys);
    for key in &invalid {
        tracing::warn!(input = %key, "Skipping invalid issue key");
    }
    if keys.is_empty() {
        return Err(anyhow::anyhow!("No valid issue keys given"));
    }

    let format = format.unwrap_or(config.export.format);
    let out_dir = out.unwrap_or_else(|| config.export.output_dir.clone());
    let options = RenderOptions::new(config.style.clone(), chrono::Local::now().naive_local());
    let exported_at = options.exported_at.clone();

    let client = client_for(&config)?;
    let exporter = Exporter::new(
        client,
        ExportConfig {
            format,
            concurrency: config.export.concurrency,
            embed_images: config.export.embed_images,
            options,
        },
    );

    tracing::info!(command = "export", issues = keys.len(), %format, "Starting export");
    let result = exporter.export_all(&keys).await;
    let manifest = write_outputs(&out_dir, &result, format, &exported_at)?;

    for failure in &manifest.failed {
        eprintln!("{}: {}", failure.issue_key, failure.error);
    }
    println!(
        "Exported {}/{} issues to {}",
        manifest.exported,
        manifest.total,
        out_dir.display()
    );

    if manifest.exported == 0 {
        tracing::error!(command = "export", "Every issue failed to export");
        return Err(anyhow::anyhow!("All {} issues failed to export", manifest.total));
    }
    tracing::info!(command = "export", ?out_dir, "Export complete");
    Ok(())
}

async fn check(config: PathBuf) -> Result<()> {
    let config = load_config(config)?;
    let client = client_for(&config)?;
    match client.myself().await {
        Ok(me) => {
            let name = me
                .get("displayName")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown user");
            tracing::info!(command = "check", user = name, "Credentials accepted");
            println!("Authenticated to {} as {name}", client.base_url());
            Ok(())
        }
        Err(e) => {
            tracing::error!(command = "check", error = %e, "Credential check failed");
            Err(anyhow::anyhow!("Credential check failed: {e}"))
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Export {
            config,
            format,
            out,
            keys_file,
            keys,
        } => export(config, format, out, keys_file, keys).await,
        Commands::Check { config } => check(config).await,
    }
}

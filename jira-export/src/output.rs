//! Writes rendered documents, their assets and a `manifest.json` to the output directory.

use anyhow::{Context, Result};
use jira_export_core::{BulkResult, ExportFormat, RenderOutput};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub exported_at: String,
    pub format: ExportFormat,
    pub total: usize,
    pub exported: usize,
    pub files: Vec<ManifestFile>,
    pub failed: Vec<ManifestFailure>,
}

#[derive(Debug, Serialize)]
pub struct ManifestFile {
    pub issue_key: String,
    pub filename: String,
    pub size: usize,
    pub sha256: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ManifestFailure {
    pub issue_key: String,
    pub error: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {parent:?}"))?;
    }
    fs::write(path, bytes).map_err(|e| {
        error!(error = ?e, path = ?path, "Failed to write output file");
        anyhow::anyhow!("Failed to write {path:?}: {e}")
    })
}

fn write_document(dir: &Path, output: &RenderOutput) -> Result<ManifestFile> {
    let path: PathBuf = dir.join(&output.filename);
    write_file(&path, &output.content)?;
    let mut assets = Vec::with_capacity(output.assets.len());
    for asset in &output.assets {
        write_file(&dir.join(&asset.path), &asset.bytes)?;
        assets.push(asset.path.clone());
    }
    info!(
        issue = %output.issue_key,
        path = ?path,
        size = output.size,
        assets = assets.len(),
        "Wrote export"
    );
    Ok(ManifestFile {
        issue_key: output.issue_key.clone(),
        filename: output.filename.clone(),
        size: output.size,
        sha256: sha256_hex(&output.content),
        assets,
    })
}

/// Write every successful export plus the manifest; failures only go into the manifest.
pub fn write_outputs(
    dir: &Path,
    result: &BulkResult,
    format: ExportFormat,
    exported_at: &str,
) -> Result<Manifest> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {dir:?}"))?;

    let files = result
        .successful
        .iter()
        .map(|output| write_document(dir, output))
        .collect::<Result<Vec<_>>>()?;

    let manifest = Manifest {
        exported_at: exported_at.to_owned(),
        format,
        total: result.total(),
        exported: result.exported(),
        files,
        failed: result
            .failed
            .iter()
            .map(|f| ManifestFailure {
                issue_key: f.issue_key.clone(),
                error: f.error.clone(),
            })
            .collect(),
    };

    let json = serde_json::to_vec_pretty(&manifest)?;
    write_file(&dir.join(MANIFEST_FILE), &json)?;
    info!(
        dir = ?dir,
        exported = manifest.exported,
        failed = manifest.failed.len(),
        "Wrote manifest"
    );
    Ok(manifest)
}

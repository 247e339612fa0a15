//! High-level pipeline: orchestrates fetch → canonicalize → render for many issues.
//!
//! [`Exporter::export_all`] runs the pipeline for every requested key and
//! aggregates a [`BulkResult`]. A failure on one issue is recorded and the
//! batch moves on; the batch itself never fails.
//!
//! # Responsibilities
//! - Fetch the field-name lookup once per batch (a failure there is logged and
//!   the batch continues with the names embedded in each payload)
//! - Resolve image attachment bytes; a failed download becomes a placeholder
//!   in the rendered document, never an issue failure
//! - Keep results in input order regardless of the configured fan-out
//!
//! # Navigation
//! - Main entrypoint: [`Exporter::export_all`]
//! - Single issue: [`Exporter::export_one`]

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::contract::{IssueSource, SourceError};
use crate::custom_fields::FieldNames;
use crate::images::ResolvedImages;
use crate::issue::{canonicalize, CanonicalizeError, IssueDocument};
use crate::render::{render, ExportFormat, RenderError, RenderOptions, RenderOutput};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: SourceError,
    },
    #[error("failed to read {key}: {source}")]
    Canonicalize {
        key: String,
        #[source]
        source: CanonicalizeError,
    },
    #[error("failed to render {key}: {source}")]
    Render {
        key: String,
        #[source]
        source: RenderError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Issues processed at once; results keep input order either way.
    pub concurrency: usize,
    /// When false, image attachments are not downloaded and render as placeholders.
    pub embed_images: bool,
    pub options: RenderOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            concurrency: 1,
            embed_images: true,
            options: RenderOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub issue_key: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BulkResult {
    pub successful: Vec<RenderOutput>,
    pub failed: Vec<ExportFailure>,
}

impl BulkResult {
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn exported(&self) -> usize {
        self.successful.len()
    }
}

pub struct Exporter<S> {
    source: S,
    config: ExportConfig,
}

impl<S> Exporter<S>
where
    S: IssueSource,
{
    pub fn new(source: S, config: ExportConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub async fn export_all<K>(&self, keys: &[K]) -> BulkResult
    where
        K: AsRef<str>,
    {
        info!(
            issues = keys.len(),
            format = %self.config.format,
            concurrency = self.config.concurrency,
            "[EXPORT] Starting bulk export"
        );
        let lookup = self.load_field_names().await;

        let outcomes: Vec<(String, Result<RenderOutput, ExportError>)> = stream::iter(keys)
            .map(|key| {
                let key = key.as_ref().to_owned();
                let lookup = lookup.as_ref();
                async move {
                    let outcome = self.export_with(&key, lookup).await;
                    (key, outcome)
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut result = BulkResult::default();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(output) => result.successful.push(output),
                Err(e) => {
                    error!(issue = %key, error = %e, "[EXPORT][ERROR] Issue export failed");
                    result.failed.push(ExportFailure {
                        issue_key: key,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            total = result.total(),
            exported = result.exported(),
            failed = result.failed.len(),
            "[EXPORT] Bulk export finished"
        );
        result
    }

    /// Export a single issue, fetching the field-name lookup for it alone.
    pub async fn export_one(&self, key: &str) -> Result<RenderOutput, ExportError> {
        let lookup = self.load_field_names().await;
        self.export_with(key, lookup.as_ref()).await
    }

    async fn load_field_names(&self) -> Option<FieldNames> {
        match self.source.field_names().await {
            Ok(names) => {
                debug!(fields = names.len(), "[EXPORT] Loaded field names");
                Some(names)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "[EXPORT] Could not load field names, using names embedded in issues"
                );
                None
            }
        }
    }

    async fn export_with(
        &self,
        key: &str,
        lookup: Option<&FieldNames>,
    ) -> Result<RenderOutput, ExportError> {
        info!(issue = %key, "[EXPORT] Fetching issue");
        let raw = self.source.fetch_issue(key).await.map_err(|source| ExportError::Fetch {
            key: key.to_owned(),
            source,
        })?;
        let doc = canonicalize(&raw, lookup).map_err(|source| ExportError::Canonicalize {
            key: key.to_owned(),
            source,
        })?;
        let images = self.resolve_images(&doc).await;
        render(&doc, &images, self.config.format, &self.config.options).map_err(|source| {
            ExportError::Render {
                key: key.to_owned(),
                source,
            }
        })
    }

    async fn resolve_images(&self, doc: &IssueDocument) -> ResolvedImages {
        let mut resolved = ResolvedImages::new();
        if !self.config.embed_images {
            return resolved;
        }
        for attachment in doc.image_attachments() {
            if resolved.contains_key(&attachment.content_url) {
                continue;
            }
            match self.source.fetch_attachment(&attachment.content_url).await {
                Ok(bytes) => {
                    debug!(
                        issue = %doc.key,
                        filename = %attachment.filename,
                        bytes = bytes.len(),
                        "[EXPORT] Fetched image"
                    );
                    resolved.insert(attachment.content_url.clone(), bytes);
                }
                Err(e) => {
                    warn!(
                        issue = %doc.key,
                        filename = %attachment.filename,
                        error = %e,
                        "[EXPORT] Image download failed, using placeholder"
                    );
                }
            }
        }
        resolved
    }
}

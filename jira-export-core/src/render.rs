//! Single entry point from an [`IssueDocument`] to encoded bytes.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::images::ResolvedImages;
use crate::issue::IssueDocument;
use crate::layout::Layout;
use crate::style::Style;
use crate::{docx, markdown, pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    #[serde(alias = "word")]
    Docx,
    #[serde(alias = "markdown")]
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Md => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => pdf::MIME,
            ExportFormat::Docx => docx::MIME,
            ExportFormat::Md => markdown::MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown export format {0:?}, expected one of pdf, docx, md")]
pub struct FormatParseError(pub String);

impl FromStr for ExportFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" | "word" => Ok(ExportFormat::Docx),
            "md" | "markdown" => Ok(ExportFormat::Md),
            _ => Err(FormatParseError(s.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write docx package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("i/o error while encoding: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub style: Style,
    /// Footer timestamp, already in display form.
    pub exported_at: String,
}

impl RenderOptions {
    pub fn new(style: Style, exported_at: NaiveDateTime) -> Self {
        Self {
            style,
            exported_at: exported_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(Style::default(), Local::now().naive_local())
    }
}

/// A side file that belongs next to the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Path relative to the output directory.
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub issue_key: String,
    pub content: Vec<u8>,
    pub size: usize,
    pub format: ExportFormat,
    pub filename: String,
    /// Only the Markdown format produces assets (its images).
    pub assets: Vec<Asset>,
}

impl RenderOutput {
    fn new(issue_key: &str, content: Vec<u8>, format: ExportFormat, assets: Vec<Asset>) -> Self {
        Self {
            issue_key: issue_key.to_owned(),
            size: content.len(),
            content,
            format,
            filename: format!("{issue_key}.{}", format.extension()),
            assets,
        }
    }
}

pub fn render(
    doc: &IssueDocument,
    images: &ResolvedImages,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<RenderOutput, RenderError> {
    debug!(issue = %doc.key, %format, images = images.len(), "render_start");
    let output = match format {
        ExportFormat::Pdf => {
            let layout = Layout::build(doc, images, &options.style, &options.exported_at);
            let title = format!("{} - {}", doc.key, doc.summary);
            let bytes = pdf::encode(&layout, &options.style, &title);
            RenderOutput::new(&doc.key, bytes, format, Vec::new())
        }
        ExportFormat::Docx => {
            let bytes = docx::encode(doc, images, &options.style, &options.exported_at)?;
            RenderOutput::new(&doc.key, bytes, format, Vec::new())
        }
        ExportFormat::Md => {
            let (text, assets) =
                markdown::encode(doc, images, &options.style, &options.exported_at);
            RenderOutput::new(&doc.key, text.into_bytes(), format, assets)
        }
    };
    info!(issue = %doc.key, %format, size = output.size, "render_complete");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively_with_aliases() {
        assert_eq!("PDF".parse(), Ok(ExportFormat::Pdf));
        assert_eq!("word".parse(), Ok(ExportFormat::Docx));
        assert_eq!(" Markdown ".parse(), Ok(ExportFormat::Md));
        assert_eq!("html".parse::<ExportFormat>(), Err(FormatParseError("html".to_owned())));
    }

    #[test]
    fn exported_at_is_minute_precision() {
        let at = NaiveDateTime::parse_from_str("2024-03-01 09:15:59", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(RenderOptions::new(Style::default(), at).exported_at, "2024-03-01 09:15");
    }
}

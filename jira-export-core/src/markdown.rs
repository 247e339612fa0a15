//! Markdown export: YAML front matter, an overview table, the same sections
//! as the PDF layout, and a footer. Images are written next to the document
//! under `images/` and returned as assets.

use serde_json::Value;
use tracing::warn;

use crate::format::{format_optional_timestamp, format_size, truncate_chars};
use crate::images::{self, ResolvedImages};
use crate::issue::IssueDocument;
use crate::render::Asset;
use crate::sections;
use crate::style::Style;

pub const MIME: &str = "text/markdown";
pub const IMAGE_DIR: &str = "images";

/// Relative path of an embedded image, unique per issue.
pub fn image_path(key: &str, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{IMAGE_DIR}/{key}-{safe}")
}

fn yaml_string(value: &str) -> String {
    Value::from(value).to_string()
}

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', "<br>")
}

pub fn encode(
    doc: &IssueDocument,
    resolved: &ResolvedImages,
    style: &Style,
    exported_at: &str,
) -> (String, Vec<Asset>) {
    let mut out = String::new();
    let mut assets = Vec::new();

    out.push_str("---\n");
    out.push_str(&format!("key: {}\n", yaml_string(&doc.key)));
    out.push_str(&format!("summary: {}\n", yaml_string(&doc.summary)));
    out.push_str(&format!("type: {}\n", yaml_string(&doc.issue_type)));
    out.push_str(&format!("status: {}\n", yaml_string(&doc.status.name)));
    out.push_str(&format!("priority: {}\n", yaml_string(&doc.priority)));
    if !doc.labels.is_empty() {
        let labels: Vec<String> = doc.labels.iter().map(|l| yaml_string(l)).collect();
        out.push_str(&format!("labels: [{}]\n", labels.join(", ")));
    }
    out.push_str(&format!("exported: {}\n", yaml_string(exported_at)));
    out.push_str("---\n\n");

    out.push_str(&format!("# [{}] {}\n\n", doc.key, doc.summary));

    out.push_str("| Field | Value |\n|---|---|\n");
    out.push_str(&format!("| Type | {} |\n", cell(&doc.issue_type)));
    out.push_str(&format!("| Status | {} |\n", cell(&doc.status.name)));
    out.push_str(&format!("| Priority | {} |\n", cell(&doc.priority)));
    for (label, value) in sections::detail_entries(doc) {
        out.push_str(&format!("| {label} | {} |\n", cell(&value)));
    }
    out.push('\n');

    if !doc.description.trim().is_empty() {
        out.push_str(&format!("## {}\n\n{}\n\n", sections::DESCRIPTION, doc.description.trim()));
    }

    if !doc.custom_fields.is_empty() {
        out.push_str(&format!("## {}\n\n", sections::CUSTOM_FIELDS));
        for (name, value) in &doc.custom_fields {
            out.push_str(&format!("- **{name}**: {}\n", value.replace('\n', "\n  ")));
        }
        out.push('\n');
    }

    let image_attachments: Vec<_> = doc.image_attachments().collect();
    if !image_attachments.is_empty() {
        out.push_str(&format!("## {}\n\n", sections::IMAGES));
        for attachment in image_attachments {
            match resolved.get(&attachment.content_url) {
                Some(bytes) => match images::decode(bytes) {
                    Ok(_) => {
                        let path = image_path(&doc.key, &attachment.filename);
                        out.push_str(&format!("![{}]({})\n\n", attachment.filename, path));
                        assets.push(Asset { path, bytes: bytes.clone() });
                    }
                    Err(e) => {
                        warn!(
                            issue = %doc.key,
                            filename = %attachment.filename,
                            error = %e,
                            "image_decode_failed"
                        );
                        let placeholder = sections::broken_image_text(&attachment.filename);
                        out.push_str(&format!("*{placeholder}*\n\n"));
                    }
                },
                None => {
                    let placeholder = sections::missing_image_text(&attachment.filename);
                    out.push_str(&format!("*{placeholder}*\n\n"));
                }
            }
        }
    }

    if !doc.attachments.is_empty() {
        out.push_str(&format!("## {} ({})\n\n", sections::ATTACHMENTS, doc.attachments.len()));
        for attachment in &doc.attachments {
            out.push_str(&format!("- {} ({})", attachment.filename, format_size(attachment.size)));
            if let Some(author) = &attachment.author {
                out.push_str(&format!(
                    " - {author}, {}",
                    format_optional_timestamp(attachment.created.as_deref())
                ));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !doc.subtasks.is_empty() {
        out.push_str(&format!("## {}\n\n", sections::SUBTASKS));
        for subtask in &doc.subtasks {
            let (summary, cut) = truncate_chars(&subtask.summary, style.subtask_summary_chars);
            let ellipsis = if cut { "..." } else { "" };
            out.push_str(
                &format!("- **{}** {summary}{ellipsis} ({})\n", subtask.key, subtask.status),
            );
        }
        out.push('\n');
    }

    if !doc.links.is_empty() {
        out.push_str(&format!("## {}\n\n", sections::LINKS));
        for link in &doc.links {
            let (summary, cut) = truncate_chars(&link.summary, style.link_summary_chars);
            let ellipsis = if cut { "..." } else { "" };
            out.push_str(&format!("- {} **{}** {summary}{ellipsis}\n", link.relation, link.key));
        }
        out.push('\n');
    }

    if !doc.comments.is_empty() {
        out.push_str(&format!("## {} ({})\n\n", sections::COMMENTS, doc.comments.len()));
        for comment in doc.comments.iter().take(style.max_comments) {
            out.push_str(&format!(
                "### {} - {}\n\n",
                comment.author,
                format_optional_timestamp(comment.created.as_deref())
            ));
            let (body, cut) = truncate_chars(comment.body.trim(), style.comment_char_budget);
            out.push_str(body.trim_end());
            if cut {
                out.push_str("...");
            }
            out.push_str("\n\n");
        }
        let omitted = doc.comments.len().saturating_sub(style.max_comments);
        if omitted > 0 {
            out.push_str(&format!("*{}*\n\n", sections::omitted_comments_text(omitted)));
        }
    }

    out.push_str("---\n\n");
    out.push_str(&format!("*Exported: {exported_at} | {}*", doc.key));
    if let Some(url) = doc.self_url.as_deref().and_then(|u| browse_url(u, &doc.key)) {
        out.push_str(&format!(" | [View in Jira]({url})"));
    }
    out.push('\n');

    (out, assets)
}

/// Browse link derived from the issue's REST `self` url.
fn browse_url(self_url: &str, key: &str) -> Option<String> {
    let (site, _) = self_url.split_once("/rest/api/")?;
    Some(format!("{}/browse/{key}", site.trim_end_matches('/')))
}

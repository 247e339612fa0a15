//! Section vocabulary shared by the PDF, DOCX and Markdown encoders, so the
//! three formats agree on which fields appear and in what order.

use crate::format::{format_points, format_timestamp};
use crate::issue::IssueDocument;

pub const DETAILS: &str = "Details";
pub const DESCRIPTION: &str = "Description";
pub const CUSTOM_FIELDS: &str = "Additional fields";
pub const IMAGES: &str = "Images";
pub const ATTACHMENTS: &str = "Attachments";
pub const SUBTASKS: &str = "Subtasks";
pub const LINKS: &str = "Linked issues";
pub const COMMENTS: &str = "Comments";

pub const TRUNCATION_MARKER: &str = "[...]";

/// Sections in their fixed output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Title,
    Status,
    Details,
    Description,
    CustomFields,
    Images,
    Attachments,
    Subtasks,
    Links,
    Comments,
    Footer,
}

/// Label/value pairs of the detail grid, present fields only, in grid order.
pub fn detail_entries(doc: &IssueDocument) -> Vec<(&'static str, String)> {
    let mut entries = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            entries.push((label, value));
        }
    };
    let joined = |items: &[String]| (!items.is_empty()).then(|| items.join(", "));

    push("Assignee", doc.assignee.clone());
    push("Reporter", doc.reporter.clone());
    push("Fix versions", joined(&doc.fix_versions));
    push("Components", joined(&doc.components));
    push("Labels", joined(&doc.labels));
    push("Sprint", joined(&doc.sprints));
    push("Story points", doc.story_points.map(format_points));
    push("Epic", doc.epic.clone());
    push(
        "Parent",
        doc.parent
            .as_ref()
            .map(|p| format!("{} - {}", p.key, p.summary)),
    );
    push("Created", doc.created.as_deref().map(format_timestamp));
    push("Updated", doc.updated.as_deref().map(format_timestamp));
    push("Resolved", doc.resolved.as_deref().map(format_timestamp));
    entries
}

pub fn missing_image_text(filename: &str) -> String {
    format!("[Image not available: {filename}]")
}

pub fn broken_image_text(filename: &str) -> String {
    format!("[Image could not be embedded: {filename}]")
}

pub fn omitted_comments_text(omitted: usize) -> String {
    if omitted == 1 {
        "... 1 more comment not shown".to_owned()
    } else {
        format!("... {omitted} more comments not shown")
    }
}

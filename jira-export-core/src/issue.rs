//! Canonical issue document and the canonicalizer that builds it from a raw
//! Jira REST v3 payload.
//!
//! The canonical document is the only shape the renderers see. It is built
//! once per export request and never mutated afterwards.
//!
//! # Planning-field heuristic
//! Story points and epic are found by scanning the raw custom fields in
//! payload order and testing whether the JSON-ish form of each entry
//! (`"<display name>": <value>`) contains one of a few search terms. The first
//! hit wins. Because the value is part of the haystack, a field whose content
//! merely mentions "story points" can win over the real one. That imprecision
//! and its order dependence are kept as they are.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::adf;
use crate::custom_fields::{self, is_custom_field, resolve_name, FieldNames};
use crate::markup;

const STORY_POINT_TERMS: [&str; 3] = ["story points", "storypoints", "story point estimate"];
const EPIC_TERMS: [&str; 3] = ["epic link", "epic name", "parent epic"];
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

lazy_static! {
    static ref LEGACY_SPRINT_NAME: Regex = Regex::new(r"name=([^,\]]+)").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonicalizeError {
    #[error("issue payload is not a JSON object")]
    NotAnObject,
    #[error("issue payload has no string `key`")]
    MissingKey,
    #[error("issue {0} has no `fields` object")]
    MissingFields(String),
}

/// Coarse colour classification of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusTone {
    Resolved,
    InProgress,
    Neutral,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Status {
    pub name: String,
    /// Jira status category (`To Do`, `In Progress`, `Done`), used only for colour.
    pub category: Option<String>,
}

impl Status {
    pub fn new(name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            category: category.map(str::to_owned),
        }
    }

    pub fn tone(&self) -> StatusTone {
        let name = self.name.to_lowercase();
        let category = self.category.as_deref().unwrap_or_default().to_lowercase();
        if category == "done"
            || ["done", "closed", "resolved"]
                .iter()
                .any(|word| name.contains(word))
        {
            StatusTone::Resolved
        } else if name.contains("progress")
            || category.contains("progress")
            || category == "indeterminate"
        {
            StatusTone::InProgress
        } else {
            StatusTone::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRef {
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtask {
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLink {
    /// Directional label such as "blocks" or "is blocked by".
    pub relation: String,
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    /// Where the bytes can be fetched from (the `content` url).
    pub content_url: String,
    pub author: Option<String>,
    pub created: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        if self.mime_type.to_lowercase().starts_with("image/") {
            return true;
        }
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created: Option<String>,
}

/// Render-ready representation of one issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueDocument {
    pub key: String,
    pub self_url: Option<String>,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    pub status: Status,
    pub priority: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolved: Option<String>,
    pub fix_versions: Vec<String>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
    pub story_points: Option<f64>,
    pub sprints: Vec<String>,
    pub epic: Option<String>,
    pub parent: Option<IssueRef>,
    pub subtasks: Vec<Subtask>,
    pub links: Vec<IssueLink>,
    pub attachments: Vec<Attachment>,
    pub comments: Vec<Comment>,
    pub custom_fields: IndexMap<String, String>,
}

impl IssueDocument {
    pub fn image_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| a.is_image())
    }
}

/// Map a raw issue payload onto the canonical document.
///
/// `lookup` resolves custom field ids to display names. When it is `None` the
/// payload's own `names` map (present with `expand=names`) is used, and failing
/// that the raw ids are shown.
pub fn canonicalize(
    raw: &Value,
    lookup: Option<&FieldNames>,
) -> Result<IssueDocument, CanonicalizeError> {
    let root = raw.as_object().ok_or(CanonicalizeError::NotAnObject)?;
    let key = root
        .get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or(CanonicalizeError::MissingKey)?
        .to_owned();
    let fields = root
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| CanonicalizeError::MissingFields(key.clone()))?;

    let embedded: Option<FieldNames> = root.get("names").and_then(Value::as_object).map(|names| {
        names
            .iter()
            .filter_map(|(id, name)| name.as_str().map(|n| (id.clone(), n.to_owned())))
            .collect()
    });
    let lookup = lookup.or(embedded.as_ref());

    let status = Status {
        name: str_at(fields, &["status", "name"]).unwrap_or_else(|| "Unknown".into()),
        category: str_at(fields, &["status", "statusCategory", "name"])
            .or_else(|| str_at(fields, &["status", "statusCategory", "key"])),
    };

    let doc = IssueDocument {
        self_url: root.get("self").and_then(Value::as_str).map(str::to_owned),
        summary: str_at(fields, &["summary"]).unwrap_or_default(),
        description: body_text(fields.get("description")),
        issue_type: str_at(fields, &["issuetype", "name"]).unwrap_or_else(|| "Unknown".into()),
        status,
        priority: str_at(fields, &["priority", "name"]).unwrap_or_else(|| "None".into()),
        assignee: str_at(fields, &["assignee", "displayName"]),
        reporter: str_at(fields, &["reporter", "displayName"]),
        created: str_at(fields, &["created"]),
        updated: str_at(fields, &["updated"]),
        resolved: str_at(fields, &["resolutiondate"]),
        fix_versions: names_of(fields.get("fixVersions")),
        components: names_of(fields.get("components")),
        labels: fields
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        story_points: find_custom_field(fields, lookup, &STORY_POINT_TERMS).and_then(as_points),
        sprints: extract_sprints(fields, lookup),
        epic: find_custom_field(fields, lookup, &EPIC_TERMS).and_then(as_display),
        parent: fields.get("parent").filter(|p| p.is_object()).map(|p| IssueRef {
            key: str_at_value(p, &["key"]).unwrap_or_default(),
            summary: str_at_value(p, &["fields", "summary"]).unwrap_or_default(),
        }),
        subtasks: array_at(fields, "subtasks")
            .map(|st| Subtask {
                key: str_at_value(st, &["key"]).unwrap_or_default(),
                summary: str_at_value(st, &["fields", "summary"]).unwrap_or_default(),
                status: str_at_value(st, &["fields", "status", "name"])
                    .unwrap_or_else(|| "Unknown".into()),
            })
            .collect(),
        links: parse_links(fields),
        attachments: array_at(fields, "attachment")
            .map(|att| Attachment {
                filename: str_at_value(att, &["filename"]).unwrap_or_default(),
                size: att.get("size").and_then(Value::as_u64).unwrap_or(0),
                mime_type: str_at_value(att, &["mimeType"]).unwrap_or_default(),
                content_url: str_at_value(att, &["content"]).unwrap_or_default(),
                author: str_at_value(att, &["author", "displayName"]),
                created: str_at_value(att, &["created"]),
            })
            .collect(),
        comments: fields
            .get("comment")
            .and_then(|c| c.get("comments"))
            .and_then(Value::as_array)
            .map(|comments| {
                comments
                    .iter()
                    .map(|c| Comment {
                        author: str_at_value(c, &["author", "displayName"])
                            .unwrap_or_else(|| "Unknown".into()),
                        body: body_text(c.get("body")),
                        created: str_at_value(c, &["created"]),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        custom_fields: custom_fields::normalize(fields, lookup),
        key,
    };

    debug!(
        issue_key = %doc.key,
        attachments = doc.attachments.len(),
        comments = doc.comments.len(),
        custom_fields = doc.custom_fields.len(),
        "Canonicalized issue"
    );
    Ok(doc)
}

/// First custom field whose `"name": value` form contains one of `terms`.
///
/// Objects are unwrapped to their `value`, then `name`; otherwise the raw
/// matched value is returned.
pub fn find_custom_field<'a>(
    fields: &'a Map<String, Value>,
    lookup: Option<&FieldNames>,
    terms: &[&str],
) -> Option<&'a Value> {
    for (key, value) in fields {
        if !is_custom_field(key) || value.is_null() {
            continue;
        }
        let name = resolve_name(key, lookup);
        let haystack = format!("{}: {}", Value::from(name), value).to_lowercase();
        if terms.iter().any(|term| haystack.contains(term)) {
            return Some(unwrap_preferred(value));
        }
    }
    None
}

fn unwrap_preferred(value: &Value) -> &Value {
    if let Value::Object(map) = value {
        for attr in ["value", "name"] {
            match map.get(attr) {
                Some(inner) if !inner.is_null() => return inner,
                _ => {}
            }
        }
    }
    value
}

fn as_points(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_display(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => custom_fields::number_to_string(n),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn extract_sprints(fields: &Map<String, Value>, lookup: Option<&FieldNames>) -> Vec<String> {
    let mut sprints = Vec::new();
    for (key, value) in fields {
        if !is_custom_field(key) || !resolve_name(key, lookup).to_lowercase().contains("sprint") {
            continue;
        }
        let Some(items) = value.as_array() else {
            continue;
        };
        for item in items {
            match item {
                Value::Object(_) => sprints.push(
                    str_at_value(item, &["name"]).unwrap_or_else(|| "Unknown".into()),
                ),
                Value::String(s) => sprints.push(legacy_sprint_name(s)),
                _ => {}
            }
        }
    }
    sprints
}

/// Sprint values from older Jira servers are `toString()` dumps such as
/// `com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=1,name=Sprint 4,...]`.
fn legacy_sprint_name(raw: &str) -> String {
    LEGACY_SPRINT_NAME
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| raw.to_owned())
}

fn parse_links(fields: &Map<String, Value>) -> Vec<IssueLink> {
    let mut links = Vec::new();
    for link in array_at(fields, "issuelinks") {
        for (side, label_key) in [("outwardIssue", "outward"), ("inwardIssue", "inward")] {
            if let Some(other) = link.get(side).filter(|v| v.is_object()) {
                links.push(IssueLink {
                    relation: str_at_value(link, &["type", label_key])
                        .unwrap_or_else(|| "relates to".into()),
                    key: str_at_value(other, &["key"]).unwrap_or_default(),
                    summary: str_at_value(other, &["fields", "summary"]).unwrap_or_default(),
                });
            }
        }
    }
    links
}

fn body_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => markup::clean_wiki_markup(s),
        other => adf::flatten_value(other).trim().to_owned(),
    }
}

fn names_of(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| str_at_value(item, &["name"]))
                .collect()
        })
        .unwrap_or_default()
}

fn array_at<'a>(fields: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn str_at(fields: &Map<String, Value>, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    str_at_value(fields.get(*first)?, rest)
}

fn str_at_value(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for segment in path {
        current = current.get(*segment)?;
    }
    current.as_str().map(str::to_owned)
}

//! Atlassian Document Format (ADF) → linear text.
//!
//! Descriptions and comment bodies arrive from Jira as a tree of typed nodes
//! (`doc`, `paragraph`, `bulletList`, ...). This module parses that tree into
//! a closed [`Node`] type and flattens it into plain text suitable for layout.
//!
//! # Flattening rules
//! - `text` → literal content
//! - `paragraph` → children + newline
//! - `heading` → newline, `#` × level, space, children, newline
//! - `bulletList` / `orderedList` → one line per item, with `• ` or `N. ` markers
//! - `codeBlock` → children wrapped in a fenced block
//! - `mention` → `@` + display text (`@user` when absent)
//! - anything unknown → its children, concatenated
//!
//! The walk is iterative, so flattening depth is bounded by memory rather than
//! by the call stack. Trees are owned and therefore acyclic; a cyclic input
//! cannot be built and is not guarded against.

use serde_json::Value;

/// Marker placed in front of every bullet-list item.
pub const BULLET: &str = "• ";
/// Fence used around flattened code blocks.
pub const CODE_FENCE: &str = "```";

/// The kind of one rich-text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Paragraph,
    /// Level is clamped to 1..=6.
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    CodeBlock,
    HardBreak,
    Mention(Option<String>),
    Blockquote,
    Emoji(Option<String>),
    /// `inlineCard` / `blockCard` with their target url.
    Card(Option<String>),
    /// `mediaGroup` / `mediaSingle`; the binary itself is listed as an attachment.
    Media,
    /// Any other node type, including the `doc` root.
    Other(String),
}

/// One node of a rich-text tree. Children are exclusively owned and ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(content.into()), Vec::new())
    }

    /// Parse an ADF JSON object into a node tree.
    ///
    /// Never fails: missing `type` becomes [`NodeKind::Other`], missing
    /// `content` becomes no children. Recursion follows the JSON nesting, which
    /// serde_json already bounds when parsing from text.
    pub fn from_value(value: &Value) -> Node {
        let kind_name = value.get("type").and_then(Value::as_str).unwrap_or("");
        let attr = |name: &str| {
            value
                .get("attrs")
                .and_then(|a| a.get(name))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        let kind = match kind_name {
            "text" => NodeKind::Text(
                value
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            ),
            "paragraph" => NodeKind::Paragraph,
            "heading" => {
                let level = value
                    .get("attrs")
                    .and_then(|a| a.get("level"))
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .clamp(1, 6) as u8;
                NodeKind::Heading(level)
            }
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            "codeBlock" => NodeKind::CodeBlock,
            "hardBreak" => NodeKind::HardBreak,
            "mention" => NodeKind::Mention(attr("text")),
            "blockquote" => NodeKind::Blockquote,
            "emoji" => NodeKind::Emoji(attr("text").or_else(|| attr("shortName"))),
            "inlineCard" | "blockCard" => NodeKind::Card(attr("url")),
            "mediaGroup" | "mediaSingle" => NodeKind::Media,
            other => NodeKind::Other(other.to_owned()),
        };

        let children = match value.get("content").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter(|item| item.is_object())
                .map(Node::from_value)
                .collect(),
            None => Vec::new(),
        };

        Node::new(kind, children)
    }
}

impl Drop for Node {
    // Unlink children onto a heap stack so very deep trees drop without recursion.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Rich-text input as it appears in issue payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichText {
    /// A bare string body (API v2 or wiki markup); passed through unchanged.
    Plain(String),
    Doc(Node),
}

impl RichText {
    pub fn from_value(value: &Value) -> Option<RichText> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(RichText::Plain(s.clone())),
            Value::Object(_) => Some(RichText::Doc(Node::from_value(value))),
            other => Some(RichText::Plain(other.to_string())),
        }
    }

    pub fn flatten(&self) -> String {
        match self {
            RichText::Plain(s) => s.clone(),
            RichText::Doc(node) => flatten(node),
        }
    }
}

/// Flatten an optional JSON body: absent → empty, string → itself, ADF → text.
pub fn flatten_value(value: Option<&Value>) -> String {
    value
        .and_then(RichText::from_value)
        .map(|rt| rt.flatten())
        .unwrap_or_default()
}

/// Whether a JSON value looks like an ADF document root.
pub fn is_document(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("doc") && value.get("content").is_some()
}

enum Step<'a> {
    Visit(&'a Node),
    Emit(&'static str),
    /// Start capturing output for one list item.
    Open,
    /// Stop capturing, trim, and append behind the marker.
    CloseItem(ItemMarker),
}

#[derive(Clone, Copy)]
enum ItemMarker {
    Bullet,
    Ordinal(usize),
}

/// Flatten a node tree into text. Total over every well-formed tree.
pub fn flatten(root: &Node) -> String {
    let mut buffers: Vec<String> = vec![String::new()];
    let mut steps: Vec<Step<'_>> = vec![Step::Visit(root)];

    while let Some(step) = steps.pop() {
        match step {
            Step::Emit(s) => current(&mut buffers).push_str(s),
            Step::Open => buffers.push(String::new()),
            Step::CloseItem(marker) => {
                let item = buffers.pop().unwrap_or_default();
                let out = current(&mut buffers);
                match marker {
                    ItemMarker::Bullet => out.push_str(BULLET),
                    ItemMarker::Ordinal(n) => {
                        out.push_str(&n.to_string());
                        out.push_str(". ");
                    }
                }
                out.push_str(item.trim());
                out.push('\n');
            }
            Step::Visit(node) => match &node.kind {
                NodeKind::Text(s) => current(&mut buffers).push_str(s),
                NodeKind::Paragraph => {
                    steps.push(Step::Emit("\n"));
                    push_children(&mut steps, node);
                }
                NodeKind::Heading(level) => {
                    let out = current(&mut buffers);
                    out.push('\n');
                    out.push_str(&"#".repeat(*level as usize));
                    out.push(' ');
                    steps.push(Step::Emit("\n"));
                    push_children(&mut steps, node);
                }
                NodeKind::BulletList | NodeKind::OrderedList => {
                    let ordered = node.kind == NodeKind::OrderedList;
                    for (idx, item) in node.children.iter().enumerate().rev() {
                        let marker = if ordered {
                            ItemMarker::Ordinal(idx + 1)
                        } else {
                            ItemMarker::Bullet
                        };
                        steps.push(Step::CloseItem(marker));
                        push_children(&mut steps, item);
                        steps.push(Step::Open);
                    }
                }
                NodeKind::CodeBlock => {
                    let out = current(&mut buffers);
                    out.push('\n');
                    out.push_str(CODE_FENCE);
                    out.push('\n');
                    steps.push(Step::Emit("\n```\n"));
                    push_children(&mut steps, node);
                }
                NodeKind::HardBreak => current(&mut buffers).push('\n'),
                NodeKind::Mention(text) => {
                    let out = current(&mut buffers);
                    out.push('@');
                    out.push_str(text.as_deref().unwrap_or("user"));
                }
                NodeKind::Blockquote => {
                    current(&mut buffers).push_str("> ");
                    push_children(&mut steps, node);
                }
                NodeKind::Emoji(text) => {
                    current(&mut buffers).push_str(text.as_deref().unwrap_or_default())
                }
                NodeKind::Card(url) => {
                    let out = current(&mut buffers);
                    out.push('[');
                    out.push_str(url.as_deref().unwrap_or_default());
                    out.push(']');
                }
                NodeKind::Media => current(&mut buffers).push_str("[Media]"),
                NodeKind::ListItem | NodeKind::Other(_) => push_children(&mut steps, node),
            },
        }
    }

    buffers.into_iter().next().unwrap_or_default()
}

fn current(buffers: &mut Vec<String>) -> &mut String {
    if buffers.is_empty() {
        buffers.push(String::new());
    }
    let last = buffers.len() - 1;
    &mut buffers[last]
}

fn push_children<'a>(steps: &mut Vec<Step<'a>>, node: &'a Node) {
    for child in node.children.iter().rev() {
        steps.push(Step::Visit(child));
    }
}

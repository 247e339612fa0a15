//! Paginated layout of an [`IssueDocument`].
//!
//! [`Layout::build`] walks the document section by section with a
//! [`PageWriter`], a cursor that tracks the current page and the vertical
//! position measured from the page top. The result is a display list of
//! positioned text runs, rules and images per page, which `pdf::encode`
//! turns into bytes. Positions are millimetres.
//!
//! Visually atomic blocks (a detail row, an image, an attachment line, a
//! comment that fits on one page) call [`PageWriter::ensure_space`] before
//! drawing, so they never straddle a page boundary. Free text flows line by
//! line and may continue on the next page.

use tracing::{debug, warn};

use crate::format::{format_optional_timestamp, format_size, truncate_chars};
use crate::images::{self, DecodedImage, ResolvedImages};
use crate::issue::IssueDocument;
use crate::sections::{self, Section};
use crate::style::{Color, Style};

const ROW_PADDING: f32 = 1.5;
const SECTION_GAP: f32 = 4.0;
const BLOCK_GAP: f32 = 1.5;
const INDENT: f32 = 4.0;
/// Baseline offset within a line box, as a fraction of the line height.
const BASELINE: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Color,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        color: Color,
    },
    /// `y` is the top edge; `image` indexes [`Layout::images`].
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    DetailRow,
    CustomField,
    Image,
    ImagePlaceholder,
    Attachment,
    Subtask,
    Link,
    Comment,
}

/// Vertical extent of one placed block. `top` is on `page`, `bottom` on
/// `end_page`; the two differ only for comments taller than a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub page: usize,
    pub end_page: usize,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub images: Vec<DecodedImage>,
    pub blocks: Vec<Block>,
    pub sections: Vec<Section>,
}

impl Layout {
    /// Lay out `doc`. Images missing from `resolved` or failing to decode are
    /// replaced by a placeholder line; layout itself cannot fail.
    pub fn build(
        doc: &IssueDocument,
        resolved: &ResolvedImages,
        style: &Style,
        exported_at: &str,
    ) -> Layout {
        let mut writer = PageWriter::new(style);
        writer.header(doc);
        writer.title(doc);
        writer.status_line(doc);
        writer.details(doc);
        writer.description(doc);
        writer.custom_fields(doc);
        writer.images(doc, resolved);
        writer.attachments(doc);
        writer.subtasks(doc);
        writer.links(doc);
        writer.comments(doc);
        let layout = writer.finish(&doc.key, exported_at);
        debug!(
            issue = %doc.key,
            pages = layout.pages.len(),
            blocks = layout.blocks.len(),
            "layout_built"
        );
        layout
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    /// All text runs in reading order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

/// Group lines into paragraphs; whitespace-only lines separate them.
fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Keep at most `max` lines; a cut list ends in the truncation marker.
fn cap_lines(mut lines: Vec<String>, max: usize) -> Vec<String> {
    let max = max.max(1);
    if lines.len() > max {
        lines.truncate(max - 1);
        lines.push(sections::TRUNCATION_MARKER.to_owned());
    }
    lines
}

/// Word-wrap `text` to `width` using the style's glyph width estimate.
///
/// Explicit newlines are kept; blank input lines become empty strings.
/// Words longer than a full line are split.
pub fn wrap_text(text: &str, width: f32, size: f32, style: &Style) -> Vec<String> {
    let per_char = style.text_width("x", size);
    let max_chars = if per_char > 0.0 {
        ((width / per_char).floor() as usize).max(1)
    } else {
        usize::MAX
    };

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_chars) {
                    if chunk.len() == max_chars {
                        lines.push(chunk.iter().collect());
                        current_len = 0;
                    } else {
                        current = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
                continue;
            }
            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
                current_len = word_len;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
            }
        }
        if !current.is_empty() || raw_line.trim().is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// A run of text placed on a line, left to right.
struct Run<'a> {
    text: &'a str,
    weight: FontWeight,
    color: Color,
}

/// Cursor over the pages of one document. Never shared between renders.
pub struct PageWriter<'s> {
    style: &'s Style,
    pages: Vec<Page>,
    y: f32,
    blocks: Vec<Block>,
    sections: Vec<Section>,
    images: Vec<DecodedImage>,
}

impl<'s> PageWriter<'s> {
    pub fn new(style: &'s Style) -> Self {
        Self {
            style,
            pages: vec![Page::default()],
            y: style.margin_top,
            blocks: Vec::new(),
            sections: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.style.margin_top;
    }

    /// Start a new page when `needed` does not fit below the cursor.
    ///
    /// A block taller than the whole usable area is not pushed past a fresh
    /// page, which would only leave an empty page behind. Returns whether a
    /// page break happened.
    pub fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y + needed > self.style.bottom_limit() && self.y > self.style.margin_top {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Lines of `line_height` that fit on an empty page next to `extra` mm of padding.
    fn lines_per_page(&self, line_height: f32, extra: f32) -> usize {
        (((self.style.usable_height() - extra) / line_height).floor() as usize).max(1)
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    /// Place text on the line box starting at the cursor without moving it.
    fn put_text(&mut self, x: f32, text: &str, size: f32, weight: FontWeight, color: Color) {
        if text.is_empty() {
            return;
        }
        let baseline = self.y + self.style.line_height(size) * BASELINE;
        self.push(Element::Text {
            x,
            y: baseline,
            size,
            weight,
            color,
            text: text.to_owned(),
        });
    }

    fn put_runs(&mut self, x: f32, runs: &[Run<'_>], size: f32) -> f32 {
        let mut x = x;
        for run in runs {
            self.put_text(x, run.text, size, run.weight, run.color);
            x += self.style.text_width(run.text, size);
        }
        x
    }

    /// Free-flowing wrapped text; may continue on the next page.
    fn flow(
        &mut self,
        text: &str,
        x: f32,
        width: f32,
        size: f32,
        weight: FontWeight,
        color: Color,
    ) {
        let line_height = self.style.line_height(size);
        for line in wrap_text(text, width, size, self.style) {
            self.ensure_space(line_height);
            self.put_text(x, &line, size, weight, color);
            self.y += line_height;
        }
    }

    fn rule(&mut self, color: Color, thickness: f32) {
        let (x1, x2) = (self.style.margin_left, self.style.page_width - self.style.margin_right);
        let y = self.y;
        self.push(Element::Rule { x1, x2, y, thickness, color });
    }

    fn record(&mut self, kind: BlockKind, page: usize, top: f32) {
        self.blocks.push(Block {
            kind,
            page,
            end_page: self.page_index(),
            top,
            bottom: self.y,
        });
    }

    /// Section heading, kept on the same page as the first line after it.
    fn heading(&mut self, section: Section, title: &str) {
        let style = self.style;
        let heading_height = style.line_height(style.heading_size);
        self.y += SECTION_GAP;
        self.ensure_space(heading_height + style.line_height(style.body_size));
        self.put_text(
            style.margin_left,
            title,
            style.heading_size,
            FontWeight::Bold,
            style.palette.text,
        );
        self.y += heading_height + 1.0;
        self.sections.push(section);
    }

    fn header(&mut self, doc: &IssueDocument) {
        let style = self.style;
        let size = style.header_size;
        self.ensure_space(style.line_height(size));
        let prefix = format!("{} | ", doc.issue_type);
        self.put_runs(
            style.margin_left,
            &[
                Run { text: &prefix, weight: FontWeight::Regular, color: style.palette.text_light },
                Run { text: &doc.key, weight: FontWeight::Bold, color: style.palette.primary },
            ],
            size,
        );
        self.y += style.line_height(size) + 1.0;
        self.sections.push(Section::Header);
    }

    fn title(&mut self, doc: &IssueDocument) {
        let style = self.style;
        self.flow(
            &doc.summary,
            style.margin_left,
            style.content_width(),
            style.title_size,
            FontWeight::Bold,
            style.palette.text,
        );
        self.y += 2.0;
        self.sections.push(Section::Title);
    }

    fn status_line(&mut self, doc: &IssueDocument) {
        let style = self.style;
        let size = style.body_size;
        self.ensure_space(style.line_height(size));
        let status_color = style.status_color(doc.status.tone());
        self.put_runs(
            style.margin_left,
            &[
                Run { text: "Status: ", weight: FontWeight::Bold, color: style.palette.text },
                Run { text: &doc.status.name, weight: FontWeight::Bold, color: status_color },
            ],
            size,
        );
        self.put_runs(
            style.margin_left + style.column_width() + style.column_gap,
            &[
                Run { text: "Priority: ", weight: FontWeight::Bold, color: style.palette.text },
                Run { text: &doc.priority, weight: FontWeight::Regular, color: style.palette.text },
            ],
            size,
        );
        self.y += style.line_height(size) + 2.0;
        self.rule(style.palette.border, 0.75);
        self.y += 3.0;
        self.sections.push(Section::Status);
    }

    fn details(&mut self, doc: &IssueDocument) {
        let entries = sections::detail_entries(doc);
        if entries.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::Details, sections::DETAILS);

        let size = style.body_size;
        let line_height = style.line_height(size);
        let value_width = (style.column_width() - style.detail_label_width).max(line_height);
        let column_x = |index: usize| {
            style.margin_left + index as f32 * (style.column_width() + style.column_gap)
        };

        let cell_cap = style
            .custom_field_max_lines
            .min(self.lines_per_page(line_height, ROW_PADDING));

        for row in entries.chunks(2) {
            let cells: Vec<(&str, Vec<String>)> = row
                .iter()
                .map(|(label, value)| {
                    let lines = wrap_text(value, value_width, size, style);
                    (*label, cap_lines(lines, cell_cap))
                })
                .collect();
            let tallest = cells.iter().map(|(_, lines)| lines.len().max(1)).max().unwrap_or(1);
            let row_height = tallest as f32 * line_height + ROW_PADDING;

            self.ensure_space(row_height);
            let (page, top) = (self.page_index(), self.y);
            for (column, (label, lines)) in cells.iter().enumerate() {
                let x = column_x(column);
                self.put_text(
                    x,
                    &format!("{label}:"),
                    style.label_size,
                    FontWeight::Bold,
                    style.palette.text_light,
                );
                for (i, line) in lines.iter().enumerate() {
                    self.y = top + i as f32 * line_height;
                    self.put_text(
                        x + style.detail_label_width,
                        line,
                        size,
                        FontWeight::Regular,
                        style.palette.text,
                    );
                }
                self.y = top;
            }
            self.y = top + row_height;
            self.record(BlockKind::DetailRow, page, top);
        }
    }

    fn description(&mut self, doc: &IssueDocument) {
        let text = doc.description.replace("\r\n", "\n");
        if text.trim().is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::Description, sections::DESCRIPTION);
        for paragraph in paragraphs(&text) {
            let lines: Vec<String> = paragraph
                .into_iter()
                .map(str::trim_end)
                .map(|l| {
                    let start = l.trim_start();
                    match start.strip_prefix("* ").or_else(|| start.strip_prefix("- ")) {
                        Some(rest) => format!("{}{}", crate::adf::BULLET, rest),
                        None => l.to_owned(),
                    }
                })
                .collect();
            self.flow(
                &lines.join("\n"),
                style.margin_left,
                style.content_width(),
                style.body_size,
                FontWeight::Regular,
                style.palette.text,
            );
            self.y += BLOCK_GAP;
        }
    }

    fn custom_fields(&mut self, doc: &IssueDocument) {
        if doc.custom_fields.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::CustomFields, sections::CUSTOM_FIELDS);
        let label_height = style.line_height(style.label_size);
        let line_height = style.line_height(style.body_size);
        let cap = style.custom_field_max_lines;

        for (name, value) in &doc.custom_fields {
            let width = style.content_width() - INDENT;
            let mut lines = wrap_text(value, width, style.body_size, style);
            let truncated = lines.len() > cap;
            lines.truncate(cap);
            let shown = lines.len() + usize::from(truncated);
            let height = label_height + shown as f32 * line_height + BLOCK_GAP;

            self.ensure_space(height);
            let (page, top) = (self.page_index(), self.y);
            self.put_text(
                style.margin_left,
                name,
                style.label_size,
                FontWeight::Bold,
                style.palette.text_light,
            );
            self.y += label_height;
            for line in &lines {
                self.put_text(
                    style.margin_left + INDENT,
                    line,
                    style.body_size,
                    FontWeight::Regular,
                    style.palette.text,
                );
                self.y += line_height;
            }
            if truncated {
                self.put_text(
                    style.margin_left + INDENT,
                    sections::TRUNCATION_MARKER,
                    style.body_size,
                    FontWeight::Italic,
                    style.palette.text_light,
                );
                self.y += line_height;
            }
            self.y += BLOCK_GAP;
            self.record(BlockKind::CustomField, page, top);
        }
    }

    fn images(&mut self, doc: &IssueDocument, resolved: &ResolvedImages) {
        let attachments: Vec<_> = doc.image_attachments().collect();
        if attachments.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::Images, sections::IMAGES);
        let caption_height = style.line_height(style.label_size);
        let line_height = style.line_height(style.body_size);

        for attachment in attachments {
            let decoded = match resolved.get(&attachment.content_url) {
                Some(bytes) => match images::decode(bytes) {
                    Ok(image) => Ok(image),
                    Err(e) => {
                        warn!(
                            issue = %doc.key,
                            filename = %attachment.filename,
                            error = %e,
                            "image_decode_failed"
                        );
                        Err(sections::broken_image_text(&attachment.filename))
                    }
                },
                None => Err(sections::missing_image_text(&attachment.filename)),
            };

            match decoded {
                Ok(image) => {
                    let (width, height) = images::fit(&image, style);

                    self.ensure_space(caption_height + height + SECTION_GAP);
                    let (page, top) = (self.page_index(), self.y);
                    self.put_text(
                        style.margin_left,
                        &attachment.filename,
                        style.label_size,
                        FontWeight::Italic,
                        style.palette.text_light,
                    );
                    self.y += caption_height;
                    let index = self.images.len();
                    self.images.push(image);
                    let (x, y) = (style.margin_left, self.y);
                    self.push(Element::Image { x, y, width, height, image: index });
                    self.y += height + SECTION_GAP;
                    self.record(BlockKind::Image, page, top);
                }
                Err(placeholder) => {
                    self.ensure_space(caption_height + line_height + BLOCK_GAP);
                    let (page, top) = (self.page_index(), self.y);
                    self.put_text(
                        style.margin_left,
                        &attachment.filename,
                        style.label_size,
                        FontWeight::Italic,
                        style.palette.text_light,
                    );
                    self.y += caption_height;
                    self.put_text(
                        style.margin_left,
                        &placeholder,
                        style.body_size,
                        FontWeight::Italic,
                        style.palette.error,
                    );
                    self.y += line_height + BLOCK_GAP;
                    self.record(BlockKind::ImagePlaceholder, page, top);
                }
            }
        }
    }

    /// One atomic entry: leading runs on the first line, `body` wrapped in
    /// the remaining width with continuation lines aligned under it.
    fn entry(
        &mut self,
        kind: BlockKind,
        x: f32,
        runs: &[Run<'_>],
        body: &str,
        trailing: Option<Run<'_>>,
        size: f32,
    ) {
        let style = self.style;
        let line_height = style.line_height(size);
        let prefix_width: f32 = runs.iter().map(|r| style.text_width(r.text, size)).sum();
        let trailing_width = trailing
            .as_ref()
            .map(|r| style.text_width(r.text, size) + style.column_gap)
            .unwrap_or(0.0);
        let body_x = x + prefix_width;
        let body_width =
            (style.page_width - style.margin_right - body_x - trailing_width).max(line_height);
        let mut lines = cap_lines(
            wrap_text(body, body_width, size, style),
            self.lines_per_page(line_height, BLOCK_GAP),
        );
        if lines.is_empty() {
            lines.push(String::new());
        }

        self.ensure_space(lines.len() as f32 * line_height + BLOCK_GAP);
        let (page, top) = (self.page_index(), self.y);
        self.put_runs(x, runs, size);
        if let Some(run) = trailing {
            let right = style.page_width - style.margin_right - style.text_width(run.text, size);
            self.put_text(right, run.text, size, run.weight, run.color);
        }
        for line in &lines {
            self.put_text(body_x, line, size, FontWeight::Regular, style.palette.text);
            self.y += line_height;
        }
        self.y += BLOCK_GAP;
        self.record(kind, page, top);
    }

    fn attachments(&mut self, doc: &IssueDocument) {
        if doc.attachments.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(
            Section::Attachments,
            &format!("{} ({})", sections::ATTACHMENTS, doc.attachments.len()),
        );
        for attachment in &doc.attachments {
            let size_text = format!(" ({})", format_size(attachment.size));
            let author = attachment
                .author
                .as_deref()
                .map(|a| {
                    let created = format_optional_timestamp(attachment.created.as_deref());
                    format!("{a}, {created}")
                })
                .unwrap_or_default();
            self.entry(
                BlockKind::Attachment,
                style.margin_left,
                &[
                    Run {
                        text: &attachment.filename,
                        weight: FontWeight::Bold,
                        color: style.palette.text,
                    },
                    Run {
                        text: &size_text,
                        weight: FontWeight::Regular,
                        color: style.palette.text_light,
                    },
                    Run { text: "  ", weight: FontWeight::Regular, color: style.palette.text },
                ],
                &author,
                None,
                style.body_size,
            );
        }
    }

    fn subtasks(&mut self, doc: &IssueDocument) {
        if doc.subtasks.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::Subtasks, sections::SUBTASKS);
        for subtask in &doc.subtasks {
            let (summary, cut) = truncate_chars(&subtask.summary, style.subtask_summary_chars);
            let summary = if cut { format!("{summary}...") } else { summary };
            let key = format!("{}  ", subtask.key);
            let tone = crate::issue::Status::new(subtask.status.clone(), None).tone();
            self.entry(
                BlockKind::Subtask,
                style.margin_left,
                &[Run { text: &key, weight: FontWeight::Bold, color: style.palette.primary }],
                &summary,
                Some(Run {
                    text: &subtask.status,
                    weight: FontWeight::Regular,
                    color: style.status_color(tone),
                }),
                style.body_size,
            );
        }
    }

    fn links(&mut self, doc: &IssueDocument) {
        if doc.links.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(Section::Links, sections::LINKS);
        for link in &doc.links {
            let (summary, cut) = truncate_chars(&link.summary, style.link_summary_chars);
            let summary = if cut { format!("{summary}...") } else { summary };
            let relation = format!("{} ", link.relation);
            let key = format!("{}  ", link.key);
            self.entry(
                BlockKind::Link,
                style.margin_left,
                &[
                    Run {
                        text: &relation,
                        weight: FontWeight::Regular,
                        color: style.palette.text_light,
                    },
                    Run { text: &key, weight: FontWeight::Bold, color: style.palette.primary },
                ],
                &summary,
                None,
                style.body_size,
            );
        }
    }

    fn comments(&mut self, doc: &IssueDocument) {
        if doc.comments.is_empty() {
            return;
        }
        let style = self.style;
        self.heading(
            Section::Comments,
            &format!("{} ({})", sections::COMMENTS, doc.comments.len()),
        );
        let meta_height = style.line_height(style.small_size);
        let size = style.label_size;
        let line_height = style.line_height(size);
        let body_x = style.margin_left + INDENT;
        let body_width = style.content_width() - INDENT;

        for comment in doc.comments.iter().take(style.max_comments) {
            let (body, cut) = truncate_chars(comment.body.trim(), style.comment_char_budget);
            let body = if cut { format!("{}...", body.trim_end()) } else { body };
            let lines = wrap_text(&body, body_width, size, style);
            let height = meta_height + lines.len() as f32 * line_height + SECTION_GAP;

            if height <= style.usable_height() {
                self.ensure_space(height);
            } else {
                self.ensure_space(meta_height + line_height);
            }
            let (page, top) = (self.page_index(), self.y);
            let date = format!("  {}", format_optional_timestamp(comment.created.as_deref()));
            self.put_runs(
                style.margin_left,
                &[
                    Run {
                        text: &comment.author,
                        weight: FontWeight::Bold,
                        color: style.palette.text,
                    },
                    Run {
                        text: &date,
                        weight: FontWeight::Regular,
                        color: style.palette.text_light,
                    },
                ],
                style.small_size,
            );
            self.y += meta_height;
            for line in &lines {
                self.ensure_space(line_height);
                self.put_text(body_x, line, size, FontWeight::Regular, style.palette.text);
                self.y += line_height;
            }
            self.y += SECTION_GAP;
            self.record(BlockKind::Comment, page, top);
        }

        let omitted = doc.comments.len().saturating_sub(style.max_comments);
        if omitted > 0 {
            self.ensure_space(line_height);
            self.put_text(
                style.margin_left,
                &sections::omitted_comments_text(omitted),
                size,
                FontWeight::Italic,
                style.palette.text_light,
            );
            self.y += line_height;
        }
    }

    /// Stamp the footer on every page and hand over the display list.
    pub fn finish(mut self, key: &str, exported_at: &str) -> Layout {
        let style = self.style;
        let total = self.pages.len();
        let rule_y = style.bottom_limit() + 4.0;
        let text_y = rule_y + 2.0 + style.line_height(style.small_size) * BASELINE;
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.elements.push(Element::Rule {
                x1: style.margin_left,
                x2: style.page_width - style.margin_right,
                y: rule_y,
                thickness: 0.5,
                color: style.palette.border,
            });
            page.elements.push(Element::Text {
                x: style.margin_left,
                y: text_y,
                size: style.small_size,
                weight: FontWeight::Regular,
                color: style.palette.text_light,
                text: footer_text(exported_at, key, index + 1, total),
            });
        }
        self.sections.push(Section::Footer);
        Layout {
            pages: self.pages,
            images: self.images,
            blocks: self.blocks,
            sections: self.sections,
        }
    }
}

pub fn footer_text(exported_at: &str, key: &str, page: usize, total: usize) -> String {
    format!("Exported: {exported_at} | {key} | Page {page} of {total}")
}

//! WordprocessingML (.docx) export.
//!
//! Writes the minimal OOXML package by hand: content types, relationships,
//! `word/document.xml` and one PNG under `word/media` per embedded image.
//! Section order and omission rules match the PDF layout.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::format::{format_optional_timestamp, format_size, truncate_chars};
use crate::images::{self, ResolvedImages};
use crate::issue::IssueDocument;
use crate::render::RenderError;
use crate::sections;
use crate::style::{Color, Style};

pub const MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Escape for element text and attributes, dropping C0 controls XML 1.0 forbids.
fn xml_text(text: &str) -> String {
    let legal: String = text
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0xFFFE | 0xFFFF))
        .collect();
    escape(&legal).into_owned()
}

const EMU_PER_MM: f32 = 36_000.0;
const TWIPS_PER_MM: f32 = 1440.0 / 25.4;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

#[derive(Clone, Copy)]
struct RunStyle {
    size: f32,
    bold: bool,
    italic: bool,
    color: Color,
}

struct DocxBuilder<'s> {
    style: &'s Style,
    body: String,
    media: Vec<(String, Vec<u8>)>,
}

impl<'s> DocxBuilder<'s> {
    fn new(style: &'s Style) -> Self {
        Self {
            style,
            body: String::new(),
            media: Vec::new(),
        }
    }

    fn body_run(&self) -> RunStyle {
        RunStyle {
            size: self.style.body_size,
            bold: false,
            italic: false,
            color: self.style.palette.text,
        }
    }

    fn run(&mut self, text: &str, run: RunStyle) {
        self.body.push_str("<w:r><w:rPr>");
        if run.bold {
            self.body.push_str("<w:b/>");
        }
        if run.italic {
            self.body.push_str("<w:i/>");
        }
        self.body.push_str(&format!(
            r#"<w:color w:val="{}"/><w:sz w:val="{}"/></w:rPr>"#,
            run.color.hex(),
            (run.size * 2.0).round() as u32
        ));
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.body.push_str("<w:br/>");
            }
            self.body
                .push_str(&format!(r#"<w:t xml:space="preserve">{}</w:t>"#, xml_text(line)));
        }
        self.body.push_str("</w:r>");
    }

    fn paragraph(&mut self, runs: &[(&str, RunStyle)]) {
        self.body.push_str("<w:p>");
        for (text, run) in runs {
            self.run(text, *run);
        }
        self.body.push_str("</w:p>");
    }

    fn text(&mut self, text: &str) {
        let run = self.body_run();
        self.paragraph(&[(text, run)]);
    }

    fn heading(&mut self, text: &str) {
        let run = RunStyle {
            size: self.style.heading_size,
            bold: true,
            ..self.body_run()
        };
        self.body.push_str(r#"<w:p><w:pPr><w:keepNext/><w:spacing w:before="240"/></w:pPr>"#);
        self.run(text, run);
        self.body.push_str("</w:p>");
    }

    fn rule(&mut self) {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{}"/></w:pBdr></w:pPr></w:p>"#,
            self.style.palette.border.hex()
        ));
    }

    /// Two label/value pairs per row, matching the PDF detail grid.
    fn detail_table(&mut self, entries: &[(&'static str, String)]) {
        let label = RunStyle {
            size: self.style.label_size,
            bold: true,
            color: self.style.palette.text_light,
            ..self.body_run()
        };
        let value = self.body_run();
        self.body.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/></w:tblPr>"#);
        for row in entries.chunks(2) {
            self.body.push_str("<w:tr>");
            for (name, text) in row {
                for (content, run) in [(*name, label), (text.as_str(), value)] {
                    self.body.push_str("<w:tc><w:p>");
                    self.run(content, run);
                    self.body.push_str("</w:p></w:tc>");
                }
            }
            if row.len() == 1 {
                self.body.push_str("<w:tc><w:p/></w:tc><w:tc><w:p/></w:tc>");
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
    }

    fn image(&mut self, png: Vec<u8>, width_mm: f32, height_mm: f32, name: &str) {
        let index = self.media.len() + 1;
        let rel_id = format!("rIdImg{index}");
        let (cx, cy) = ((width_mm * EMU_PER_MM) as u64, (height_mm * EMU_PER_MM) as u64);
        let name = xml_text(name);
        self.body.push_str(&format!(
            concat!(
                r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{index}" name="Picture {index}"/>"#,
                r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
                r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:nvPicPr><pic:cNvPr id="{index}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
            ),
            cx = cx,
            cy = cy,
            index = index,
            name = name,
            rel = rel_id,
        ));
        self.media.push((format!("image{index}.png"), png));
    }

    fn document_xml(&self) -> String {
        let style = self.style;
        let twips = |mm: f32| (mm * TWIPS_PER_MM).round() as u32;
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
                r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
                r#"<w:body>{body}<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"/>"#,
                r#"<w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="0" w:footer="0" w:gutter="0"/>"#,
                r#"</w:sectPr></w:body></w:document>"#
            ),
            body = self.body,
            w = twips(style.page_width),
            h = twips(style.page_height),
            top = twips(style.margin_top),
            right = twips(style.margin_right),
            bottom = twips(style.margin_bottom),
            left = twips(style.margin_left),
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (index, (name, _)) in self.media.iter().enumerate() {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdImg{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{}"/>"#,
                index + 1,
                name
            ));
        }
        rels.push_str("</Relationships>");
        rels
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(self.document_xml().as_bytes())?;
        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(self.document_rels().as_bytes())?;
        for (name, bytes) in &self.media {
            zip.start_file(format!("word/media/{name}"), options)?;
            zip.write_all(bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

pub fn encode(
    doc: &IssueDocument,
    resolved: &ResolvedImages,
    style: &Style,
    exported_at: &str,
) -> Result<Vec<u8>, RenderError> {
    let mut b = DocxBuilder::new(style);
    let palette = &style.palette;
    let body = b.body_run();
    let light = RunStyle { color: palette.text_light, ..body };
    let bold = RunStyle { bold: true, ..body };

    b.paragraph(&[
        (&format!("{} | ", doc.issue_type), RunStyle { size: style.header_size, ..light }),
        (
            &doc.key,
            RunStyle {
                size: style.header_size,
                bold: true,
                color: palette.primary,
                ..body
            },
        ),
    ]);
    b.paragraph(&[(&doc.summary, RunStyle { size: style.title_size, bold: true, ..body })]);
    b.paragraph(&[
        ("Status: ", bold),
        (&doc.status.name, RunStyle { color: style.status_color(doc.status.tone()), ..bold }),
        ("    Priority: ", bold),
        (&doc.priority, body),
    ]);
    b.rule();

    let details = sections::detail_entries(doc);
    if !details.is_empty() {
        b.heading(sections::DETAILS);
        b.detail_table(&details);
    }

    let description = doc.description.replace("\r\n", "\n");
    if !description.trim().is_empty() {
        b.heading(sections::DESCRIPTION);
        for paragraph in description.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            b.text(paragraph);
        }
    }

    if !doc.custom_fields.is_empty() {
        b.heading(sections::CUSTOM_FIELDS);
        for (name, value) in &doc.custom_fields {
            b.paragraph(&[
                (&format!("{name}: "), RunStyle { size: style.label_size, bold: true, ..light }),
                (value, body),
            ]);
        }
    }

    let image_attachments: Vec<_> = doc.image_attachments().collect();
    if !image_attachments.is_empty() {
        b.heading(sections::IMAGES);
        for attachment in image_attachments {
            let caption = RunStyle {
                italic: true,
                size: style.label_size,
                ..light
            };
            b.paragraph(&[(&attachment.filename, caption)]);
            let embedded = match resolved.get(&attachment.content_url) {
                None => Err(sections::missing_image_text(&attachment.filename)),
                Some(bytes) => images::decode(bytes)
                    .and_then(|image| {
                        let (w, h) = images::fit(&image, style);
                        image.to_png().map(|png| (png, w, h))
                    })
                    .map_err(|e| {
                        warn!(
                            issue = %doc.key,
                            filename = %attachment.filename,
                            error = %e,
                            "image_decode_failed"
                        );
                        sections::broken_image_text(&attachment.filename)
                    }),
            };
            match embedded {
                Ok((png, w, h)) => b.image(png, w, h, &attachment.filename),
                Err(placeholder) => {
                    let run = RunStyle {
                        italic: true,
                        color: palette.error,
                        ..body
                    };
                    b.paragraph(&[(&placeholder, run)])
                }
            }
        }
    }

    if !doc.attachments.is_empty() {
        b.heading(&format!("{} ({})", sections::ATTACHMENTS, doc.attachments.len()));
        for attachment in &doc.attachments {
            let meta = attachment
                .author
                .as_deref()
                .map(|a| {
                    let created = format_optional_timestamp(attachment.created.as_deref());
                    format!(" - {a}, {created}")
                })
                .unwrap_or_default();
            b.paragraph(&[
                (&attachment.filename, bold),
                (&format!(" ({}){meta}", format_size(attachment.size)), light),
            ]);
        }
    }

    if !doc.subtasks.is_empty() {
        b.heading(sections::SUBTASKS);
        for subtask in &doc.subtasks {
            let (summary, cut) = truncate_chars(&subtask.summary, style.subtask_summary_chars);
            let summary = if cut { format!("{summary}...") } else { summary };
            b.paragraph(&[
                (&format!("{}  ", subtask.key), RunStyle { color: palette.primary, ..bold }),
                (&summary, body),
                (&format!("  [{}]", subtask.status), light),
            ]);
        }
    }

    if !doc.links.is_empty() {
        b.heading(sections::LINKS);
        for link in &doc.links {
            let (summary, cut) = truncate_chars(&link.summary, style.link_summary_chars);
            let summary = if cut { format!("{summary}...") } else { summary };
            b.paragraph(&[
                (&format!("{} ", link.relation), light),
                (&format!("{}  ", link.key), RunStyle { color: palette.primary, ..bold }),
                (&summary, body),
            ]);
        }
    }

    if !doc.comments.is_empty() {
        b.heading(&format!("{} ({})", sections::COMMENTS, doc.comments.len()));
        for comment in doc.comments.iter().take(style.max_comments) {
            b.paragraph(&[
                (&comment.author, RunStyle { size: style.small_size, ..bold }),
                (
                    &format!("  {}", format_optional_timestamp(comment.created.as_deref())),
                    RunStyle { size: style.small_size, ..light },
                ),
            ]);
            let (text, cut) = truncate_chars(comment.body.trim(), style.comment_char_budget);
            let text = if cut { format!("{}...", text.trim_end()) } else { text };
            b.paragraph(&[(&text, RunStyle { size: style.label_size, ..body })]);
        }
        let omitted = doc.comments.len().saturating_sub(style.max_comments);
        if omitted > 0 {
            let note = RunStyle {
                italic: true,
                ..light
            };
            b.paragraph(&[(&sections::omitted_comments_text(omitted), note)]);
        }
    }

    b.rule();
    b.paragraph(&[(
        &format!("Exported: {exported_at} | {}", doc.key),
        RunStyle { size: style.small_size, ..light },
    )]);
    b.finish()
}

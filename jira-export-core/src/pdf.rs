//! Encodes a [`Layout`] with printpdf, using the built-in Helvetica faces.

use printpdf::{
    BuiltinFont, Color as PdfColor, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    Point, Pt, RawImage, RawImageData, RawImageFormat, Rgb, TextItem, XObjectId, XObjectTransform,
};
use tracing::debug;

use crate::layout::{Element, FontWeight, Layout};
use crate::style::{Color, Style};

pub const MIME: &str = "application/pdf";

pub fn encode(layout: &Layout, style: &Style, title: &str) -> Vec<u8> {
    let mut doc = PdfDocument::new(title);

    let image_ids: Vec<XObjectId> = layout
        .images
        .iter()
        .map(|image| {
            let raw = RawImage {
                pixels: RawImageData::U8(image.rgb.clone()),
                width: image.width as usize,
                height: image.height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            doc.add_image(&raw)
        })
        .collect();

    let pages: Vec<PdfPage> = layout
        .pages
        .iter()
        .map(|page| {
            let mut ops = Vec::new();
            for element in &page.elements {
                element_ops(&mut ops, element, style, &image_ids, &layout.images);
            }
            PdfPage::new(Mm(style.page_width), Mm(style.page_height), ops)
        })
        .collect();

    let mut warnings = Vec::new();
    let bytes = doc.with_pages(pages).save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "pdf_save_warnings");
    }
    bytes
}

fn font(weight: FontWeight) -> BuiltinFont {
    match weight {
        FontWeight::Regular => BuiltinFont::Helvetica,
        FontWeight::Bold => BuiltinFont::HelveticaBold,
        FontWeight::Italic => BuiltinFont::HelveticaOblique,
    }
}

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.unit();
    PdfColor::Rgb(Rgb { r, g, b, icc_profile: None })
}

/// Layout y runs down from the page top; PDF y runs up from the bottom.
fn point(x: f32, y: f32, style: &Style) -> Point {
    Point {
        x: Mm(x).into(),
        y: Mm(style.page_height - y).into(),
    }
}

fn element_ops(
    ops: &mut Vec<Op>,
    element: &Element,
    style: &Style,
    image_ids: &[XObjectId],
    images: &[crate::images::DecodedImage],
) {
    match element {
        Element::Text { x, y, size, weight, color, text } => {
            let font = font(*weight);
            ops.extend([
                Op::StartTextSection,
                Op::SetFillColor { col: pdf_color(*color) },
                Op::SetFontSizeBuiltinFont { size: Pt(*size), font },
                Op::SetTextCursor { pos: point(*x, *y, style) },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_latin1_safe(text))],
                    font,
                },
                Op::EndTextSection,
            ]);
        }
        Element::Rule { x1, x2, y, thickness, color } => {
            ops.extend([
                Op::SetOutlineColor { col: pdf_color(*color) },
                Op::SetOutlineThickness { pt: Pt(*thickness) },
                Op::DrawLine {
                    line: Line {
                        points: vec![
                            LinePoint { p: point(*x1, *y, style), bezier: false },
                            LinePoint { p: point(*x2, *y, style), bezier: false },
                        ],
                        is_closed: false,
                    },
                },
            ]);
        }
        Element::Image { x, y, width, height, image } => {
            let (Some(id), Some(decoded)) = (image_ids.get(*image), images.get(*image)) else {
                return;
            };
            let natural_width = style.px_to_mm(decoded.width).max(f32::EPSILON);
            let natural_height = style.px_to_mm(decoded.height).max(f32::EPSILON);
            ops.push(Op::UseXobject {
                id: id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Mm(*x).into()),
                    translate_y: Some(Mm(style.page_height - y - height).into()),
                    scale_x: Some(width / natural_width),
                    scale_y: Some(height / natural_height),
                    dpi: Some(style.image_dpi),
                    ..Default::default()
                },
            });
        }
    }
}

/// The built-in fonts only cover WinAnsi; map common typography outside it
/// and replace anything else so the text stays legible.
fn to_latin1_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if (c as u32) < 0x100 || c == '\u{2022}' || c == '\u{2026}' => c,
            _ => '?',
        })
        .collect()
}

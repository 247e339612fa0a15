//! Immutable styling passed into every renderer.
//!
//! All lengths are millimetres, font sizes are points. `Style::default()` is
//! an A4 page with 20 mm margins and the Jira colour palette. Every field can
//! be overridden from configuration; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::issue::StatusTone;

pub const MM_PER_PT: f32 = 0.352_778;

/// 8-bit RGB colour, written as `#RRGGBB` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to 0.0..=1.0.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid colour {value:?}, expected #RRGGBB"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|e| e.to_string())
        };
        Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        format!("#{}", color.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Color,
    pub text: Color,
    pub text_light: Color,
    pub success: Color,
    pub border: Color,
    pub light_bg: Color,
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x00, 0x52, 0xCC),
            text: Color::rgb(0x17, 0x2B, 0x4D),
            text_light: Color::rgb(0x5E, 0x6C, 0x84),
            success: Color::rgb(0x00, 0x87, 0x5A),
            border: Color::rgb(0xDF, 0xE1, 0xE6),
            light_bg: Color::rgb(0xF4, 0xF5, 0xF7),
            error: Color::rgb(0xDE, 0x35, 0x0B),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,

    pub header_size: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub label_size: f32,
    pub small_size: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Average glyph advance as a fraction of the font size, used for wrapping.
    pub char_width_ratio: f32,

    /// Width reserved for the label inside one detail-grid column.
    pub detail_label_width: f32,
    pub column_gap: f32,
    pub custom_field_max_lines: usize,
    pub max_comments: usize,
    pub comment_char_budget: usize,
    pub subtask_summary_chars: usize,
    pub link_summary_chars: usize,
    pub image_max_height: f32,
    /// Pixel density assumed for attachment images.
    pub image_dpi: f32,

    pub palette: Palette,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            margin_left: 20.0,
            margin_right: 20.0,
            header_size: 12.0,
            title_size: 20.0,
            heading_size: 14.0,
            body_size: 10.0,
            label_size: 9.0,
            small_size: 8.0,
            line_spacing: 1.35,
            char_width_ratio: 0.5,
            detail_label_width: 28.0,
            column_gap: 6.0,
            custom_field_max_lines: 10,
            max_comments: 10,
            comment_char_budget: 1000,
            subtask_summary_chars: 80,
            link_summary_chars: 60,
            image_max_height: 120.0,
            image_dpi: 96.0,
            palette: Palette::default(),
        }
    }
}

impl Style {
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Lowest y (from the page top) that content may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    pub fn usable_height(&self) -> f32 {
        self.bottom_limit() - self.margin_top
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing * MM_PER_PT
    }

    /// Estimated rendered width of `text`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.char_width_ratio * MM_PER_PT
    }

    pub fn column_width(&self) -> f32 {
        (self.content_width() - self.column_gap) / 2.0
    }

    pub fn status_color(&self, tone: StatusTone) -> Color {
        match tone {
            StatusTone::Resolved => self.palette.success,
            StatusTone::InProgress => self.palette.primary,
            StatusTone::Neutral => self.palette.text_light,
        }
    }

    pub fn px_to_mm(&self, px: u32) -> f32 {
        px as f32 * 25.4 / self.image_dpi
    }
}

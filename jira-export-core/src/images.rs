//! Decoding of attachment images for embedding.

use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb};

use crate::style::Style;

/// Image bytes resolved by the caller, keyed by attachment content url.
pub type ResolvedImages = HashMap<String, Vec<u8>>;

/// An image flattened to 8-bit RGB on a white background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    /// Re-encode as PNG, the one image format every export target accepts.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let buffer: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, self.rgb.as_slice()).ok_or_else(|| {
                image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ))
            })?;
        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

/// Decode PNG/JPEG/GIF/BMP bytes. Alpha is composited onto white.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    Ok(DecodedImage { width, height, rgb })
}

/// Display size in mm: natural size at the style's dpi, scaled down to the
/// content width and the maximum image height, never up.
pub fn fit(image: &DecodedImage, style: &Style) -> (f32, f32) {
    let natural_width = style.px_to_mm(image.width).max(f32::EPSILON);
    let natural_height = style.px_to_mm(image.height).max(f32::EPSILON);
    let scale = (style.content_width() / natural_width)
        .min(style.image_max_height / natural_height)
        .min(1.0);
    (natural_width * scale, natural_height * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn transparent_pixels_become_white() {
        let decoded = decode(&png(2, 1, [0, 0, 0, 0])).unwrap();
        assert_eq!(decoded.rgb, vec![255; 6]);
        let opaque = decode(&png(1, 1, [10, 20, 30, 255])).unwrap();
        assert_eq!(opaque.rgb, vec![10, 20, 30]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(decode(b"not an image").is_err());
    }

    #[test]
    fn large_images_are_scaled_down_preserving_aspect() {
        let style = Style::default();
        let wide = DecodedImage { width: 4000, height: 1000, rgb: Vec::new() };
        let (w, h) = fit(&wide, &style);
        assert!((w - style.content_width()).abs() < 0.01);
        assert!((w / h - 4.0).abs() < 0.01);

        let small = DecodedImage { width: 96, height: 96, rgb: Vec::new() };
        let (w, h) = fit(&small, &style);
        assert!((w - 25.4).abs() < 0.01 && (h - 25.4).abs() < 0.01);
    }
}

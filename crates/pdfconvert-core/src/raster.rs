//! Placeholder page images.
//!
//! Pages are not rasterized. Each output is a blank canvas carrying only a
//! `Page N` label so callers can tell the images apart.

use crate::config::RasterSettings;
use crate::error::Failure;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

/// Output encoding for page images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn document_format(self) -> crate::file::DocumentFormat {
        match self {
            ImageFormat::Png => crate::file::DocumentFormat::Png,
            ImageFormat::Jpeg => crate::file::DocumentFormat::Jpeg,
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" | "image/jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(Failure::UnsupportedFeature(format!(
                "Unsupported image format: {}",
                other
            ))),
        }
    }
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: usize = 7;
const LABEL_SCALE: u32 = 3;
const LABEL_ORIGIN: (u32, u32) = (50, 50);

/// 5x7 bitmap rows, most significant of the low five bits is the leftmost pixel
fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c {
        'P' => [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10],
        'a' => [0x00, 0x00, 0x0e, 0x01, 0x0f, 0x11, 0x0f],
        'g' => [0x00, 0x0f, 0x11, 0x11, 0x0f, 0x01, 0x0e],
        'e' => [0x00, 0x00, 0x0e, 0x11, 0x1f, 0x10, 0x0e],
        '0' => [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
        '1' => [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
        '2' => [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
        '3' => [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
        '4' => [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
        '5' => [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
        '6' => [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
        '7' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
        '9' => [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
        _ => [0; GLYPH_HEIGHT],
    }
}

fn draw_label(canvas: &mut RgbImage, text: &str) {
    let (ox, oy) = LABEL_ORIGIN;
    let advance = (GLYPH_WIDTH + 1) * LABEL_SCALE;
    for (i, c) in text.chars().enumerate() {
        let gx = ox + i as u32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..LABEL_SCALE {
                    for dx in 0..LABEL_SCALE {
                        let x = gx + col * LABEL_SCALE + dx;
                        let y = oy + row as u32 * LABEL_SCALE + dy;
                        if x < canvas.width() && y < canvas.height() {
                            canvas.put_pixel(x, y, Rgb([0, 0, 0]));
                        }
                    }
                }
            }
        }
    }
}

/// A white canvas labelled `Page <number>`, encoded as `format`
pub(crate) fn placeholder_page(
    number: usize,
    format: ImageFormat,
    settings: &RasterSettings,
) -> Result<Vec<u8>, Failure> {
    if settings.width == 0 || settings.height == 0 {
        return Err(Failure::InvalidInput("Canvas size must be non-zero".into()));
    }
    let mut canvas = RgbImage::from_pixel(settings.width, settings.height, Rgb([255, 255, 255]));
    draw_label(&mut canvas, &format!("Page {}", number));

    let mut buffer = Vec::new();
    let encoded = match format {
        ImageFormat::Jpeg => {
            let quality = (settings.jpeg_quality.clamp(0.01, 1.0) * 100.0).round() as u8;
            JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&canvas)
        }
        ImageFormat::Png => PngEncoder::new(&mut buffer).write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgb8,
        ),
    };
    encoded.map_err(|e| Failure::Internal(format!("Failed to encode page image: {}", e)))?;
    Ok(buffer)
}

//! Image XObjects: JPEG passthrough, PNG re-encoding, and pages that show
//! one image fitted to the page.

use crate::config::PageSize;
use crate::document::PdfBuilder;
use crate::error::Failure;
use crate::file::{DocumentFormat, InputFile};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, ObjectId, Stream};
use std::io::Write;

/// Name the image is registered under in each page's resources
const IMAGE_NAME: &str = "Im0";

/// An image ready to be drawn: its XObject id and pixel dimensions
#[derive(Debug, Clone, Copy)]
pub(crate) struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Where and how large an image is drawn on a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale by the limiting dimension and center on the page
pub(crate) fn fit_centered(width: u32, height: u32, page: PageSize) -> Placement {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let scale = (page.width / w).min(page.height / h);
    let (draw_w, draw_h) = (w * scale, h * scale);
    Placement {
        x: (page.width - draw_w) / 2.0,
        y: (page.height - draw_h) / 2.0,
        width: draw_w,
        height: draw_h,
    }
}

/// `q w 0 0 h x y cm /Im0 Do Q`
pub(crate) fn draw_image(placement: Placement) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.into())]),
            Operation::new("Q", vec![]),
        ],
    }
}

pub(crate) fn image_resources(image: EmbeddedImage) -> lopdf::Dictionary {
    dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image.id },
    }
}

/// Embed JPEG bytes unchanged behind a DCTDecode filter
pub(crate) fn embed_jpeg(builder: &mut PdfBuilder, bytes: &[u8]) -> Result<EmbeddedImage, Failure> {
    let info = jpeg_info(bytes)?;
    let color_space = match info.components {
        1 => "DeviceGray",
        4 => "DeviceCMYK",
        _ => "DeviceRGB",
    };
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => info.width as i64,
        "Height" => info.height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    if info.components == 4 {
        // Adobe CMYK JPEGs are stored inverted
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0].into_iter().map(Object::Integer).collect();
        dict.set("Decode", decode);
    }
    let stream = Stream::new(dict, bytes.to_vec()).with_compression(false);
    Ok(EmbeddedImage {
        id: builder.add_object(stream),
        width: info.width,
        height: info.height,
    })
}

/// Decode a PNG and embed it as Flate RGB (or gray) with an alpha soft mask
pub(crate) fn embed_png(builder: &mut PdfBuilder, bytes: &[u8]) -> Result<EmbeddedImage, Failure> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| Failure::InvalidInput(format!("Failed to read PNG header: {}", e)))?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buffer)
        .map_err(|e| Failure::InvalidInput(format!("Failed to decode PNG: {}", e)))?;
    let pixels = &buffer[..frame.buffer_size()];
    let (width, height) = (frame.width, frame.height);

    let (color, alpha, color_space) = match frame.color_type {
        png::ColorType::Rgb => (pixels.to_vec(), None, "DeviceRGB"),
        png::ColorType::Rgba => {
            let (rgb, alpha) = split_alpha(pixels, 4);
            (rgb, Some(alpha), "DeviceRGB")
        }
        png::ColorType::Grayscale => (pixels.to_vec(), None, "DeviceGray"),
        png::ColorType::GrayscaleAlpha => {
            let (gray, alpha) = split_alpha(pixels, 2);
            (gray, Some(alpha), "DeviceGray")
        }
        png::ColorType::Indexed => {
            return Err(Failure::Internal("PNG palette was not expanded".into()))
        }
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if let Some(alpha) = alpha.filter(|a| a.iter().any(|&v| v != u8::MAX)) {
        let mask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        )
        .with_compression(false);
        let mask_id = builder.add_object(mask);
        dict.set("SMask", mask_id);
    }

    let stream = Stream::new(dict, deflate(&color)?).with_compression(false);
    Ok(EmbeddedImage {
        id: builder.add_object(stream),
        width,
        height,
    })
}

/// Split interleaved samples into color channels and the trailing alpha channel
fn split_alpha(pixels: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let count = pixels.len() / channels;
    let mut color = Vec::with_capacity(count * (channels - 1));
    let mut alpha = Vec::with_capacity(count);
    for px in pixels.chunks_exact(channels) {
        color.extend_from_slice(&px[..channels - 1]);
        alpha.push(px[channels - 1]);
    }
    (color, alpha)
}

pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>, Failure> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Failure::Internal(format!("Failed to compress image data: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Failure::Internal(format!("Failed to compress image data: {}", e)))
}

struct JpegInfo {
    width: u32,
    height: u32,
    components: u8,
}

/// Read dimensions and component count from the first SOF marker
fn jpeg_info(bytes: &[u8]) -> Result<JpegInfo, Failure> {
    let invalid = || Failure::InvalidInput("Not a valid JPEG image".into());
    if !bytes.starts_with(&[0xff, 0xd8]) {
        return Err(invalid());
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xff {
            return Err(invalid());
        }
        let marker = bytes[pos + 1];
        // Fill bytes and standalone markers carry no length
        if marker == 0xff {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xd0..=0xd7).contains(&marker) {
            pos += 2;
            continue;
        }
        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xc0..=0xcf) && !matches!(marker, 0xc4 | 0xc8 | 0xcc);
        if is_sof {
            let segment = bytes.get(pos + 4..pos + 2 + length).ok_or_else(invalid)?;
            if segment.len() < 6 {
                return Err(invalid());
            }
            return Ok(JpegInfo {
                height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                components: segment[5],
            });
        }
        pos += 2 + length;
    }
    Err(invalid())
}

/// Embed one PNG or JPEG input, choosing the decoder by its resolved format
pub(crate) fn embed_input(
    builder: &mut PdfBuilder,
    file: &InputFile,
) -> Result<EmbeddedImage, Failure> {
    match file.format() {
        Some(DocumentFormat::Jpeg) => embed_jpeg(builder, &file.bytes),
        Some(DocumentFormat::Png) => embed_png(builder, &file.bytes),
        _ => Err(Failure::UnsupportedFeature(format!(
            "{} is not a PNG or JPEG image",
            if file.name.is_empty() { "input" } else { &file.name }
        ))),
    }
}

/// One page per image, each fitted and centered
pub(crate) fn images_to_pdf(files: &[InputFile], page: PageSize) -> Result<Vec<u8>, Failure> {
    if files.is_empty() {
        return Err(Failure::InvalidInput("No images provided".into()));
    }

    let mut builder = PdfBuilder::new();
    for file in files {
        let image = embed_input(&mut builder, file)?;
        let placement = fit_centered(image.width, image.height, page);
        builder.add_page(page, draw_image(placement), image_resources(image))?;
    }

    tracing::debug!(images = files.len(), "embedded images");
    builder.finish()
}

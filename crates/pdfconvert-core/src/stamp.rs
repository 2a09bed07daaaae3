//! Text overlays drawn on every page: watermarks and page numbers

use crate::config::{PageNumberStyle, WatermarkStyle};
use crate::document::{
    add_page_resource, append_overlay, helvetica, load_pdf, page_ids, page_size, save_pdf,
    win_ansi,
};
use crate::error::Failure;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object};

/// Resource names chosen to stay clear of names in existing documents
const FONT_NAME: &str = "PcHelv";
const GSTATE_NAME: &str = "PcWmGs";

/// Draw `text` across the middle of every page.
///
/// Horizontal centering uses `chars * style.char_width`, not the measured
/// text width.
pub(crate) fn add_watermark(
    bytes: &[u8],
    text: &str,
    style: &WatermarkStyle,
) -> Result<Vec<u8>, Failure> {
    let mut doc = load_pdf(bytes)?;
    let font_id = doc.add_object(helvetica());
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => style.opacity,
        "CA" => style.opacity,
    });

    let estimated_width = text.chars().count() as f32 * style.char_width;

    for page_id in page_ids(&doc) {
        let size = page_size(&doc, page_id);
        add_page_resource(&mut doc, page_id, "Font", FONT_NAME, font_id)?;
        add_page_resource(&mut doc, page_id, "ExtGState", GSTATE_NAME, gs_id)?;

        let x = size.width / 2.0 - estimated_width;
        let y = size.height / 2.0;
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(GSTATE_NAME.into())]),
            Operation::new("rg", vec![style.gray.into(), style.gray.into(), style.gray.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_NAME.into()), style.font_size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ];
        append_overlay(&mut doc, page_id, Content { operations })?;
    }

    save_pdf(&mut doc)
}

/// Draw the 1-based page index near the bottom center of every page
pub(crate) fn add_page_numbers(bytes: &[u8], style: &PageNumberStyle) -> Result<Vec<u8>, Failure> {
    let mut doc = load_pdf(bytes)?;
    let font_id = doc.add_object(helvetica());

    for (index, page_id) in page_ids(&doc).into_iter().enumerate() {
        let size = page_size(&doc, page_id);
        add_page_resource(&mut doc, page_id, "Font", FONT_NAME, font_id)?;

        let label = (index + 1).to_string();
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_NAME.into()), style.font_size.into()]),
            Operation::new("Td", vec![(size.width / 2.0).into(), style.bottom_offset.into()]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ];
        append_overlay(&mut doc, page_id, Content { operations })?;
    }

    save_pdf(&mut doc)
}

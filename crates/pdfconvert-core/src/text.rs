//! Plain text to PDF: greedy word wrap in Helvetica, flowing onto new pages

use crate::config::{PageSize, TextLayout};
use crate::document::{helvetica, win_ansi, PdfBuilder};
use crate::error::Failure;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object};

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a-z
    334, 260, 334, 584, // {..~
];

const DEFAULT_WIDTH: u16 = 556;

fn char_width(c: char, font_size: f32) -> f32 {
    let units = match c as u32 {
        code @ 0x20..=0x7e => HELVETICA_WIDTHS[(code - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    };
    units as f32 * font_size / 1000.0
}

pub(crate) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font_size)).sum()
}

/// Break `content` into lines no wider than `max_width`.
///
/// Explicit newlines are kept (blank lines included). Words wider than the
/// line are broken between characters.
pub(crate) fn wrap_text(content: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let space = char_width(' ', font_size);
    let mut lines = Vec::new();

    for paragraph in content.replace("\r\n", "\n").split('\n') {
        let paragraph = paragraph.replace('\t', "    ");
        let mut line = String::new();
        let mut line_width = 0.0;

        for word in paragraph.split(' ') {
            let word_width = text_width(word, font_size);
            let needed = if line.is_empty() {
                word_width
            } else {
                line_width + space + word_width
            };

            if needed <= max_width {
                if !line.is_empty() {
                    line.push(' ');
                    line_width += space;
                }
                line.push_str(word);
                line_width += word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }

            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
            } else {
                for c in word.chars() {
                    let w = char_width(c, font_size);
                    if line_width + w > max_width && !line.is_empty() {
                        lines.push(std::mem::take(&mut line));
                        line_width = 0.0;
                    }
                    line.push(c);
                    line_width += w;
                }
            }
        }
        lines.push(line);
    }

    lines
}

/// Render plain text to a PDF, starting a new page whenever the bottom margin is reached
pub(crate) fn render_text_pdf(
    content: &str,
    page: PageSize,
    layout: &TextLayout,
) -> Result<Vec<u8>, Failure> {
    let lines = wrap_text(content, layout.font_size, layout.max_width);
    let line_height = layout.font_size * layout.line_height_factor;
    let first_baseline = page.height - layout.margin_top - layout.font_size;
    let usable = first_baseline - layout.margin_bottom;
    let lines_per_page = ((usable / line_height).floor() as usize + 1).max(1);

    let mut builder = PdfBuilder::new();
    let font_id = builder.add_object(helvetica());

    for chunk in lines.chunks(lines_per_page) {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), layout.font_size.into()]),
            Operation::new("TL", vec![line_height.into()]),
            Operation::new(
                "Td",
                vec![layout.margin_left.into(), first_baseline.into()],
            ),
        ];
        for (i, line) in chunk.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            if !line.is_empty() {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(win_ansi(line))],
                ));
            }
        }
        operations.push(Operation::new("ET", vec![]));

        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        builder.add_page(page, Content { operations }, resources)?;
    }

    tracing::debug!(lines = lines.len(), pages = builder.page_count(), "rendered text");
    builder.finish()
}

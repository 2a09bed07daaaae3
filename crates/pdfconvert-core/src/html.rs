//! HTML snapshot tiling
//!
//! The page is rendered elsewhere (an off-screen iframe in the browser) and
//! captured as one tall PNG. That image is scaled to the page width and cut
//! across as many pages as its height needs.

use crate::config::PageSize;
use crate::document::PdfBuilder;
use crate::error::Failure;
use crate::images::{draw_image, embed_png, image_resources, Placement};

/// Renders a URL and returns a PNG snapshot of the whole page.
///
/// Implementations report unreachable pages and capture failures as
/// [`Failure::ResourceUnavailable`], and release whatever rendering surface
/// they create before returning.
#[allow(async_fn_in_trait)]
pub trait PageCapture {
    async fn capture(&self, url: &str) -> Result<Vec<u8>, Failure>;
}

/// Number of pages a `width` x `height` image needs once scaled to the page width
pub(crate) fn tile_count(width: u32, height: u32, page: PageSize) -> usize {
    if width == 0 || height == 0 {
        return 1;
    }
    let scaled_height = height as f32 * page.width / width as f32;
    ((scaled_height / page.height).ceil() as usize).max(1)
}

/// Lay a PNG snapshot across pages, top of the image at the top of page 1
pub(crate) fn tile_snapshot(png: &[u8], page: PageSize) -> Result<Vec<u8>, Failure> {
    let mut builder = PdfBuilder::new();
    let image = embed_png(&mut builder, png)?;

    let scaled_height = image.height as f32 * page.width / image.width.max(1) as f32;
    let pages = tile_count(image.width, image.height, page);

    for index in 0..pages {
        // Each page shifts the image up by one page height
        let placement = Placement {
            x: 0.0,
            y: page.height - scaled_height + index as f32 * page.height,
            width: page.width,
            height: scaled_height,
        };
        builder.add_page(page, draw_image(placement), image_resources(image))?;
    }

    tracing::debug!(
        width = image.width,
        height = image.height,
        pages,
        "tiled snapshot"
    );
    builder.finish()
}

pub(crate) async fn html_to_pdf<C: PageCapture>(
    capture: &C,
    url: &str,
    page: PageSize,
) -> Result<Vec<u8>, Failure> {
    if url.trim().is_empty() {
        return Err(Failure::InvalidInput("URL is empty".into()));
    }
    let snapshot = capture.capture(url).await.map_err(|e| match e {
        Failure::ResourceUnavailable(_) => e,
        other => Failure::ResourceUnavailable(other.to_string()),
    })?;
    tile_snapshot(&snapshot, page)
}

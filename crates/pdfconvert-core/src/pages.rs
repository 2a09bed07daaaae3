//! Whole-document page edits: rotation, deletion, re-serialization

use crate::document::{load_pdf, page_ids, save_pdf};
use crate::error::Failure;
use lopdf::Object;
use std::collections::BTreeSet;

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, Failure> {
    let doc = load_pdf(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Set an absolute `/Rotate` on every page.
///
/// `degrees` must be a multiple of 90; it is normalized into `0..360`.
/// Existing rotation is replaced, not added to.
pub(crate) fn rotate(bytes: &[u8], degrees: i32) -> Result<Vec<u8>, Failure> {
    if degrees % 90 != 0 {
        return Err(Failure::InvalidInput(format!(
            "Rotation must be a multiple of 90 degrees, got {}",
            degrees
        )));
    }
    let angle = normalize_rotation(degrees);

    let mut doc = load_pdf(bytes)?;
    for page_id in page_ids(&doc) {
        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
        page.set("Rotate", Object::Integer(angle as i64));
    }
    save_pdf(&mut doc)
}

/// Normalize rotation to 0, 90, 180, or 270
pub(crate) fn normalize_rotation(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

/// Remove pages by 0-based index.
///
/// Indices outside `[0, page_count)` and duplicates are ignored. Pages are
/// removed from the highest index down so earlier removals do not shift
/// later ones. Removing every page is allowed and leaves an empty page tree.
pub(crate) fn delete(bytes: &[u8], indices: &[u32]) -> Result<Vec<u8>, Failure> {
    let mut doc = load_pdf(bytes)?;
    let page_count = doc.get_pages().len() as u32;

    let targets: BTreeSet<u32> = indices.iter().copied().filter(|&i| i < page_count).collect();
    let ignored = indices.len() - targets.len();
    if ignored > 0 {
        tracing::debug!(ignored, page_count, "ignoring out-of-range or repeated page indices");
    }

    if !targets.is_empty() && targets.len() as u32 == page_count {
        tracing::warn!(page_count, "every page deleted, result has an empty page tree");
    }

    let deleting = !targets.is_empty();
    for index in targets.into_iter().rev() {
        // lopdf numbers pages from 1
        doc.delete_pages(&[index + 1]);
    }
    if deleting {
        doc.prune_objects();
    }

    save_pdf(&mut doc)
}

/// Load and save again, with object streams disabled and nothing else changed
pub(crate) fn reserialize(bytes: &[u8]) -> Result<Vec<u8>, Failure> {
    let mut doc = load_pdf(bytes)?;
    save_pdf(&mut doc)
}

/// Highest page number a range may name
pub const MAX_PAGE_NUMBER: u32 = 100_000;

/// Parse page range string like "1-3, 5, 8-10" into sorted unique page numbers.
///
/// Page numbers above [`MAX_PAGE_NUMBER`] are rejected before any range is
/// expanded.
pub fn parse_ranges(input: &str) -> Result<Vec<u32>, Failure> {
    let mut pages = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| Failure::InvalidInput(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| Failure::InvalidInput(format!("Invalid end: {}", end)))?;

            if start > end {
                return Err(Failure::InvalidInput(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }
            if start == 0 {
                return Err(Failure::InvalidInput("Page numbers must be >= 1".into()));
            }
            check_upper_bound(end)?;

            pages.extend(start..=end);
        } else {
            let page: u32 = part
                .parse()
                .map_err(|_| Failure::InvalidInput(format!("Invalid page: {}", part)))?;
            if page == 0 {
                return Err(Failure::InvalidInput("Page numbers must be >= 1".into()));
            }
            check_upper_bound(page)?;
            pages.insert(page);
        }
    }

    Ok(pages.into_iter().collect())
}

fn check_upper_bound(page: u32) -> Result<(), Failure> {
    if page > MAX_PAGE_NUMBER {
        return Err(Failure::InvalidInput(format!(
            "Page {} is above the limit of {}",
            page, MAX_PAGE_NUMBER
        )));
    }
    Ok(())
}

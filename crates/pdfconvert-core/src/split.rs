//! PDF Split algorithm
//!
//! Extracts pages from a PDF by deleting everything else and pruning the
//! objects nothing refers to any more.

use crate::document::{load_pdf, save_pdf};
use crate::error::Failure;
use lopdf::Document;
use std::collections::HashSet;

/// One single-page PDF per page of the input, in page order
pub(crate) fn split_pages(bytes: &[u8]) -> Result<Vec<Vec<u8>>, Failure> {
    let doc = load_pdf(bytes)?;
    let page_count = doc.get_pages().len() as u32;
    if page_count == 0 {
        return Err(Failure::InvalidInput("PDF has no pages".into()));
    }

    (1..=page_count)
        .map(|page| extract_pages(&doc, &[page]))
        .collect()
}

/// Extract only the specified pages (1-indexed) into a new PDF
///
/// 1. Validate the requested page numbers
/// 2. Delete every other page, highest number first
/// 3. Prune objects no longer reachable from the trailer
/// 4. Serialize
pub(crate) fn extract_pages(doc: &Document, pages: &[u32]) -> Result<Vec<u8>, Failure> {
    if pages.is_empty() {
        return Err(Failure::InvalidInput("No pages specified".into()));
    }

    if pages.contains(&0) {
        return Err(Failure::InvalidInput("Page numbers must be >= 1".into()));
    }

    let page_count = doc.get_pages().len() as u32;

    for &page in pages {
        if page > page_count {
            return Err(Failure::InvalidInput(format!(
                "Page {} does not exist (document has {} pages)",
                page, page_count
            )));
        }
    }

    let mut new_doc = doc.clone();

    let pages_to_keep: HashSet<u32> = pages.iter().copied().collect();
    let pages_to_delete: Vec<u32> = (1..=page_count)
        .rev()
        .filter(|p| !pages_to_keep.contains(p))
        .collect();

    for page_num in pages_to_delete {
        new_doc.delete_pages(&[page_num]);
    }

    new_doc.prune_objects();
    new_doc.compress();

    save_pdf(&mut new_doc)
}

//! Property-based tests for page edits and range parsing

mod common;

use common::{page_count, page_labels, pdf_input};
use pdfconvert_core::{parse_ranges, PdfProcessor};
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Deleting a set of in-range indices removes exactly those pages
    #[test]
    fn delete_removes_exactly_the_requested_pages(
        pages in 1u32..8,
        raw in prop::collection::vec(0u32..12, 0..6)
    ) {
        let file = pdf_input("p.pdf", pages, "X");
        let targets: BTreeSet<u32> = raw.iter().copied().filter(|&i| i < pages).collect();

        let result = PdfProcessor::new().delete_pages(&file, &raw).unwrap();
        let expected: Vec<String> = (0..pages)
            .filter(|i| !targets.contains(i))
            .map(|i| format!("X-Page-{}", i + 1))
            .collect();
        prop_assert_eq!(page_labels(&result.bytes), expected);
    }

    /// Split then merge gives back the original page sequence
    #[test]
    fn split_then_merge_preserves_order(pages in 1u32..7) {
        let processor = PdfProcessor::new();
        let file = pdf_input("s.pdf", pages, "Y");
        let parts = processor.split_pdf(&file).unwrap();
        prop_assert_eq!(parts.len(), pages as usize);

        let inputs: Vec<_> = parts
            .into_iter()
            .map(|blob| pdfconvert_core::InputFile::new(blob.filename, blob.mime, blob.bytes))
            .collect();
        let merged = processor.merge_pdfs(&inputs).unwrap();
        prop_assert_eq!(page_labels(&merged.bytes), page_labels(&file.bytes));
    }

    /// Any multiple of 90 is accepted and normalized into 0..360
    #[test]
    fn rotation_is_normalized(turns in -8i32..8) {
        let file = pdf_input("r.pdf", 1, "R");
        let blob = PdfProcessor::new().rotate_pdf(&file, turns * 90).unwrap();
        let doc = lopdf::Document::load_mem(&blob.bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let rotate = doc.get_dictionary(page_id).unwrap().get(b"Rotate").unwrap().as_i64().unwrap();
        prop_assert_eq!(rotate, (turns * 90).rem_euclid(360) as i64);
        prop_assert_eq!(page_count(&blob.bytes), 1);
    }

    /// Angles that are not multiples of 90 are rejected
    #[test]
    fn odd_rotation_is_rejected(degrees in -720i32..720) {
        prop_assume!(degrees % 90 != 0);
        let file = pdf_input("r.pdf", 1, "R");
        prop_assert!(PdfProcessor::new().rotate_pdf(&file, degrees).is_err());
    }
}

proptest! {
    /// parse_ranges never panics on arbitrary input
    #[test]
    fn parse_ranges_never_panics(input in "\\PC{0,40}") {
        let _ = parse_ranges(&input);
    }

    /// Output is sorted, unique and covers every listed range
    #[test]
    fn parse_ranges_covers_ranges(ranges in prop::collection::vec((1u32..50, 0u32..10), 1..5)) {
        let input = ranges
            .iter()
            .map(|(start, len)| format!("{}-{}", start, start + len))
            .collect::<Vec<_>>()
            .join(", ");
        let pages = parse_ranges(&input).unwrap();

        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        let expected: BTreeSet<u32> = ranges
            .iter()
            .flat_map(|(start, len)| *start..=start + len)
            .collect();
        prop_assert_eq!(pages, expected.into_iter().collect::<Vec<_>>());
    }
}

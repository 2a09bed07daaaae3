//! End-to-end checks of the PDF Processor through the public API

mod common;

use common::{create_test_pdf, jpeg_input, page_count, page_labels, pdf_input, png_input};
use lopdf::content::Content;
use lopdf::Document;
use pdfconvert_core::{
    BatchDownloadSet, Blob, ErrorKind, Failure, InputFile, PdfProcessor, SaveTarget,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::{Cursor, Read};

#[derive(Default)]
struct MemoryTarget {
    files: RefCell<Vec<(String, Vec<u8>)>>,
}

impl SaveTarget for MemoryTarget {
    fn save(&self, blob: &Blob, filename: &str) -> Result<(), Failure> {
        self.files
            .borrow_mut()
            .push((filename.to_string(), blob.bytes.clone()));
        Ok(())
    }
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn split_returns_one_blob_per_page_in_order() {
    let processor = PdfProcessor::new();
    let blobs = processor.split_pdf(&pdf_input("doc.pdf", 4, "S")).unwrap();
    assert_eq!(blobs.len(), 4);
    for (i, blob) in blobs.iter().enumerate() {
        assert_eq!(page_labels(&blob.bytes), vec![format!("S-Page-{}", i + 1)]);
    }
}

#[test]
fn split_report_then_zip_has_three_entries() {
    let processor = PdfProcessor::new();
    let blobs = processor
        .split_pdf(&pdf_input("report.pdf", 3, "R"))
        .unwrap();
    assert_eq!(blobs.len(), 3);

    let entries: BatchDownloadSet = blobs.into_iter().collect();
    let target = MemoryTarget::default();
    let archive = processor
        .download_as_zip(&target, &entries, "report.zip")
        .unwrap();

    assert_eq!(
        zip_names(&archive.bytes),
        vec!["report-1.pdf", "report-2.pdf", "report-3.pdf"]
    );
    let saved = target.files.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "report.zip");

    let mut zip = zip::ZipArchive::new(Cursor::new(saved[0].1.as_slice())).unwrap();
    let mut second = Vec::new();
    zip.by_name("report-2.pdf")
        .unwrap()
        .read_to_end(&mut second)
        .unwrap();
    assert_eq!(page_labels(&second), vec!["R-Page-2"]);
}

#[test]
fn merge_concatenates_in_call_order() {
    let processor = PdfProcessor::new();
    let a = pdf_input("a.pdf", 2, "A");
    let b = pdf_input("b.pdf", 1, "B");

    let ab = processor.merge_pdfs(&[a.clone(), b.clone()]).unwrap();
    let ba = processor.merge_pdfs(&[b, a]).unwrap();

    assert_eq!(page_labels(&ab.bytes), vec!["A-Page-1", "A-Page-2", "B-Page-1"]);
    assert_eq!(page_labels(&ba.bytes), vec!["B-Page-1", "A-Page-1", "A-Page-2"]);
}

#[test]
fn merge_keeps_inherited_media_box() {
    let processor = PdfProcessor::new();
    let merged = processor
        .merge_pdfs(&[pdf_input("a.pdf", 1, "A"), pdf_input("b.pdf", 1, "B")])
        .unwrap();
    let doc = Document::load_mem(&merged.bytes).unwrap();
    for page_id in doc.get_pages().values() {
        let page = doc.get_dictionary(*page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }
}

#[test]
fn merge_empty_list_is_invalid_input() {
    let err = PdfProcessor::new().merge_pdfs(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn delete_with_no_indices_is_identity() {
    let file = pdf_input("d.pdf", 3, "D");
    let result = PdfProcessor::new().delete_pages(&file, &[]).unwrap();
    assert_eq!(page_labels(&result.bytes), page_labels(&file.bytes));
}

#[test]
fn delete_one_index_removes_one_page() {
    let file = pdf_input("d.pdf", 3, "D");
    let processor = PdfProcessor::new();

    let result = processor.delete_pages(&file, &[2]).unwrap();
    assert_eq!(page_count(&result.bytes), 2);

    let untouched = processor.delete_pages(&file, &[3]).unwrap();
    assert_eq!(page_count(&untouched.bytes), 3);
}

#[test]
fn delete_every_page_leaves_no_pages() {
    let file = pdf_input("d.pdf", 2, "D");
    let result = PdfProcessor::new().delete_pages(&file, &[1, 0, 1]).unwrap();
    assert_eq!(page_count(&result.bytes), 0);
    assert_eq!(result.filename, "d.pdf");
}

#[test]
fn rotate_twice_stays_at_ninety() {
    let processor = PdfProcessor::new();
    let once = processor.rotate_pdf(&pdf_input("r.pdf", 2, "R"), 90).unwrap();
    let twice = processor
        .rotate_pdf(&InputFile::from_name("r.pdf", once.bytes), 90)
        .unwrap();
    let doc = Document::load_mem(&twice.bytes).unwrap();
    for page_id in doc.get_pages().values() {
        let rotate = doc.get_dictionary(*page_id).unwrap().get(b"Rotate").unwrap();
        assert_eq!(rotate.as_i64().unwrap(), 90);
    }
}

#[test]
fn protect_is_an_unencrypted_placeholder() {
    let file = pdf_input("p.pdf", 2, "P");
    let blob = PdfProcessor::new().protect_pdf(&file, "secret").unwrap();
    assert!(blob.is_placeholder());
    assert_eq!(page_labels(&blob.bytes), page_labels(&file.bytes));
    let doc = Document::load_mem(&blob.bytes).unwrap();
    assert!(doc.trailer.get(b"Encrypt").is_err());
}

#[test]
fn compress_keeps_pages() {
    let file = pdf_input("c.pdf", 3, "C");
    let blob = PdfProcessor::new().compress_pdf(&file).unwrap();
    assert_eq!(page_labels(&blob.bytes), page_labels(&file.bytes));
    assert_eq!(blob.filename, "c.pdf");
}

#[test]
fn image_page_keeps_aspect_ratio() {
    let blob = PdfProcessor::new()
        .images_to_pdf(&[png_input("wide.png", 400, 100), jpeg_input("tall.jpg", 90, 270)])
        .unwrap();
    let doc = Document::load_mem(&blob.bytes).unwrap();
    let expected = [4.0, 1.0 / 3.0];
    for (page_id, ratio) in doc.get_pages().values().zip(expected) {
        let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap();
        let w = cm.operands[0].as_float().unwrap();
        let h = cm.operands[3].as_float().unwrap();
        assert!((w / h - ratio).abs() < 0.01, "drawn {}x{}", w, h);
    }
}

#[test]
fn images_reject_other_formats() {
    let gif = InputFile::new("anim.gif", "image/gif", b"GIF89a".to_vec());
    let err = PdfProcessor::new().images_to_pdf(&[gif]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
}

#[test]
fn watermark_and_numbers_stack() {
    let processor = PdfProcessor::new();
    let file = pdf_input("s.pdf", 2, "S");
    let marked = processor.add_watermark(&file, "CONFIDENTIAL").unwrap();
    let numbered = processor
        .add_page_numbers(&InputFile::from_name("s.pdf", marked.bytes))
        .unwrap();
    assert_eq!(
        page_labels(&numbered.bytes),
        vec!["S-Page-1 CONFIDENTIAL 1", "S-Page-2 CONFIDENTIAL 2"]
    );
}

#[test]
fn corrupt_input_is_invalid() {
    let file = InputFile::from_name("bad.pdf", b"not a pdf at all".to_vec());
    let err = PdfProcessor::new().split_pdf(&file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().starts_with("Failed to split PDF: "));
}

#[test]
fn text_pdf_flows_over_pages() {
    let content = "lorem ipsum dolor sit amet ".repeat(800);
    let blob = PdfProcessor::new()
        .create_text_pdf(&content, "long.txt")
        .unwrap();
    assert!(page_count(&blob.bytes) > 1);
}

#[test]
fn fixture_sanity() {
    assert_eq!(page_count(&create_test_pdf(5, "F")), 5);
}

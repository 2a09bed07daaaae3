//! PDF Processor: image and PDF operations behind one configurable value

use crate::archive::{self, BatchDownloadSet, SaveTarget};
use crate::config::ConvertConfig;
use crate::error::{boundary, ConvertError, Failure, Operation};
use crate::file::{numbered_name, output_name, Blob, DocumentFormat, InputFile};
use crate::html::{self, PageCapture};
use crate::raster::{self, ImageFormat};
use crate::{images, merge, pages, split, stamp, text};

/// Stateless PDF operations.
///
/// Holds only configuration; every method is an independent call that reads
/// its inputs and returns new blobs.
#[derive(Debug, Clone, Default)]
pub struct PdfProcessor {
    config: ConvertConfig,
}

impl PdfProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// One placeholder image per page: a blank canvas labelled `Page N`.
    ///
    /// Page content is not rendered; every blob is flagged as a placeholder.
    pub fn pdf_to_images(
        &self,
        file: &InputFile,
        format: ImageFormat,
    ) -> Result<Vec<Blob>, ConvertError> {
        boundary(Operation::PdfToImages, self.pdf_to_images_inner(file, format))
    }

    fn pdf_to_images_inner(
        &self,
        file: &InputFile,
        format: ImageFormat,
    ) -> Result<Vec<Blob>, Failure> {
        let count = pages::page_count(&file.bytes)? as usize;
        let target = format.document_format();
        (1..=count)
            .map(|n| -> Result<Blob, Failure> {
                let bytes = raster::placeholder_page(n, format, &self.config.raster)?;
                Ok(Blob::new(bytes, target, numbered_name(&file.name, n, target)).placeholder())
            })
            .collect()
    }

    /// Each PNG or JPEG on its own page, fitted and centered
    pub fn images_to_pdf(&self, files: &[InputFile]) -> Result<Blob, ConvertError> {
        boundary(Operation::ImagesToPdf, {
            images::images_to_pdf(files, self.config.page)
                .map(|bytes| Blob::new(bytes, DocumentFormat::Pdf, "images.pdf"))
        })
    }

    /// Pages of every input, inputs in the order given
    pub fn merge_pdfs(&self, files: &[InputFile]) -> Result<Blob, ConvertError> {
        let documents: Vec<&[u8]> = files.iter().map(|f| f.bytes.as_slice()).collect();
        boundary(Operation::MergePdfs, {
            merge::merge_documents(&documents)
                .map(|bytes| Blob::new(bytes, DocumentFormat::Pdf, "merged.pdf"))
        })
    }

    /// One single-page PDF per page, named `<stem>-<n>.pdf`
    pub fn split_pdf(&self, file: &InputFile) -> Result<Vec<Blob>, ConvertError> {
        boundary(Operation::SplitPdf, {
            split::split_pages(&file.bytes).map(|parts| {
                parts
                    .into_iter()
                    .enumerate()
                    .map(|(i, bytes)| {
                        let name = numbered_name(&file.name, i + 1, DocumentFormat::Pdf);
                        Blob::new(bytes, DocumentFormat::Pdf, name)
                    })
                    .collect()
            })
        })
    }

    /// Re-serialize without object streams. No other size reduction.
    pub fn compress_pdf(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(
            Operation::CompressPdf,
            pages::reserialize(&file.bytes).map(|bytes| pdf_blob(file, bytes)),
        )
    }

    /// Set every page's rotation to `degrees`, which must be a multiple of 90
    pub fn rotate_pdf(&self, file: &InputFile, degrees: i32) -> Result<Blob, ConvertError> {
        boundary(
            Operation::RotatePdf,
            pages::rotate(&file.bytes, degrees).map(|bytes| pdf_blob(file, bytes)),
        )
    }

    pub fn add_watermark(&self, file: &InputFile, text: &str) -> Result<Blob, ConvertError> {
        boundary(
            Operation::AddWatermark,
            stamp::add_watermark(&file.bytes, text, &self.config.watermark)
                .map(|bytes| pdf_blob(file, bytes)),
        )
    }

    pub fn add_page_numbers(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(
            Operation::AddPageNumbers,
            stamp::add_page_numbers(&file.bytes, &self.config.page_numbers)
                .map(|bytes| pdf_blob(file, bytes)),
        )
    }

    /// Not implemented: returns the document unencrypted, flagged as a
    /// placeholder. The password is ignored.
    pub fn protect_pdf(&self, file: &InputFile, password: &str) -> Result<Blob, ConvertError> {
        tracing::warn!(
            file = %file.name,
            password_len = password.len(),
            "PDF encryption is not implemented; output is unprotected"
        );
        boundary(
            Operation::ProtectPdf,
            pages::reserialize(&file.bytes).map(|bytes| pdf_blob(file, bytes).placeholder()),
        )
    }

    /// Remove pages by 0-based index; unknown indices are ignored
    pub fn delete_pages(&self, file: &InputFile, indices: &[u32]) -> Result<Blob, ConvertError> {
        boundary(
            Operation::DeletePages,
            pages::delete(&file.bytes, indices).map(|bytes| pdf_blob(file, bytes)),
        )
    }

    /// Capture `url` and tile the snapshot over A4 pages
    pub async fn html_to_pdf<C: PageCapture>(
        &self,
        capture: &C,
        url: &str,
    ) -> Result<Blob, ConvertError> {
        let result = html::html_to_pdf(capture, url, self.config.page)
            .await
            .map(|bytes| Blob::new(bytes, DocumentFormat::Pdf, "webpage.pdf"));
        boundary(Operation::HtmlToPdf, result)
    }

    /// Wrap plain text onto as many pages as it needs.
    ///
    /// Layout does more than place one text block: lines that run past the
    /// bottom margin continue on a fresh page instead of being clipped, so
    /// long content always yields a multi-page PDF with every line kept.
    pub fn create_text_pdf(&self, content: &str, filename: &str) -> Result<Blob, ConvertError> {
        boundary(Operation::CreateTextPdf, self.render_text(content, filename))
    }

    pub(crate) fn render_text(&self, content: &str, filename: &str) -> Result<Blob, Failure> {
        let bytes = text::render_text_pdf(content, self.config.page, &self.config.text)?;
        Ok(Blob::new(
            bytes,
            DocumentFormat::Pdf,
            output_name(filename, DocumentFormat::Pdf),
        ))
    }

    pub fn download_file<T: SaveTarget + ?Sized>(
        &self,
        target: &T,
        blob: &Blob,
        filename: &str,
    ) -> Result<(), ConvertError> {
        boundary(
            Operation::DownloadFile,
            archive::download_file(target, blob, filename),
        )
    }

    /// Zip `entries` and save the archive; returns the archive blob
    pub fn download_as_zip<T: SaveTarget + ?Sized>(
        &self,
        target: &T,
        entries: &BatchDownloadSet,
        zip_name: &str,
    ) -> Result<Blob, ConvertError> {
        boundary(
            Operation::DownloadZip,
            archive::download_as_zip(target, entries, zip_name),
        )
    }
}

fn pdf_blob(file: &InputFile, bytes: Vec<u8>) -> Blob {
    Blob::new(bytes, DocumentFormat::Pdf, output_name(&file.name, DocumentFormat::Pdf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::create_test_pdf;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    fn pdf(name: &str, pages: u32) -> InputFile {
        InputFile::from_name(name, create_test_pdf(pages, "P"))
    }

    #[test]
    fn test_split_filenames() {
        let blobs = PdfProcessor::new().split_pdf(&pdf("report.pdf", 3)).unwrap();
        let names: Vec<_> = blobs.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(names, vec!["report-1.pdf", "report-2.pdf", "report-3.pdf"]);
    }

    #[test]
    fn test_pdf_to_images_is_placeholder_per_page() {
        let blobs = PdfProcessor::new()
            .pdf_to_images(&pdf("scan.pdf", 2), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(blobs.len(), 2);
        assert!(blobs.iter().all(Blob::is_placeholder));
        assert_eq!(blobs[1].filename, "scan-2.jpg");
        assert_eq!(blobs[1].mime, "image/jpeg");
    }

    #[test]
    fn test_protect_is_flagged_and_unencrypted() {
        let blob = PdfProcessor::new()
            .protect_pdf(&pdf("secret.pdf", 2), "secret")
            .unwrap();
        assert!(blob.is_placeholder());
        let doc = Document::load_mem(&blob.bytes).unwrap();
        assert!(doc.trailer.get(b"Encrypt").is_err());
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_errors_name_the_operation() {
        let err = PdfProcessor::new()
            .merge_pdfs(&[])
            .unwrap_err();
        assert_eq!(err.operation(), Operation::MergePdfs);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().starts_with("Failed to merge PDFs: "));
    }

    #[test]
    fn test_rotate_reports_invalid_angle() {
        let err = PdfProcessor::new()
            .rotate_pdf(&pdf("a.pdf", 1), 45)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.operation(), Operation::RotatePdf);
    }

    #[test]
    fn test_create_text_pdf_names_output() {
        let blob = PdfProcessor::new()
            .create_text_pdf("hello", "notes.txt")
            .unwrap();
        assert_eq!(blob.filename, "notes.pdf");
        assert_eq!(blob.mime, "application/pdf");
        assert!(!blob.is_placeholder());
    }

    #[test]
    fn test_config_reaches_watermark() {
        let mut config = ConvertConfig::default();
        config.watermark.font_size = 20.0;
        let processor = PdfProcessor::with_config(config);
        let blob = processor.add_watermark(&pdf("w.pdf", 1), "X").unwrap();
        let ops = &crate::test_support::page_operations(&blob.bytes)[0];
        assert!(crate::test_support::numeric_operands(ops, "Tf").contains(&vec![20.0]));
    }
}

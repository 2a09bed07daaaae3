//! Document Converter: office formats to PDF and back.
//!
//! Word and Excel inputs are reduced to their text and rendered through
//! [`PdfProcessor`]. The PowerPoint input path and every PDF-to-office path
//! do not read their input's content; their blobs are flagged as
//! placeholders.

use crate::config::ConvertConfig;
use crate::error::{boundary, ConvertError, Failure, Operation};
use crate::file::{output_name, Blob, DocumentFormat, InputFile};
use crate::office::{docx, xlsx};
use crate::processor::PdfProcessor;

#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    processor: PdfProcessor,
}

impl DocumentConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self {
            processor: PdfProcessor::with_config(config),
        }
    }

    pub fn processor(&self) -> &PdfProcessor {
        &self.processor
    }

    /// Paragraph text of a `.docx`, rendered as plain text
    pub fn word_to_pdf(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(Operation::WordToPdf, {
            docx::extract_text(&file.bytes)
                .and_then(|text| self.processor.render_text(&text, &file.name))
        })
    }

    /// Every sheet as CSV under a `Sheet: <name>` heading, rendered as plain text
    pub fn excel_to_pdf(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(Operation::ExcelToPdf, {
            xlsx::workbook_text(&file.bytes)
                .and_then(|text| self.processor.render_text(&text, &file.name))
        })
    }

    pub fn power_point_to_pdf(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        let text = format!(
            "PowerPoint Presentation: {}\n\n\
             This is a simplified conversion. Slide content, layout and images \
             are not included in this PDF.",
            display_name(file)
        );
        boundary(
            Operation::PowerPointToPdf,
            self.processor
                .render_text(&text, &file.name)
                .map(Blob::placeholder),
        )
    }

    /// Plain text tagged as a Word document
    pub fn pdf_to_word(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(Operation::PdfToWord, {
            let text = format!(
                "Converted from {}\n\n\
                 This is a simplified conversion. The text, layout and formatting \
                 of the original PDF are not preserved.",
                display_name(file)
            );
            Ok(placeholder_blob(text.into_bytes(), file, DocumentFormat::Word))
        })
    }

    /// A one-sheet workbook with fixed content
    pub fn pdf_to_excel(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(Operation::PdfToExcel, self.placeholder_workbook(file))
    }

    fn placeholder_workbook(&self, file: &InputFile) -> Result<Blob, Failure> {
        let rows = vec![
            vec!["Converted from".to_string(), display_name(file).to_string()],
            vec![
                "Note".to_string(),
                "Simplified conversion; PDF content is not extracted".to_string(),
            ],
            vec![
                "Column 1".to_string(),
                "Column 2".to_string(),
                "Column 3".to_string(),
            ],
        ];
        let bytes = xlsx::write_workbook("Sheet1", &rows)?;
        Ok(placeholder_blob(bytes, file, DocumentFormat::Excel))
    }

    /// Plain text tagged as a presentation
    pub fn pdf_to_power_point(&self, file: &InputFile) -> Result<Blob, ConvertError> {
        boundary(Operation::PdfToPowerPoint, {
            let text = format!(
                "Presentation converted from {}\n\n\
                 This is a simplified conversion. Slides are not generated from \
                 the PDF content.",
                display_name(file)
            );
            Ok(placeholder_blob(text.into_bytes(), file, DocumentFormat::PowerPoint))
        })
    }
}

fn display_name(file: &InputFile) -> &str {
    if file.name.is_empty() {
        "document"
    } else {
        &file.name
    }
}

fn placeholder_blob(bytes: Vec<u8>, file: &InputFile, target: DocumentFormat) -> Blob {
    Blob::new(bytes, target, output_name(&file.name, target)).placeholder()
}

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Every public entry point, named the way failures are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    WordToPdf,
    ExcelToPdf,
    PowerPointToPdf,
    PdfToWord,
    PdfToExcel,
    PdfToPowerPoint,
    PdfToImages,
    ImagesToPdf,
    MergePdfs,
    SplitPdf,
    CompressPdf,
    RotatePdf,
    AddWatermark,
    AddPageNumbers,
    ProtectPdf,
    DeletePages,
    HtmlToPdf,
    CreateTextPdf,
    DownloadFile,
    DownloadZip,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::WordToPdf => "convert Word to PDF",
            Operation::ExcelToPdf => "convert Excel to PDF",
            Operation::PowerPointToPdf => "convert PowerPoint to PDF",
            Operation::PdfToWord => "convert PDF to Word",
            Operation::PdfToExcel => "convert PDF to Excel",
            Operation::PdfToPowerPoint => "convert PDF to PowerPoint",
            Operation::PdfToImages => "convert PDF to images",
            Operation::ImagesToPdf => "convert images to PDF",
            Operation::MergePdfs => "merge PDFs",
            Operation::SplitPdf => "split PDF",
            Operation::CompressPdf => "compress PDF",
            Operation::RotatePdf => "rotate PDF",
            Operation::AddWatermark => "add watermark",
            Operation::AddPageNumbers => "add page numbers",
            Operation::ProtectPdf => "protect PDF",
            Operation::DeletePages => "delete pages",
            Operation::HtmlToPdf => "convert HTML to PDF",
            Operation::CreateTextPdf => "create text PDF",
            Operation::DownloadFile => "download file",
            Operation::DownloadZip => "download ZIP archive",
        };
        f.write_str(text)
    }
}

/// Failure cause callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed or missing input (corrupt PDF, not a DOCX, bad page range)
    InvalidInput,
    /// Input is well-formed but of a kind this crate does not handle
    UnsupportedFeature,
    /// An external resource (URL, save target) could not be reached
    ResourceUnavailable,
    /// A library call failed while producing output
    Internal,
}

/// A failure not yet attributed to an operation.
///
/// Collaborator traits ([`crate::SaveTarget`], [`crate::PageCapture`]) report
/// these; the operation boundary turns them into [`ConvertError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Failure {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported: {0}")]
    UnsupportedFeature(String),

    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl Failure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Failure::InvalidInput(_) => ErrorKind::InvalidInput,
            Failure::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
            Failure::ResourceUnavailable(_) => ErrorKind::ResourceUnavailable,
            Failure::Internal(_) => ErrorKind::Internal,
        }
    }

    fn into_detail(self) -> String {
        match self {
            Failure::InvalidInput(d)
            | Failure::UnsupportedFeature(d)
            | Failure::ResourceUnavailable(d)
            | Failure::Internal(d) => d,
        }
    }
}

/// Error returned by every public operation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to {operation}: {detail}")]
pub struct ConvertError {
    operation: Operation,
    kind: ErrorKind,
    detail: String,
}

impl ConvertError {
    pub fn new(operation: Operation, failure: Failure) -> Self {
        Self {
            operation,
            kind: failure.kind(),
            detail: failure.into_detail(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Attribute a failure to `operation`, logging the cause on the way out
pub(crate) fn boundary<T>(operation: Operation, result: Result<T, Failure>) -> Result<T, ConvertError> {
    result.map_err(|failure| {
        tracing::error!(%operation, kind = ?failure.kind(), cause = %failure, "operation failed");
        ConvertError::new(operation, failure)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_operation() {
        let err = ConvertError::new(
            Operation::WordToPdf,
            Failure::InvalidInput("missing word/document.xml".into()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to convert Word to PDF: missing word/document.xml"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.operation(), Operation::WordToPdf);
    }

    #[test]
    fn test_boundary_passes_success_through() {
        let ok: Result<u32, Failure> = Ok(3);
        assert_eq!(boundary(Operation::SplitPdf, ok).unwrap(), 3);
    }

    #[test]
    fn test_boundary_keeps_kind() {
        let err: Result<(), Failure> = Err(Failure::ResourceUnavailable("timeout".into()));
        let err = boundary(Operation::HtmlToPdf, err).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
        assert_eq!(err.detail(), "timeout");
    }
}

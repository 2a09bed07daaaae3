//! Input files, output blobs and filename derivation

use serde::Serialize;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_WORD: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_EXCEL: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_POWERPOINT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_ZIP: &str = "application/zip";

/// Formats this crate reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentFormat {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Png,
    Jpeg,
    Text,
    Zip,
}

impl DocumentFormat {
    pub fn mime(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => MIME_PDF,
            DocumentFormat::Word => MIME_WORD,
            DocumentFormat::Excel => MIME_EXCEL,
            DocumentFormat::PowerPoint => MIME_POWERPOINT,
            DocumentFormat::Png => MIME_PNG,
            DocumentFormat::Jpeg => MIME_JPEG,
            DocumentFormat::Text => MIME_TEXT,
            DocumentFormat::Zip => MIME_ZIP,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "docx",
            DocumentFormat::Excel => "xlsx",
            DocumentFormat::PowerPoint => "pptx",
            DocumentFormat::Png => "png",
            DocumentFormat::Jpeg => "jpg",
            DocumentFormat::Text => "txt",
            DocumentFormat::Zip => "zip",
        }
    }

    /// Resolve a declared MIME type. Parameters such as `; charset=` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(DocumentFormat::Pdf),
            MIME_WORD | "application/msword" => Some(DocumentFormat::Word),
            MIME_EXCEL | "application/vnd.ms-excel" => Some(DocumentFormat::Excel),
            MIME_POWERPOINT | "application/vnd.ms-powerpoint" => {
                Some(DocumentFormat::PowerPoint)
            }
            "image/png" => Some(DocumentFormat::Png),
            "image/jpeg" | "image/jpg" => Some(DocumentFormat::Jpeg),
            "text/plain" => Some(DocumentFormat::Text),
            "application/zip" | "application/x-zip-compressed" => Some(DocumentFormat::Zip),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Word),
            "xlsx" | "xls" => Some(DocumentFormat::Excel),
            "pptx" | "ppt" => Some(DocumentFormat::PowerPoint),
            "png" => Some(DocumentFormat::Png),
            "jpg" | "jpeg" => Some(DocumentFormat::Jpeg),
            "txt" => Some(DocumentFormat::Text),
            "zip" => Some(DocumentFormat::Zip),
            _ => None,
        }
    }
}

/// A caller-supplied file: read once per operation, never modified
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    /// Declared MIME type; may be empty when the caller does not know it
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Build an input whose MIME type is inferred from the filename
    pub fn from_name(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = split_extension(&name)
            .1
            .and_then(DocumentFormat::from_extension)
            .map(DocumentFormat::mime)
            .unwrap_or_default();
        Self::new(name, mime, bytes)
    }

    /// Declared format, falling back to the filename extension
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_mime(&self.mime)
            .or_else(|| split_extension(&self.name).1.and_then(DocumentFormat::from_extension))
    }

    /// Filename without directory or extension
    pub fn stem(&self) -> &str {
        split_extension(&self.name).0
    }
}

/// Whether an output actually carries its input's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fidelity {
    Faithful,
    /// Fixed or stand-in content; the conversion is not implemented
    Placeholder,
}

/// One conversion output, ready to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub filename: String,
    pub fidelity: Fidelity,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: format.mime().to_string(),
            filename: filename.into(),
            fidelity: Fidelity::Faithful,
        }
    }

    pub fn placeholder(self) -> Self {
        Self {
            fidelity: Fidelity::Placeholder,
            ..self
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.fidelity == Fidelity::Placeholder
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// `report.docx` + Pdf -> `report.pdf`
pub fn output_name(input_name: &str, target: DocumentFormat) -> String {
    let stem = split_extension(input_name).0;
    let stem = if stem.is_empty() { "document" } else { stem };
    format!("{}.{}", stem, target.extension())
}

/// `report.pdf` + 2 + Pdf -> `report-2.pdf`
pub fn numbered_name(input_name: &str, number: usize, target: DocumentFormat) -> String {
    let stem = split_extension(input_name).0;
    let stem = if stem.is_empty() { "document" } else { stem };
    format!("{}-{}.{}", stem, number, target.extension())
}

/// Split a path into (basename stem, extension). Dotfiles keep their name as stem.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    }
}

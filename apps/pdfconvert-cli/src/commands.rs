use anyhow::{bail, Context, Result};
use clap::Subcommand;
use pdfconvert_core::{
    parse_ranges, BatchDownloadSet, Blob, ConvertConfig, DirectorySaveTarget, DocumentConverter,
    ImageFormat, InputFile,
};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Word (.docx) text to PDF
    WordToPdf { input: PathBuf },
    /// Excel (.xlsx) sheets as CSV text to PDF
    ExcelToPdf { input: PathBuf },
    /// PowerPoint to PDF (placeholder page only)
    PptToPdf { input: PathBuf },
    /// PDF to Word (placeholder content only)
    PdfToWord { input: PathBuf },
    /// PDF to Excel (placeholder workbook only)
    PdfToExcel { input: PathBuf },
    /// PDF to PowerPoint (placeholder content only)
    PdfToPpt { input: PathBuf },
    /// One labelled placeholder image per page
    PdfToImages {
        input: PathBuf,
        /// png or jpeg
        #[arg(short, long, default_value = "png")]
        format: String,
    },
    /// PNG and JPEG images, one per page
    ImagesToPdf {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Concatenate PDFs in the order given
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// One PDF per page
    Split { input: PathBuf },
    /// Re-serialize a PDF
    Compress { input: PathBuf },
    /// Set every page's rotation
    Rotate {
        input: PathBuf,
        #[arg(short, long, default_value_t = 90, allow_hyphen_values = true)]
        degrees: i32,
    },
    /// Stamp text across every page
    Watermark {
        input: PathBuf,
        #[arg(short, long)]
        text: String,
    },
    /// Number pages at the bottom center
    PageNumbers { input: PathBuf },
    /// Not implemented: writes the PDF unencrypted
    Protect {
        input: PathBuf,
        #[arg(short, long)]
        password: String,
    },
    /// Remove pages, given as 1-based ranges like "1-3, 5"
    DeletePages {
        input: PathBuf,
        #[arg(short, long)]
        pages: String,
    },
    /// Plain text file to PDF
    Text { input: PathBuf },
}

pub fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    let Some(path) = path else {
        return Ok(ConvertConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn parse_config(text: &str) -> Result<ConvertConfig> {
    Ok(toml::from_str(text)?)
}

fn read_input(path: &Path) -> Result<InputFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(InputFile::from_name(name, bytes))
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    paths.iter().map(|p| read_input(p)).collect()
}

/// Run one command and collect its outputs
pub fn execute(command: &Command, config: ConvertConfig) -> Result<Vec<Blob>> {
    let converter = DocumentConverter::with_config(config);
    let processor = converter.processor();

    let outputs = match command {
        Command::WordToPdf { input } => vec![converter.word_to_pdf(&read_input(input)?)?],
        Command::ExcelToPdf { input } => vec![converter.excel_to_pdf(&read_input(input)?)?],
        Command::PptToPdf { input } => vec![converter.power_point_to_pdf(&read_input(input)?)?],
        Command::PdfToWord { input } => vec![converter.pdf_to_word(&read_input(input)?)?],
        Command::PdfToExcel { input } => vec![converter.pdf_to_excel(&read_input(input)?)?],
        Command::PdfToPpt { input } => vec![converter.pdf_to_power_point(&read_input(input)?)?],
        Command::PdfToImages { input, format } => {
            let format: ImageFormat = format.parse()?;
            processor.pdf_to_images(&read_input(input)?, format)?
        }
        Command::ImagesToPdf { inputs } => vec![processor.images_to_pdf(&read_inputs(inputs)?)?],
        Command::Merge { inputs } => vec![processor.merge_pdfs(&read_inputs(inputs)?)?],
        Command::Split { input } => processor.split_pdf(&read_input(input)?)?,
        Command::Compress { input } => vec![processor.compress_pdf(&read_input(input)?)?],
        Command::Rotate { input, degrees } => {
            vec![processor.rotate_pdf(&read_input(input)?, *degrees)?]
        }
        Command::Watermark { input, text } => {
            vec![processor.add_watermark(&read_input(input)?, text)?]
        }
        Command::PageNumbers { input } => vec![processor.add_page_numbers(&read_input(input)?)?],
        Command::Protect { input, password } => {
            vec![processor.protect_pdf(&read_input(input)?, password)?]
        }
        Command::DeletePages { input, pages } => {
            let indices = page_indices(pages)?;
            vec![processor.delete_pages(&read_input(input)?, &indices)?]
        }
        Command::Text { input } => {
            let file = read_input(input)?;
            let content = String::from_utf8(file.bytes)
                .with_context(|| format!("{} is not UTF-8 text", input.display()))?;
            vec![processor.create_text_pdf(&content, &file.name)?]
        }
    };

    for blob in outputs.iter().filter(|b| b.is_placeholder()) {
        tracing::warn!(file = %blob.filename, "output is a placeholder and does not carry the input's content");
    }
    Ok(outputs)
}

/// 1-based page ranges to 0-based indices
fn page_indices(ranges: &str) -> Result<Vec<u32>> {
    let pages = parse_ranges(ranges)?;
    if pages.is_empty() {
        bail!("No pages given in {:?}", ranges);
    }
    Ok(pages.into_iter().map(|p| p - 1).collect())
}

/// Write outputs into `dir`, or one archive when `zip_name` is given
pub fn save(outputs: &[Blob], dir: &Path, zip_name: Option<&str>) -> Result<Vec<PathBuf>> {
    let target = DirectorySaveTarget::new(dir);
    let processor = pdfconvert_core::PdfProcessor::new();

    if let Some(zip_name) = zip_name {
        let entries: BatchDownloadSet = outputs.iter().cloned().collect();
        let archive = processor.download_as_zip(&target, &entries, zip_name)?;
        return Ok(vec![dir.join(&archive.filename)]);
    }

    outputs
        .iter()
        .map(|blob| {
            processor.download_file(&target, blob, &blob.filename)?;
            Ok(dir.join(&blob.filename))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pdfconvert-cli-{}-{}", label, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config("[watermark]\nopacity = 0.5\n\n[text]\nfont_size = 10.0\n").unwrap();
        assert_eq!(config.watermark.opacity, 0.5);
        assert_eq!(config.text.font_size, 10.0);
        assert_eq!(config.page_numbers, ConvertConfig::default().page_numbers);
    }

    #[test]
    fn test_missing_config_is_default() {
        assert_eq!(load_config(None).unwrap(), ConvertConfig::default());
    }

    #[test]
    fn test_page_indices() {
        assert_eq!(page_indices("1-2, 4").unwrap(), vec![0, 1, 3]);
        assert!(page_indices("").is_err());
        assert!(page_indices("x").is_err());
    }

    #[test]
    fn test_text_then_split_into_zip() {
        let dir = temp_dir("split");
        let source = dir.join("notes.txt");
        std::fs::write(&source, "line\n".repeat(150)).unwrap();

        let pdf = execute(&Command::Text { input: source }, ConvertConfig::default()).unwrap();
        assert_eq!(pdf[0].filename, "notes.pdf");
        let written = save(&pdf, &dir, None).unwrap();
        assert_eq!(written, vec![dir.join("notes.pdf")]);

        let parts = execute(
            &Command::Split {
                input: dir.join("notes.pdf"),
            },
            ConvertConfig::default(),
        )
        .unwrap();
        assert!(parts.len() >= 2);
        assert_eq!(parts[0].filename, "notes-1.pdf");

        let written = save(&parts, &dir, Some("notes.zip")).unwrap();
        assert_eq!(written, vec![dir.join("notes.zip")]);
        assert!(dir.join("notes.zip").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_input_reports_path() {
        let err = execute(
            &Command::Compress {
                input: PathBuf::from("/nonexistent/in.pdf"),
            },
            ConvertConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/in.pdf"));
    }
}

//! WASM bindings for document conversion
//!
//! Every conversion runs in Rust; JavaScript only reads files and shows
//! results.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { Converter, InputBatch, downloadFile, downloadAsZip } from './pkg/pdfconvert_wasm.js';
//!
//! await init();
//!
//! const converter = new Converter(JSON.stringify({ watermark: { opacity: 0.2 } }));
//! const pdf = converter.wordToPdf(file.name, file.type, bytes);
//! downloadFile(pdf);
//!
//! const pages = converter.splitPdf("report.pdf", "application/pdf", bytes);
//! downloadAsZip(pages, "report.zip");
//!
//! const batch = new InputBatch();
//! batch.add("a.pdf", "application/pdf", bytesA);
//! batch.add("b.pdf", "application/pdf", bytesB);
//! downloadFile(converter.mergePdfs(batch));
//!
//! const page = await converter.htmlToPdf("/article.html");
//! ```

pub mod capture;
pub mod download;

use capture::IframeCapture;
use download::BrowserDownload;
use pdfconvert_core::{
    BatchDownloadSet, Blob, ConvertConfig, ConvertError, DocumentConverter, ImageFormat,
    InputFile, PdfProcessor,
};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(s: &str);
}

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Turn a conversion failure into a JS `Error` with `kind` and `operation` fields
fn to_js(err: ConvertError) -> JsValue {
    let message = err.to_string();
    #[cfg(target_arch = "wasm32")]
    console_error(&message);

    let error = js_sys::Error::new(&message);
    let _ = js_sys::Reflect::set(
        &error,
        &JsValue::from_str("kind"),
        &JsValue::from_str(&format!("{:?}", err.kind())),
    );
    let _ = js_sys::Reflect::set(
        &error,
        &JsValue::from_str("operation"),
        &JsValue::from_str(&err.operation().to_string()),
    );
    error.into()
}

/// One conversion result
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct OutputFile {
    blob: Blob,
}

#[wasm_bindgen]
impl OutputFile {
    /// Copy of the output bytes
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.blob.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.blob.mime.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.blob.filename.clone()
    }

    /// True when the output does not carry the input's content
    #[wasm_bindgen(getter, js_name = isPlaceholder)]
    pub fn is_placeholder(&self) -> bool {
        self.blob.is_placeholder()
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.blob.len()
    }
}

impl From<Blob> for OutputFile {
    fn from(blob: Blob) -> Self {
        Self { blob }
    }
}

/// Several outputs of one call, in order
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct OutputBatch {
    outputs: Vec<OutputFile>,
}

#[wasm_bindgen]
impl OutputBatch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.outputs.len()
    }

    pub fn get(&self, index: usize) -> Option<OutputFile> {
        self.outputs.get(index).cloned()
    }

    /// Append an output, e.g. to bundle results of several calls into one zip
    pub fn push(&mut self, output: &OutputFile) {
        self.outputs.push(output.clone());
    }
}

impl From<Vec<Blob>> for OutputBatch {
    fn from(blobs: Vec<Blob>) -> Self {
        Self {
            outputs: blobs.into_iter().map(OutputFile::from).collect(),
        }
    }
}

/// Files for operations that take several inputs
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct InputBatch {
    files: Vec<InputFile>,
}

#[wasm_bindgen]
impl InputBatch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, mime: &str, bytes: &[u8]) {
        self.files.push(input(name, mime, bytes));
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.files.len()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

fn input(name: &str, mime: &str, bytes: &[u8]) -> InputFile {
    InputFile::new(name, mime, bytes.to_vec())
}

/// Conversion entry point holding the layout configuration
#[wasm_bindgen]
pub struct Converter {
    converter: DocumentConverter,
}

impl Converter {
    fn processor(&self) -> &PdfProcessor {
        self.converter.processor()
    }
}

#[wasm_bindgen]
impl Converter {
    /// Create a converter from an optional JSON configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Converter, JsValue> {
        let config = match config_json.as_deref().map(str::trim) {
            None | Some("") => ConvertConfig::default(),
            Some(json) => ConvertConfig::from_json(json)
                .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {}", e)))?,
        };
        Ok(Self {
            converter: DocumentConverter::with_config(config),
        })
    }

    /// Effective configuration as a plain object
    #[wasm_bindgen(getter)]
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.processor().config())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = wordToPdf)]
    pub fn word_to_pdf(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputFile, JsValue> {
        self.converter
            .word_to_pdf(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = excelToPdf)]
    pub fn excel_to_pdf(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputFile, JsValue> {
        self.converter
            .excel_to_pdf(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = powerPointToPdf)]
    pub fn power_point_to_pdf(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<OutputFile, JsValue> {
        self.converter
            .power_point_to_pdf(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = pdfToWord)]
    pub fn pdf_to_word(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputFile, JsValue> {
        self.converter
            .pdf_to_word(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = pdfToExcel)]
    pub fn pdf_to_excel(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputFile, JsValue> {
        self.converter
            .pdf_to_excel(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = pdfToPowerPoint)]
    pub fn pdf_to_power_point(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<OutputFile, JsValue> {
        self.converter
            .pdf_to_power_point(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    /// `format` is "png" or "jpeg"
    #[wasm_bindgen(js_name = pdfToImages)]
    pub fn pdf_to_images(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        format: &str,
    ) -> Result<OutputBatch, JsValue> {
        let format: ImageFormat = format
            .parse()
            .map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        self.processor()
            .pdf_to_images(&input(name, mime, bytes), format)
            .map(OutputBatch::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = imagesToPdf)]
    pub fn images_to_pdf(&self, batch: &InputBatch) -> Result<OutputFile, JsValue> {
        self.processor()
            .images_to_pdf(&batch.files)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = mergePdfs)]
    pub fn merge_pdfs(&self, batch: &InputBatch) -> Result<OutputFile, JsValue> {
        self.processor()
            .merge_pdfs(&batch.files)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = splitPdf)]
    pub fn split_pdf(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputBatch, JsValue> {
        self.processor()
            .split_pdf(&input(name, mime, bytes))
            .map(OutputBatch::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = compressPdf)]
    pub fn compress_pdf(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<OutputFile, JsValue> {
        self.processor()
            .compress_pdf(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    /// Defaults to 90 degrees
    #[wasm_bindgen(js_name = rotatePdf)]
    pub fn rotate_pdf(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        degrees: Option<i32>,
    ) -> Result<OutputFile, JsValue> {
        self.processor()
            .rotate_pdf(&input(name, mime, bytes), degrees.unwrap_or(90))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = addWatermark)]
    pub fn add_watermark(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        text: &str,
    ) -> Result<OutputFile, JsValue> {
        self.processor()
            .add_watermark(&input(name, mime, bytes), text)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = addPageNumbers)]
    pub fn add_page_numbers(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<OutputFile, JsValue> {
        self.processor()
            .add_page_numbers(&input(name, mime, bytes))
            .map(OutputFile::from)
            .map_err(to_js)
    }

    /// Not implemented: the output is unencrypted and `isPlaceholder` is set
    #[wasm_bindgen(js_name = protectPdf)]
    pub fn protect_pdf(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        password: &str,
    ) -> Result<OutputFile, JsValue> {
        self.processor()
            .protect_pdf(&input(name, mime, bytes), password)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    /// `pages` are 0-based indices
    #[wasm_bindgen(js_name = deletePages)]
    pub fn delete_pages(
        &self,
        name: &str,
        mime: &str,
        bytes: &[u8],
        pages: &[u32],
    ) -> Result<OutputFile, JsValue> {
        self.processor()
            .delete_pages(&input(name, mime, bytes), pages)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = createTextPdf)]
    pub fn create_text_pdf(&self, content: &str, filename: &str) -> Result<OutputFile, JsValue> {
        self.processor()
            .create_text_pdf(content, filename)
            .map(OutputFile::from)
            .map_err(to_js)
    }

    /// Render a same-origin page off-screen and tile it into a PDF.
    /// Resolves to an `OutputFile`.
    #[wasm_bindgen(js_name = htmlToPdf)]
    pub fn html_to_pdf(&self, url: String) -> js_sys::Promise {
        let processor = self.processor().clone();
        wasm_bindgen_futures::future_to_promise(async move {
            processor
                .html_to_pdf(&IframeCapture::default(), &url)
                .await
                .map(|blob| OutputFile::from(blob).into())
                .map_err(to_js)
        })
    }
}

/// Trigger a browser download of one output
#[wasm_bindgen(js_name = downloadFile)]
pub fn download_file(output: &OutputFile, filename: Option<String>) -> Result<(), JsValue> {
    let name = filename.unwrap_or_else(|| output.blob.filename.clone());
    PdfProcessor::new()
        .download_file(&BrowserDownload, &output.blob, &name)
        .map_err(to_js)
}

/// Zip every output and download the archive
#[wasm_bindgen(js_name = downloadAsZip)]
pub fn download_as_zip(outputs: &OutputBatch, zip_name: &str) -> Result<OutputFile, JsValue> {
    let entries: BatchDownloadSet = outputs.outputs.iter().map(|o| o.blob.clone()).collect();
    PdfProcessor::new()
        .download_as_zip(&BrowserDownload, &entries, zip_name)
        .map(OutputFile::from)
        .map_err(to_js)
}

/// Parse a 1-based page range string like "1-3, 5" into 0-based indices for `deletePages`
#[wasm_bindgen(js_name = parsePageRanges)]
pub fn parse_page_ranges(input: &str) -> Result<Vec<u32>, JsValue> {
    page_indices(input).map_err(|e| JsValue::from_str(&format!("Invalid range: {}", e)))
}

fn page_indices(input: &str) -> Result<Vec<u32>, pdfconvert_core::Failure> {
    Ok(pdfconvert_core::parse_ranges(input)?
        .into_iter()
        .map(|page| page - 1)
        .collect())
}

//! Client-side document conversion
//!
//! Office documents and images to PDF, PDF page edits (merge, split,
//! rotate, delete, stamp) and download helpers, all as pure functions of
//! their input bytes so they run the same natively and in WebAssembly.
//!
//! - [`DocumentConverter`]: Word/Excel/PowerPoint to PDF and back
//! - [`PdfProcessor`]: image and PDF operations, HTML snapshot tiling, downloads
//!
//! Some conversions do not carry their input's content; their outputs are
//! marked with [`Fidelity::Placeholder`].

mod archive;
pub mod config;
mod converter;
mod document;
pub mod error;
pub mod file;
mod html;
mod images;
mod merge;
mod office;
mod pages;
mod processor;
mod raster;
mod split;
mod stamp;
mod text;

#[cfg(test)]
mod test_support;

pub use archive::{BatchDownloadSet, DirectorySaveTarget, SaveTarget};
pub use config::{ConvertConfig, PageSize};
pub use converter::DocumentConverter;
pub use error::{ConvertError, ErrorKind, Failure, Operation};
pub use file::{output_name, numbered_name, Blob, DocumentFormat, Fidelity, InputFile};
pub use html::PageCapture;
pub use pages::{page_count, parse_ranges, MAX_PAGE_NUMBER};
pub use processor::PdfProcessor;
pub use raster::ImageFormat;

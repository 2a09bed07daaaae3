//! Downloads: handing blobs to a save target, singly or zipped together

use crate::error::Failure;
use crate::file::{Blob, DocumentFormat};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Where "downloaded" blobs end up.
///
/// The browser build triggers a download; native builds write into a
/// directory.
pub trait SaveTarget {
    fn save(&self, blob: &Blob, filename: &str) -> Result<(), Failure>;
}

/// Saves every blob as a file inside one directory
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, blob: &Blob, filename: &str) -> Result<(), Failure> {
        // Only the final path component is honored
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| Failure::InvalidInput(format!("Invalid filename: {:?}", filename)))?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Failure::ResourceUnavailable(format!("Cannot create {}: {}", self.dir.display(), e))
        })?;
        let path = self.dir.join(name);
        std::fs::write(&path, &blob.bytes).map_err(|e| {
            Failure::ResourceUnavailable(format!("Cannot write {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), bytes = blob.len(), "saved file");
        Ok(())
    }
}

/// Filename-to-blob entries in insertion order.
///
/// Inserting a filename that is already present replaces its blob and keeps
/// its position.
#[derive(Debug, Clone, Default)]
pub struct BatchDownloadSet {
    entries: Vec<(String, Blob)>,
}

impl BatchDownloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, blob: Blob) {
        let filename = filename.into();
        match self.entries.iter_mut().find(|(name, _)| *name == filename) {
            Some((_, existing)) => *existing = blob,
            None => self.entries.push((filename, blob)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Blob)> {
        self.entries.iter().map(|(name, blob)| (name.as_str(), blob))
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Deflate every entry into one zip archive
    pub fn to_zip(&self) -> Result<Vec<u8>, Failure> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let zip_err = |e: zip::result::ZipError| Failure::Internal(format!("Failed to write ZIP: {}", e));

        for (name, blob) in &self.entries {
            writer.start_file(name.as_str(), options).map_err(zip_err)?;
            writer
                .write_all(&blob.bytes)
                .map_err(|e| Failure::Internal(format!("Failed to write ZIP entry {}: {}", name, e)))?;
        }

        let cursor = writer.finish().map_err(zip_err)?;
        Ok(cursor.into_inner())
    }
}

impl FromIterator<Blob> for BatchDownloadSet {
    /// Collect blobs keyed by their own suggested filenames
    fn from_iter<I: IntoIterator<Item = Blob>>(iter: I) -> Self {
        let mut set = Self::new();
        for blob in iter {
            set.insert(blob.filename.clone(), blob);
        }
        set
    }
}

pub(crate) fn download_file<T: SaveTarget + ?Sized>(
    target: &T,
    blob: &Blob,
    filename: &str,
) -> Result<(), Failure> {
    if filename.trim().is_empty() {
        return Err(Failure::InvalidInput("Filename is empty".into()));
    }
    target.save(blob, filename)
}

/// Zip every entry and save the archive under `zip_name`
pub(crate) fn download_as_zip<T: SaveTarget + ?Sized>(
    target: &T,
    entries: &BatchDownloadSet,
    zip_name: &str,
) -> Result<Blob, Failure> {
    if entries.is_empty() {
        return Err(Failure::InvalidInput("No files to archive".into()));
    }
    let archive = Blob::new(entries.to_zip()?, DocumentFormat::Zip, zip_name);
    download_file(target, &archive, zip_name)?;
    tracing::debug!(entries = entries.len(), zip_name, "saved archive");
    Ok(archive)
}

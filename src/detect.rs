//! File format detection and the analysis target.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// Plain text (`.txt`)
    Text,
    /// Portable Document Format (`.pdf`)
    Pdf,
    /// Office Open XML word processing document (`.docx`)
    Docx,
}

impl FileFormat {
    /// All supported formats, in display order.
    pub const ALL: [FileFormat; 3] = [FileFormat::Pdf, FileFormat::Docx, FileFormat::Text];

    /// Map a file extension (with or without the leading dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Some(FileFormat::Text),
            "pdf" => Some(FileFormat::Pdf),
            "docx" => Some(FileFormat::Docx),
            _ => None,
        }
    }

    /// Map a path to a format using its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical lowercase extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Text => "txt",
            FileFormat::Pdf => "pdf",
            FileFormat::Docx => "docx",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            FileFormat::Text => "Text files",
            FileFormat::Pdf => "PDF files",
            FileFormat::Docx => "DOCX files",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FileFormat::Text => "TXT",
            FileFormat::Pdf => "PDF",
            FileFormat::Docx => "DOCX",
        })
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Local file header of a zip container (DOCX packages are zips).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Sniff the format from the first bytes of a file.
///
/// Plain text has no signature, so only PDF and DOCX are recognised here.
pub fn detect_format_from_bytes(data: &[u8]) -> Option<FileFormat> {
    if data.starts_with(PDF_MAGIC) {
        Some(FileFormat::Pdf)
    } else if data.starts_with(ZIP_MAGIC) {
        Some(FileFormat::Docx)
    } else {
        None
    }
}

/// Sniff the format of a file on disk.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<Option<FileFormat>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = Vec::with_capacity(8);
    reader.by_ref().take(8).read_to_end(&mut header)?;
    Ok(detect_format_from_bytes(&header))
}

/// A file about to be analyzed.
///
/// Captured once at the start of an analysis and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTarget {
    path: PathBuf,
    size: u64,
    declared: Option<FileFormat>,
    detected: Option<FileFormat>,
}

impl AnalysisTarget {
    /// Inspect a file: size from metadata, declared format from the
    /// extension, detected format from the leading bytes.
    pub fn inspect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if metadata.is_dir() {
            return Err(Error::Validation(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            declared: FileFormat::from_path(path),
            detected: detect_format_from_path(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Format implied by the file extension.
    pub fn declared_format(&self) -> Option<FileFormat> {
        self.declared
    }

    /// Format implied by the file signature.
    pub fn detected_format(&self) -> Option<FileFormat> {
        self.detected
    }
}

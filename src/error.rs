//! Error types for docstat library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docstat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while analyzing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened or read before analysis started.
    #[error("Cannot read file: {}", .0.display())]
    Validation(PathBuf),

    /// The file is larger than the configured limit.
    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// No analyzer is registered for the file's extension.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error opening or parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error opening or parsing a DOCX package.
    #[error("DOCX parsing error: {0}")]
    DocxParse(String),

    /// Error reading the zip container of a DOCX package.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML inside a DOCX package.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Text could not be decoded with the detected encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Error during rendering (report, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

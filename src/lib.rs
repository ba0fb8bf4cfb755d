//! # docstat
//!
//! Document statistics for plain text, PDF and DOCX files.
//!
//! Each file type has an analyzer that validates the file, collects
//! statistics and returns an ordered [`StructuredResult`]. Results render as
//! a flat `label: value` report or as JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstat::analyze_file;
//!
//! // Report text; failures come back as "error: <message>"
//! let report = analyze_file("document.pdf");
//! println!("{}", report);
//! ```
//!
//! ## Features
//!
//! - **Text**: encoding detection, line and word counts, word frequencies
//! - **PDF**: metadata, image colorspaces per page, fonts and font sizes
//! - **DOCX**: structure counts, run formatting, table and style usage
//! - **Output**: plain report or JSON with entry order preserved

pub mod analyzer;
pub mod detect;
pub mod encoding;
pub mod error;
pub mod model;
pub mod options;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use analyzer::{
    Analyzer, AnalyzerFactory, AnalyzerRegistry, DocxAnalyzer, PdfAnalyzer, TextAnalyzer,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, AnalysisTarget, FileFormat};
pub use encoding::{detect_encoding, DetectedEncoding};
pub use error::{Error, Result};
pub use model::{StructuredResult, Value};
pub use options::AnalyzeOptions;
pub use render::{to_json, to_report, JsonFormat};

use std::path::Path;

/// Analyze a file with default options and return the report text.
///
/// The analyzer is chosen by extension. Every failure, including an
/// unsupported extension, is reported as `error: <message>`.
///
/// # Example
///
/// ```no_run
/// use docstat::analyze_file;
///
/// let report = analyze_file("notes.txt");
/// assert!(!report.is_empty());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> String {
    analyze_file_with_options(path, AnalyzeOptions::default())
}

/// Analyze a file with custom options and return the report text.
///
/// # Example
///
/// ```no_run
/// use docstat::{analyze_file_with_options, AnalyzeOptions};
///
/// let options = AnalyzeOptions::new().with_top_words(3).unlimited_size();
/// let report = analyze_file_with_options("notes.txt", options);
/// ```
pub fn analyze_file_with_options<P: AsRef<Path>>(path: P, options: AnalyzeOptions) -> String {
    let result = Docstat::new().with_options(options).analyze(path);
    to_report(&result)
}

/// Analyze a text file and return the report text.
pub fn analyze_txt<P: AsRef<Path>>(path: P) -> String {
    let analyzer = TextAnalyzer::new(path);
    analyzer.format(&analyzer.analyze())
}

/// Analyze a PDF file and return the report text.
pub fn analyze_pdf<P: AsRef<Path>>(path: P) -> String {
    let analyzer = PdfAnalyzer::new(path);
    analyzer.format(&analyzer.analyze())
}

/// Analyze a DOCX file and return the report text.
pub fn analyze_docx<P: AsRef<Path>>(path: P) -> String {
    let analyzer = DocxAnalyzer::new(path);
    analyzer.format(&analyzer.analyze())
}

/// Builder for analyzing documents with shared options.
///
/// # Example
///
/// ```no_run
/// use docstat::{Docstat, JsonFormat};
///
/// let json = Docstat::new()
///     .with_top_words(5)
///     .with_max_size_mb(20)
///     .json("report.docx", JsonFormat::Pretty)?;
/// println!("{}", json);
/// # Ok::<(), docstat::Error>(())
/// ```
pub struct Docstat {
    options: AnalyzeOptions,
    registry: AnalyzerRegistry,
}

impl Docstat {
    /// Create a builder with default options and the built-in analyzers.
    pub fn new() -> Self {
        Self {
            options: AnalyzeOptions::default(),
            registry: AnalyzerRegistry::with_defaults(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set how many frequent words the text analyzer reports.
    pub fn with_top_words(mut self, count: usize) -> Self {
        self.options = self.options.with_top_words(count);
        self
    }

    /// Set the file size limit in mebibytes; `0` disables the limit.
    pub fn with_max_size_mb(mut self, mb: u64) -> Self {
        self.options = if mb == 0 {
            self.options.unlimited_size()
        } else {
            self.options.with_max_file_size(mb.saturating_mul(1024 * 1024))
        };
        self
    }

    /// Use a custom registry.
    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Options used for every analysis.
    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Registry used to pick analyzers.
    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    /// Analyze a file; an unsupported extension becomes an error result.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> StructuredResult {
        match self.registry.create(path.as_ref(), self.options.clone()) {
            Ok(analyzer) => analyzer.analyze(),
            Err(e) => {
                log::error!("{}", e);
                StructuredResult::error(e.to_string())
            }
        }
    }

    /// Analyze a file and render the plain report.
    pub fn report<P: AsRef<Path>>(&self, path: P) -> String {
        to_report(&self.analyze(path))
    }

    /// Analyze a file and render JSON.
    pub fn json<P: AsRef<Path>>(&self, path: P, format: JsonFormat) -> Result<String> {
        to_json(&self.analyze(path), format)
    }
}

impl Default for Docstat {
    fn default() -> Self {
        Self::new()
    }
}

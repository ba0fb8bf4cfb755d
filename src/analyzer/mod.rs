//! Analyzer contract and the per-format implementations.
//!
//! Every analyzer is constructed with a file path and does no I/O until
//! [`Analyzer::analyze`] is called. `analyze` validates the file first and
//! never fails: errors come back as a [`StructuredResult`] holding a single
//! `error` entry.
//!
//! # Example
//!
//! ```no_run
//! use docstat::analyzer::{Analyzer, TextAnalyzer};
//!
//! let analyzer = TextAnalyzer::new("notes.txt");
//! let result = analyzer.analyze();
//! println!("{}", analyzer.format(&result));
//! ```

mod docx;
mod pdf;
mod registry;
mod text;

pub use docx::DocxAnalyzer;
pub use pdf::PdfAnalyzer;
pub use registry::{AnalyzerFactory, AnalyzerRegistry};
pub use text::{TextAnalyzer, TextStats};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::detect::AnalysisTarget;
use crate::error::{Error, Result};
use crate::model::StructuredResult;
use crate::options::AnalyzeOptions;
use crate::render::to_report;

/// Common interface of all file-type analyzers.
pub trait Analyzer {
    /// Short lowercase name (e.g. `"pdf"`).
    fn name(&self) -> &str;

    /// Path of the file this analyzer was constructed for.
    fn path(&self) -> &Path;

    /// Options this analyzer was constructed with.
    fn options(&self) -> &AnalyzeOptions;

    /// Analyze the file.
    ///
    /// Implementations call [`validate_target`](Self::validate_target) first
    /// and return a single-entry error result if it fails.
    fn analyze(&self) -> StructuredResult;

    /// Check that the file can be read and is within the size limit.
    ///
    /// Failures are logged before being returned.
    fn validate_target(&self) -> Result<AnalysisTarget> {
        check_file(self.path(), self.options()).map_err(|e| {
            log::error!(
                "[{}] Validation failed for {}: {}",
                self.name(),
                self.path().display(),
                e
            );
            e
        })
    }

    /// Whether the file passes validation.
    fn validate(&self) -> bool {
        self.validate_target().is_ok()
    }

    /// Render a result as a plain-text report.
    fn format(&self, result: &StructuredResult) -> String {
        to_report(result)
    }
}

/// Open the file, read one byte and check its size.
///
/// An empty file passes: reading it succeeds and returns no data.
pub fn check_file(path: &Path, options: &AnalyzeOptions) -> Result<AnalysisTarget> {
    let target = AnalysisTarget::inspect(path).map_err(|e| match e {
        Error::Io(_) => Error::Validation(path.to_path_buf()),
        other => other,
    })?;

    if let Some(limit) = options.max_file_size {
        if target.size() > limit {
            return Err(Error::FileTooLarge {
                size: target.size(),
                limit,
            });
        }
    }

    let mut file = File::open(path).map_err(|_| Error::Validation(path.to_path_buf()))?;
    let mut probe = [0u8; 1];
    let probed = file
        .read(&mut probe)
        .map_err(|_| Error::Validation(path.to_path_buf()))?;
    log::debug!(
        "Validated {} ({} bytes, probe read {})",
        path.display(),
        target.size(),
        probed
    );

    Ok(target)
}

/// Number of whitespace-separated tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters (Unicode scalar values, not bytes).
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

//! Extension-keyed dispatch to analyzers.
//!
//! # Example
//!
//! ```no_run
//! use docstat::analyzer::AnalyzerRegistry;
//! use docstat::AnalyzeOptions;
//!
//! fn main() -> docstat::Result<()> {
//!     let registry = AnalyzerRegistry::with_defaults();
//!     let analyzer = registry.create("report.docx", AnalyzeOptions::default())?;
//!     let result = analyzer.analyze();
//!     println!("{}", analyzer.format(&result));
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use super::{Analyzer, DocxAnalyzer, PdfAnalyzer, TextAnalyzer};
use crate::detect::FileFormat;
use crate::error::{Error, Result};
use crate::options::AnalyzeOptions;

/// Constructor of an analyzer bound to one file.
pub type AnalyzerFactory = fn(&Path, AnalyzeOptions) -> Box<dyn Analyzer>;

/// Registry mapping lowercase file extensions to analyzer factories.
pub struct AnalyzerRegistry {
    factories: BTreeMap<String, AnalyzerFactory>,
}

impl AnalyzerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Create a registry with the text, PDF and DOCX analyzers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FileFormat::Text.extension(), |path, options| {
            Box::new(TextAnalyzer::with_options(path, options))
        });
        registry.register(FileFormat::Pdf.extension(), |path, options| {
            Box::new(PdfAnalyzer::with_options(path, options))
        });
        registry.register(FileFormat::Docx.extension(), |path, options| {
            Box::new(DocxAnalyzer::with_options(path, options))
        });
        registry
    }

    /// Register a factory for an extension (without the leading dot).
    ///
    /// Replaces any factory already registered for it.
    pub fn register(&mut self, ext: &str, factory: AnalyzerFactory) {
        self.factories
            .insert(ext.trim_start_matches('.').to_lowercase(), factory);
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.factories
            .contains_key(&ext.trim_start_matches('.').to_lowercase())
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the analyzer for a file, chosen by its extension.
    pub fn create<P: AsRef<Path>>(
        &self,
        path: P,
        options: AnalyzeOptions,
    ) -> Result<Box<dyn Analyzer>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

        let factory = self
            .factories
            .get(&ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!(".{}", ext)))?;

        log::debug!("Using {} analyzer for {}", ext, path.display());
        Ok(factory(path, options))
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! PDF analyzer: metadata, image colorspaces per page, font inventory.
//!
//! Failures are isolated per page and per image: a broken image or page is
//! logged and skipped, and the rest of the document still contributes to the
//! result. Only a document that cannot be opened fails the analysis.

use std::path::{Path, PathBuf};

use super::Analyzer;
use crate::detect::FileFormat;
use crate::model::{ColorCategory, FontInventory, PageColorProfile, StructuredResult};
use crate::options::AnalyzeOptions;
use crate::parser::{LopdfBackend, PageId, PdfBackend, PdfMetadata};

/// Shown for absent metadata entries.
const UNKNOWN: &str = "unknown";
/// Shown for an empty page set.
const NONE: &str = "none";
/// Shown when nothing was observed.
const NO_DATA: &str = "no data";

/// Page sizes closer than this (in mm) count as equal.
const PAGE_SIZE_TOLERANCE_MM: f32 = 0.05;

/// Analyzer for PDF files.
#[derive(Debug, Clone)]
pub struct PdfAnalyzer {
    path: PathBuf,
    options: AnalyzeOptions,
}

impl PdfAnalyzer {
    /// Create an analyzer with default options.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_options(path, AnalyzeOptions::default())
    }

    /// Create an analyzer with custom options.
    pub fn with_options<P: AsRef<Path>>(path: P, options: AnalyzeOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    /// Collect statistics from an opened document.
    ///
    /// All accumulators live for this call only, so repeated calls over the
    /// same document give the same result.
    pub fn analyze_backend<B: PdfBackend>(&self, backend: &B) -> StructuredResult {
        let pages = backend.pages();

        let mut result = StructuredResult::new();
        result.insert_scalar("Pages", pages.len());

        match backend.metadata() {
            Ok(metadata) => result.insert_list("Metadata", metadata_lines(&metadata)),
            Err(e) => {
                log::warn!("Failed to read metadata of {}: {}", self.path.display(), e);
                result.insert_list("Metadata", Vec::<String>::new());
            }
        }

        let mut profile = PageColorProfile::new();
        let mut fonts = FontInventory::new();
        let mut page_sizes: Vec<(f32, f32)> = Vec::with_capacity(pages.len());

        for (&page_num, &page_id) in &pages {
            self.scan_images(backend, page_num, page_id, &mut profile);
            self.scan_fonts(backend, page_num, page_id, &mut fonts);

            match backend.page_size_mm(page_id) {
                Ok(size) => page_sizes.push(size),
                Err(e) => log::warn!("Failed to read size of page {}: {}", page_num, e),
            }
        }

        result.insert_list(
            "Image statistics",
            ColorCategory::ALL
                .iter()
                .map(|c| format!("{}: {}", c, profile.count(*c))),
        );
        result.insert_scalar("Total images", profile.total_images());

        for category in ColorCategory::ALL {
            let label = format!("{} pages", category);
            let pages = profile.pages(category);
            if pages.is_empty() {
                result.insert_scalar(label, NONE);
            } else {
                result.insert_list(label, pages.iter().map(u32::to_string));
            }
        }

        let names = fonts.names();
        if names.is_empty() {
            result.insert_scalar("Fonts", NO_DATA);
        } else {
            result.insert_list("Fonts", names);
        }

        match fonts.size_range() {
            Some((min, max)) => {
                result.insert_scalar("Font sizes", format!("Min: {:.1}, Max: {:.1}", min, max))
            }
            None => result.insert_scalar("Font sizes", NO_DATA),
        }

        result.insert_scalar("Page size", describe_page_sizes(&page_sizes));
        result.insert_scalar("PDF version", backend.version());

        result
    }

    fn scan_images<B: PdfBackend>(
        &self,
        backend: &B,
        page_num: u32,
        page_id: PageId,
        profile: &mut PageColorProfile,
    ) {
        let images = match backend.page_images(page_id) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Failed to list images on page {}: {}", page_num, e);
                return;
            }
        };

        for image in &images {
            profile.add_image();
            match backend.image_channels(page_id, image) {
                Ok(Some(channels)) => {
                    if profile.classify(page_num, channels).is_none() {
                        log::debug!(
                            "Image {} on page {} has {} channels, not classified",
                            image.name,
                            page_num,
                            channels
                        );
                    }
                }
                Ok(None) => {
                    log::debug!("Image {} on page {} has no colorspace", image.name, page_num)
                }
                Err(e) => log::warn!(
                    "Failed to analyze image {} on page {}: {}",
                    image.name,
                    page_num,
                    e
                ),
            }
        }
    }

    fn scan_fonts<B: PdfBackend>(
        &self,
        backend: &B,
        page_num: u32,
        page_id: PageId,
        fonts: &mut FontInventory,
    ) {
        match backend.page_fonts(page_id) {
            Ok(names) => names.into_iter().for_each(|n| fonts.add_name(n)),
            Err(e) => log::warn!("Failed to read fonts on page {}: {}", page_num, e),
        }

        match backend.page_font_sizes(page_id) {
            Ok(sizes) => sizes.into_iter().for_each(|s| fonts.add_size(s)),
            Err(e) => log::warn!("Failed to read font sizes on page {}: {}", page_num, e),
        }
    }
}

impl Analyzer for PdfAnalyzer {
    fn name(&self) -> &str {
        "pdf"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    fn analyze(&self) -> StructuredResult {
        let target = match self.validate_target() {
            Ok(target) => target,
            Err(e) => return StructuredResult::error(e.to_string()),
        };
        if target.detected_format() != Some(FileFormat::Pdf) {
            log::warn!("{} does not start with a PDF header", self.path.display());
        }

        let backend = match LopdfBackend::load_file(&self.path) {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("Failed to open PDF file {}: {}", self.path.display(), e);
                return StructuredResult::error(format!("Failed to open PDF file: {}", e));
            }
        };
        if backend.is_encrypted() {
            log::warn!("{} is encrypted; statistics may be incomplete", self.path.display());
        }

        self.analyze_backend(&backend)
    }
}

fn metadata_lines(metadata: &PdfMetadata) -> Vec<String> {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    vec![
        format!("Author: {}", field(&metadata.author)),
        format!("Creator: {}", field(&metadata.creator)),
        format!("Creation date: {}", field(&metadata.creation_date)),
        format!("Modification date: {}", field(&metadata.modification_date)),
        format!("Title: {}", field(&metadata.title)),
    ]
}

/// `"W x H mm"` when every page has the same size.
fn describe_page_sizes(sizes: &[(f32, f32)]) -> String {
    let Some(&(width, height)) = sizes.first() else {
        return NO_DATA.to_string();
    };

    let uniform = sizes.iter().all(|&(w, h)| {
        (w - width).abs() < PAGE_SIZE_TOLERANCE_MM && (h - height).abs() < PAGE_SIZE_TOLERANCE_MM
    });
    if uniform {
        format!("{:.1} x {:.1} mm", width, height)
    } else {
        "mixed page sizes".to_string()
    }
}

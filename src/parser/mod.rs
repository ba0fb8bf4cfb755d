//! Document structure readers.
//!
//! PDF access goes through the [`PdfBackend`] trait; DOCX packages are read
//! into a [`DocxPackage`].

mod backend;
mod docx;
mod xml;

pub use backend::{format_pdf_date, ImageRef, LopdfBackend, PageId, PdfBackend, PdfMetadata};
pub use docx::{
    DocxCell, DocxPackage, DocxParagraph, DocxRow, DocxRun, DocxTable, Relationship, RunProperty,
    StyleSheet, FALLBACK_STYLE,
};
pub use xml::{parse_xml, XmlChild, XmlElement};

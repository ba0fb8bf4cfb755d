//! Data model shared by the analyzers and the renderers.
//!
//! [`StructuredResult`] is what every analyzer returns. [`PageColorProfile`],
//! [`FontInventory`], [`StyleHistogram`] and [`TableStats`] hold the
//! per-format state of a single analysis.

mod result;
mod stats;

pub use result::{StructuredResult, Value, ERROR_LABEL};
pub use stats::{ColorCategory, FontInventory, PageColorProfile, StyleHistogram, TableStats};

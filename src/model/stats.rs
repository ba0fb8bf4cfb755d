//! Accumulators built up while scanning a document.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};

/// Image colorspace category, keyed by channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorCategory {
    Rgb,
    Cmyk,
    Grayscale,
}

impl ColorCategory {
    /// Report order.
    pub const ALL: [ColorCategory; 3] = [
        ColorCategory::Rgb,
        ColorCategory::Cmyk,
        ColorCategory::Grayscale,
    ];

    /// Classify by number of color components; 1, 3 and 4 are known.
    pub fn from_channels(channels: u32) -> Option<Self> {
        match channels {
            3 => Some(ColorCategory::Rgb),
            4 => Some(ColorCategory::Cmyk),
            1 => Some(ColorCategory::Grayscale),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorCategory::Rgb => "RGB",
            ColorCategory::Cmyk => "CMYK",
            ColorCategory::Grayscale => "Grayscale",
        }
    }
}

impl std::fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pages holding images of each colorspace, plus per-category image counts.
#[derive(Debug, Clone, Default)]
pub struct PageColorProfile {
    total_images: u32,
    rgb: BTreeSet<u32>,
    cmyk: BTreeSet<u32>,
    grayscale: BTreeSet<u32>,
    counts: HashMap<ColorCategory, u32>,
}

impl PageColorProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an image, whatever its colorspace.
    pub fn add_image(&mut self) {
        self.total_images += 1;
    }

    /// Record the channel count of an image on `page` (1-indexed).
    ///
    /// Unknown channel counts are ignored; the image still counts toward the
    /// total through [`add_image`](Self::add_image).
    pub fn classify(&mut self, page: u32, channels: u32) -> Option<ColorCategory> {
        let category = ColorCategory::from_channels(channels)?;
        *self.counts.entry(category).or_insert(0) += 1;
        self.pages_mut(category).insert(page);
        Some(category)
    }

    fn pages_mut(&mut self, category: ColorCategory) -> &mut BTreeSet<u32> {
        match category {
            ColorCategory::Rgb => &mut self.rgb,
            ColorCategory::Cmyk => &mut self.cmyk,
            ColorCategory::Grayscale => &mut self.grayscale,
        }
    }

    pub fn total_images(&self) -> u32 {
        self.total_images
    }

    /// Number of images classified into `category`.
    pub fn count(&self, category: ColorCategory) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Sorted page numbers with at least one image of `category`.
    pub fn pages(&self, category: ColorCategory) -> Vec<u32> {
        match category {
            ColorCategory::Rgb => &self.rgb,
            ColorCategory::Cmyk => &self.cmyk,
            ColorCategory::Grayscale => &self.grayscale,
        }
        .iter()
        .copied()
        .collect()
    }
}

/// Distinct font names and every observed font size.
#[derive(Debug, Clone, Default)]
pub struct FontInventory {
    names: BTreeSet<String>,
    sizes: Vec<f32>,
}

impl FontInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Record a font size; non-finite and non-positive sizes are dropped.
    pub fn add_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            self.sizes.push(size);
        }
    }

    /// Sorted distinct names.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// `(min, max)` of observed sizes.
    pub fn size_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.sizes.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s))))
    }
}

/// Occurrence count per paragraph style name.
#[derive(Debug, Clone, Default)]
pub struct StyleHistogram {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl StyleHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, style: &str) {
        match self.index.get(style) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(style.to_string(), self.order.len());
                self.order.push((style.to_string(), 1));
            }
        }
    }

    /// Styles by descending count; ties keep first-seen order.
    pub fn sorted(&self) -> Vec<(String, usize)> {
        let mut entries = self.order.clone();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

}

/// Aggregated table dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStats {
    pub table_count: u64,
    pub total_rows: u64,
    pub total_columns: u64,
    pub total_cells: u64,
    pub empty_cells: u64,
}

impl TableStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one table's dimensions; fails if any total would overflow.
    pub fn add_table(&mut self, rows: u64, columns: u64) -> Result<()> {
        let cells = rows
            .checked_mul(columns)
            .ok_or_else(|| overflow("cell count"))?;
        let total_cells = checked_total(self.total_cells, cells, "cell count")?;
        let total_rows = checked_total(self.total_rows, rows, "row count")?;
        let total_columns = checked_total(self.total_columns, columns, "column count")?;
        let table_count = checked_total(self.table_count, 1, "table count")?;

        self.total_cells = total_cells;
        self.total_rows = total_rows;
        self.total_columns = total_columns;
        self.table_count = table_count;
        Ok(())
    }

    pub fn add_empty_cell(&mut self) -> Result<()> {
        self.empty_cells = checked_total(self.empty_cells, 1, "empty cell count")?;
        Ok(())
    }

    /// Mean rows per table; 0 without tables.
    pub fn average_rows(&self) -> f64 {
        if self.table_count == 0 {
            return 0.0;
        }
        self.total_rows as f64 / self.table_count as f64
    }

    /// Mean columns per table; 0 without tables.
    pub fn average_columns(&self) -> f64 {
        if self.table_count == 0 {
            return 0.0;
        }
        self.total_columns as f64 / self.table_count as f64
    }
}

fn checked_total(total: u64, add: u64, what: &str) -> Result<u64> {
    total.checked_add(add).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> Error {
    Error::Other(format!("Table {} overflows", what))
}

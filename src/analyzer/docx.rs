//! DOCX analyzer: structure, run formatting, tables and style usage.

use std::path::{Path, PathBuf};

use super::{count_chars, count_words, Analyzer};
use crate::error::{Error, Result};
use crate::model::{StructuredResult, StyleHistogram, TableStats};
use crate::options::AnalyzeOptions;
use crate::parser::{DocxPackage, DocxTable};

const HEADING_PREFIX: &str = "Heading";
const IMAGE_TARGET_MARKER: &str = "image";

/// Analyzer for Word documents.
#[derive(Debug, Clone)]
pub struct DocxAnalyzer {
    path: PathBuf,
    options: AnalyzeOptions,
}

impl DocxAnalyzer {
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

    /// Build the four result sections from an opened package.
    ///
    /// Fails as a whole if any section cannot be computed.
    pub fn analyze_package(&self, package: &DocxPackage) -> Result<StructuredResult> {
        let general = general_statistics(package);
        let formatting = formatting_statistics(package)?;
        let tables = table_statistics(&package.tables)?;
        let styles = style_usage(package);

        let mut result = StructuredResult::new();
        result.insert_list("General statistics", general);
        result.insert_list("Text formatting", formatting);
        result.insert_list(
            "Table statistics",
            [
                format!("Total cells: {}", tables.total_cells),
                format!("Average rows: {:.1}", tables.average_rows()),
                format!("Average columns: {:.1}", tables.average_columns()),
                format!("Empty cells: {}", tables.empty_cells),
            ],
        );
        result.insert_list(
            "Style usage",
            styles
                .sorted()
                .into_iter()
                .map(|(style, count)| format!("{}: {}", style, count)),
        );
        Ok(result)
    }
}

impl Analyzer for DocxAnalyzer {
    fn name(&self) -> &str {
        "docx"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    fn analyze(&self) -> StructuredResult {
        if let Err(e) = self.validate_target() {
            return StructuredResult::error(e.to_string());
        }

        let package = match DocxPackage::open(&self.path) {
            Ok(package) => package,
            Err(e) => {
                log::error!("Failed to open DOCX file {}: {}", self.path.display(), e);
                return StructuredResult::error(format!("Failed to open DOCX file: {}", e));
            }
        };
        log::debug!(
            "Read {} paragraphs and {} tables from {}",
            package.paragraphs.len(),
            package.tables.len(),
            self.path.display()
        );

        match self.analyze_package(&package) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to analyze DOCX file {}: {}", self.path.display(), e);
                StructuredResult::error(format!("Failed to analyze DOCX file: {}", e))
            }
        }
    }
}

fn general_statistics(package: &DocxPackage) -> Vec<String> {
    let mut runs = 0;
    let mut words = 0;
    let mut chars = 0;
    let mut headings = 0;

    for paragraph in &package.paragraphs {
        runs += paragraph.runs.len();
        words += count_words(&paragraph.text);
        chars += count_chars(&paragraph.text);
        if package
            .styles
            .resolve(paragraph.style_id.as_deref())
            .starts_with(HEADING_PREFIX)
        {
            headings += 1;
        }
    }

    let images = package
        .relationships
        .iter()
        .filter(|rel| rel.target.contains(IMAGE_TARGET_MARKER))
        .count();

    vec![
        format!("Paragraphs: {}", package.paragraphs.len()),
        format!("Runs: {}", runs),
        format!("Words: {}", words),
        format!("Characters: {}", chars),
        format!("Headings: {}", headings),
        format!("Images: {}", images),
        format!("Tables: {}", package.tables.len()),
    ]
}

fn formatting_statistics(package: &DocxPackage) -> Result<Vec<String>> {
    let mut bold = 0;
    let mut italic = 0;
    let mut underline = 0;

    for run in package.paragraphs.iter().flat_map(|p| &p.runs) {
        if run.bold.on_off()? == Some(true) {
            bold += 1;
        }
        if run.italic.on_off()? == Some(true) {
            italic += 1;
        }
        if run.underline.underline() == Some(true) {
            underline += 1;
        }
    }

    Ok(vec![
        format!("Bold: {}", bold),
        format!("Italic: {}", italic),
        format!("Underline: {}", underline),
    ])
}

fn table_statistics(tables: &[DocxTable]) -> Result<TableStats> {
    let mut stats = TableStats::new();

    for table in tables {
        let grid = grid_texts(table)?;
        let widest = grid.iter().map(Vec::len).max().unwrap_or(0);
        let columns = table.grid_columns.unwrap_or(widest);

        stats.add_table(dimension(table.rows.len())?, dimension(columns)?)?;
        for text in grid.iter().flatten() {
            if text.trim().is_empty() {
                stats.add_empty_cell()?;
            }
        }
    }

    Ok(stats)
}

fn dimension(count: usize) -> Result<u64> {
    u64::try_from(count).map_err(|_| Error::Other(format!("Table dimension {} is too large", count)))
}

/// Cell text at every grid position of every row.
///
/// A cell spanning several columns appears once per column, and a vertically
/// merged continuation shows the text of the cell above it.
fn grid_texts(table: &DocxTable) -> Result<Vec<Vec<String>>> {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let mut positions = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let span = cell.span()? as usize;
            let column = positions.len();
            let text = if cell.continues_merge() {
                grid.last()
                    .and_then(|above| above.get(column))
                    .cloned()
                    .unwrap_or_default()
            } else {
                cell.text.clone()
            };
            positions.extend(std::iter::repeat(text).take(span));
        }
        grid.push(positions);
    }

    Ok(grid)
}

fn style_usage(package: &DocxPackage) -> StyleHistogram {
    let mut histogram = StyleHistogram::new();
    for paragraph in &package.paragraphs {
        histogram.add(package.styles.resolve(paragraph.style_id.as_deref()));
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::parser::{DocxCell, DocxParagraph, DocxRow, DocxRun, Relationship, RunProperty};

    fn cell(text: &str) -> DocxCell {
        DocxCell {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn row(cells: Vec<DocxCell>) -> DocxRow {
        DocxRow { cells }
    }

    fn section<'a>(result: &'a StructuredResult, label: &str) -> &'a [String] {
        result.get(label).and_then(Value::as_list).unwrap()
    }

    #[test]
    fn test_no_tables() {
        let stats = table_statistics(&[]).unwrap();
        assert_eq!(stats.total_cells, 0);
        assert_eq!(stats.average_rows(), 0.0);
        assert_eq!(stats.average_columns(), 0.0);
        assert_eq!(stats.empty_cells, 0);
    }

    #[test]
    fn test_full_table() {
        let table = DocxTable {
            grid_columns: Some(3),
            rows: vec![
                row(vec![cell("a"), cell("b"), cell("c")]),
                row(vec![cell("d"), cell("e"), cell("f")]),
            ],
        };
        let stats = table_statistics(&[table]).unwrap();
        assert_eq!(stats.total_cells, 6);
        assert_eq!(stats.average_rows(), 2.0);
        assert_eq!(stats.average_columns(), 3.0);
        assert_eq!(stats.empty_cells, 0);
    }

    #[test]
    fn test_spans_and_merges() {
        let wide_empty = DocxCell {
            grid_span: Some("2".into()),
            ..Default::default()
        };
        let merged = DocxCell {
            v_merge: RunProperty::Set(None),
            ..Default::default()
        };
        let table = DocxTable {
            grid_columns: None,
            rows: vec![
                row(vec![cell("top"), cell(" ")]),
                row(vec![merged, wide_empty]),
            ],
        };
        let stats = table_statistics(&[table]).unwrap();

        // columns from the widest row: 1 + 2
        assert_eq!(stats.total_columns, 3);
        assert_eq!(stats.total_cells, 6);
        // " " in row 1, the two positions of the spanned cell in row 2
        assert_eq!(stats.empty_cells, 3);
    }

    #[test]
    fn test_bad_grid_span_fails() {
        let table = DocxTable {
            grid_columns: Some(1),
            rows: vec![row(vec![DocxCell {
                grid_span: Some("x".into()),
                ..Default::default()
            }])],
        };
        assert!(table_statistics(&[table]).is_err());
    }

    #[test]
    fn test_wide_grid_with_many_rows() {
        let table = DocxTable {
            grid_columns: Some(70_000),
            rows: vec![row(Vec::new()); 70_000],
        };
        let package = DocxPackage {
            tables: vec![table],
            ..Default::default()
        };
        let result = DocxAnalyzer::new("x.docx").analyze_package(&package).unwrap();
        assert_eq!(
            section(&result, "Table statistics"),
            &[
                "Total cells: 4900000000",
                "Average rows: 70000.0",
                "Average columns: 70000.0",
                "Empty cells: 0",
            ]
        );
    }

    #[test]
    fn test_formatting_counts() {
        let run = |b: RunProperty, u: RunProperty| DocxRun {
            text: "x".into(),
            bold: b,
            underline: u,
            ..Default::default()
        };
        let package = DocxPackage {
            paragraphs: vec![DocxParagraph {
                style_id: None,
                text: "xxx".into(),
                runs: vec![
                    run(RunProperty::Set(None), RunProperty::Set(Some("single".into()))),
                    run(RunProperty::Set(Some("0".into())), RunProperty::Set(Some("none".into()))),
                    run(RunProperty::Unset, RunProperty::Unset),
                ],
            }],
            ..Default::default()
        };
        assert_eq!(
            formatting_statistics(&package).unwrap(),
            vec!["Bold: 1", "Italic: 0", "Underline: 1"]
        );
    }

    #[test]
    fn test_invalid_toggle_fails_whole_analysis() {
        let package = DocxPackage {
            paragraphs: vec![DocxParagraph {
                runs: vec![DocxRun {
                    italic: RunProperty::Set(Some("sometimes".into())),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(DocxAnalyzer::new("x.docx").analyze_package(&package).is_err());
    }

    #[test]
    fn test_general_statistics_and_styles() {
        let package = DocxPackage {
            paragraphs: vec![
                DocxParagraph {
                    text: "Hello brave world".into(),
                    runs: vec![DocxRun::default(), DocxRun::default()],
                    ..Default::default()
                },
                DocxParagraph {
                    text: "Ёж".into(),
                    runs: vec![DocxRun::default()],
                    ..Default::default()
                },
            ],
            relationships: vec![
                Relationship {
                    id: "rId1".into(),
                    rel_type: "http://x/image".into(),
                    target: "media/image1.png".into(),
                },
                Relationship {
                    id: "rId2".into(),
                    rel_type: "http://x/styles".into(),
                    target: "styles.xml".into(),
                },
            ],
            ..Default::default()
        };
        let result = DocxAnalyzer::new("x.docx").analyze_package(&package).unwrap();

        assert_eq!(
            section(&result, "General statistics"),
            &[
                "Paragraphs: 2",
                "Runs: 3",
                "Words: 4",
                "Characters: 19",
                "Headings: 0",
                "Images: 1",
                "Tables: 0",
            ]
        );
        assert_eq!(section(&result, "Style usage"), &["Normal: 2"]);
        assert_eq!(
            result.labels(),
            vec![
                "General statistics",
                "Text formatting",
                "Table statistics",
                "Style usage"
            ]
        );
    }

    #[test]
    fn test_corrupt_file_is_single_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let result = DocxAnalyzer::new(&path).analyze();
        assert_eq!(result.len(), 1);
        assert!(result
            .error_message()
            .unwrap()
            .starts_with("Failed to open DOCX file"));
    }
}

//! DOCX (WordprocessingML) package reader.
//!
//! Reads the main document part, its relationships and the style sheet from
//! the zip container and exposes the body-level paragraphs and tables.
//! Attribute values that need interpretation (on/off toggles, grid spans)
//! are kept raw and parsed on access, so a malformed value surfaces as an
//! error where it is used.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use super::xml::{parse_xml, XmlElement};
use crate::error::{Error, Result};

const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";
const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
const REL_STYLES: &str = "/styles";

/// Name used when the package declares no default paragraph style.
pub const FALLBACK_STYLE: &str = "Normal";

/// Raw state of a run property element such as `<w:b/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunProperty {
    /// The element is absent.
    #[default]
    Unset,
    /// The element is present, with its `w:val` attribute if any.
    Set(Option<String>),
}

impl RunProperty {
    fn from_element(element: Option<&XmlElement>) -> Self {
        match element {
            Some(e) => RunProperty::Set(e.attr("val").map(str::to_string)),
            None => RunProperty::Unset,
        }
    }

    /// Interpret as an `ST_OnOff` toggle (`<w:b/>`, `<w:i/>`).
    pub fn on_off(&self) -> Result<Option<bool>> {
        match self {
            RunProperty::Unset => Ok(None),
            RunProperty::Set(None) => Ok(Some(true)),
            RunProperty::Set(Some(val)) => match val.as_str() {
                "true" | "1" | "on" => Ok(Some(true)),
                "false" | "0" | "off" => Ok(Some(false)),
                other => Err(Error::DocxParse(format!("Invalid on/off value: {}", other))),
            },
        }
    }

    /// Interpret as an underline (`<w:u w:val="..."/>`); `none` and a
    /// missing value mean not underlined.
    pub fn underline(&self) -> Option<bool> {
        match self {
            RunProperty::Unset | RunProperty::Set(None) => None,
            RunProperty::Set(Some(val)) => Some(val != "none"),
        }
    }
}

/// A run: a span of text sharing one set of formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxRun {
    pub text: String,
    pub bold: RunProperty,
    pub italic: RunProperty,
    pub underline: RunProperty,
}

/// A body-level paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxParagraph {
    /// `w:pStyle` id, if the paragraph names a style
    pub style_id: Option<String>,
    /// Direct `w:r` children
    pub runs: Vec<DocxRun>,
    /// Full paragraph text, including hyperlinked runs
    pub text: String,
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxCell {
    /// Cell paragraphs joined by newlines
    pub text: String,
    /// Raw `w:gridSpan` value
    pub grid_span: Option<String>,
    /// Raw `w:vMerge` state
    pub v_merge: RunProperty,
}

impl DocxCell {
    /// Number of grid columns this cell covers.
    pub fn span(&self) -> Result<u32> {
        match &self.grid_span {
            None => Ok(1),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(span) if span > 0 => Ok(span),
                _ => Err(Error::DocxParse(format!("Invalid gridSpan value: {}", raw))),
            },
        }
    }

    /// Whether this cell continues a vertical merge from the row above.
    pub fn continues_merge(&self) -> bool {
        match &self.v_merge {
            RunProperty::Unset => false,
            RunProperty::Set(val) => val.as_deref() != Some("restart"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxRow {
    pub cells: Vec<DocxCell>,
}

/// A body-level table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxTable {
    /// Number of `w:gridCol` entries (`None` without a `w:tblGrid`)
    pub grid_columns: Option<usize>,
    pub rows: Vec<DocxRow>,
}

/// A relationship of the main document part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Paragraph style names keyed by style id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_id: Option<String>,
}

impl StyleSheet {
    fn from_xml(root: &XmlElement) -> Self {
        let mut sheet = StyleSheet::default();
        for style in root.children_named("style") {
            if style.attr("type") != Some("paragraph") {
                continue;
            }
            let Some(id) = style.attr("styleId") else {
                continue;
            };
            let name = style
                .child("name")
                .and_then(|n| n.attr("val"))
                .map(ui_style_name)
                .unwrap_or_else(|| id.to_string());
            if matches!(style.attr("default"), Some("1") | Some("true") | Some("on")) {
                sheet.default_id = Some(id.to_string());
            }
            sheet.names.insert(id.to_string(), name);
        }
        sheet
    }

    /// Name of the default paragraph style.
    pub fn default_name(&self) -> &str {
        self.default_id
            .as_ref()
            .and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or(FALLBACK_STYLE)
    }

    /// Resolve a paragraph's style id to a display name.
    ///
    /// Missing and unknown ids resolve to the default paragraph style.
    pub fn resolve(&self, style_id: Option<&str>) -> &str {
        style_id
            .and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or_else(|| self.default_name())
    }
}

/// Built-in styles are stored under lowercase names in styles.xml.
fn ui_style_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some(level) = lower.strip_prefix("heading ") {
        if level.len() == 1 && level.bytes().all(|b| (b'1'..=b'9').contains(&b)) {
            return format!("Heading {}", level);
        }
    }
    match lower.as_str() {
        "caption" => "Caption".to_string(),
        "footer" => "Footer".to_string(),
        "header" => "Header".to_string(),
        _ => name.to_string(),
    }
}

/// The parts of a DOCX package the analyzer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxPackage {
    pub paragraphs: Vec<DocxParagraph>,
    pub tables: Vec<DocxTable>,
    pub relationships: Vec<Relationship>,
    pub styles: StyleSheet,
}

impl DocxPackage {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a DOCX package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let document_part = read_part(&mut archive, "_rels/.rels")?
            .map(|xml| parse_relationships(&xml))
            .transpose()?
            .and_then(|rels| {
                rels.into_iter()
                    .find(|r| r.rel_type.ends_with(REL_OFFICE_DOCUMENT))
                    .map(|r| r.target.trim_start_matches('/').to_string())
            })
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string());

        let document_xml = read_part(&mut archive, &document_part)?.ok_or_else(|| {
            Error::DocxParse(format!("Missing main document part {}", document_part))
        })?;

        let (dir, file_name) = match document_part.rsplit_once('/') {
            Some((dir, file)) => (format!("{}/", dir), file.to_string()),
            None => (String::new(), document_part.clone()),
        };

        let relationships = match read_part(&mut archive, &format!("{}_rels/{}.rels", dir, file_name))? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };

        let styles_part = relationships
            .iter()
            .find(|r| r.rel_type.ends_with(REL_STYLES))
            .map(|r| resolve_target(&dir, &r.target))
            .unwrap_or_else(|| format!("{}styles.xml", dir));
        let styles = match read_part(&mut archive, &styles_part)? {
            Some(xml) => StyleSheet::from_xml(&parse_xml(&xml)?),
            None => StyleSheet::default(),
        };

        let root = parse_xml(&document_xml)?;
        let body = root
            .child("body")
            .ok_or_else(|| Error::DocxParse("Document has no body".to_string()))?;

        let mut paragraphs = Vec::new();
        let mut tables = Vec::new();
        for element in body.elements() {
            match element.name.as_str() {
                "p" => paragraphs.push(read_paragraph(element)),
                "tbl" => tables.push(read_table(element)),
                _ => {}
            }
        }

        Ok(Self {
            paragraphs,
            tables,
            relationships,
            styles,
        })
    }
}

/// Read a zip entry as UTF-8, `None` if the entry does not exist.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::DocxParse(format!("Cannot read {}: {}", name, e)))?;
    Ok(Some(xml))
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let root = parse_xml(xml)?;
    Ok(root
        .children_named("Relationship")
        .map(|rel| Relationship {
            id: rel.attr("Id").unwrap_or_default().to_string(),
            rel_type: rel.attr("Type").unwrap_or_default().to_string(),
            target: rel.attr("Target").unwrap_or_default().to_string(),
        })
        .collect())
}

/// Resolve a relationship target against the source part's directory.
fn resolve_target(dir: &str, target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", dir, target),
    }
}

fn read_run(run: &XmlElement) -> DocxRun {
    let props = run.child("rPr");
    let prop = |name: &str| RunProperty::from_element(props.and_then(|p| p.child(name)));

    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "cr" => text.push('\n'),
            "br" => match child.attr("type") {
                None | Some("textWrapping") => text.push('\n'),
                _ => {}
            },
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }

    DocxRun {
        text,
        bold: prop("b"),
        italic: prop("i"),
        underline: prop("u"),
    }
}

fn read_paragraph(p: &XmlElement) -> DocxParagraph {
    let style_id = p
        .child("pPr")
        .and_then(|ppr| ppr.child("pStyle"))
        .and_then(|s| s.attr("val"))
        .map(str::to_string);

    let mut runs = Vec::new();
    let mut text = String::new();
    for child in p.elements() {
        match child.name.as_str() {
            "r" => {
                let run = read_run(child);
                text.push_str(&run.text);
                runs.push(run);
            }
            "hyperlink" => {
                for r in child.children_named("r") {
                    text.push_str(&read_run(r).text);
                }
            }
            _ => {}
        }
    }

    DocxParagraph {
        style_id,
        runs,
        text,
    }
}

fn read_table(tbl: &XmlElement) -> DocxTable {
    let grid_columns = tbl
        .child("tblGrid")
        .map(|grid| grid.children_named("gridCol").count());

    let rows = tbl
        .children_named("tr")
        .map(|tr| DocxRow {
            cells: tr.children_named("tc").map(read_cell).collect(),
        })
        .collect();

    DocxTable { grid_columns, rows }
}

fn read_cell(tc: &XmlElement) -> DocxCell {
    let props = tc.child("tcPr");
    let text = tc
        .children_named("p")
        .map(|p| read_paragraph(p).text)
        .collect::<Vec<_>>()
        .join("\n");

    DocxCell {
        text,
        grid_span: props
            .and_then(|p| p.child("gridSpan"))
            .and_then(|g| g.attr("val"))
            .map(str::to_string),
        v_merge: RunProperty::from_element(props.and_then(|p| p.child("vMerge"))),
    }
}

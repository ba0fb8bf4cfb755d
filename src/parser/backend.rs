//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the PDF facts the analyzer needs,
//! isolating the concrete PDF library (lopdf) from the statistics logic.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Nesting limit when following references, colorspaces and form XObjects.
const MAX_DEPTH: usize = 8;

/// Millimetres per PDF point.
const MM_PER_POINT: f32 = 25.4 / 72.0;

/// An image XObject placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Resource name (e.g. `Im0`)
    pub name: String,
    /// Object holding the image stream
    pub id: PageId,
}

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub author: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub title: Option<String>,
}

/// Abstract interface for PDF document access.
///
/// Every per-page method may fail independently so callers can skip a
/// broken page or image and keep going.
pub trait PdfBackend {
    /// All pages as (1-based page number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// PDF version string (e.g. "1.7").
    fn version(&self) -> String;

    /// Document information dictionary.
    fn metadata(&self) -> Result<PdfMetadata>;

    /// Image XObjects drawn on a page, including those inside form XObjects.
    fn page_images(&self, page: PageId) -> Result<Vec<ImageRef>>;

    /// Number of color components of an image, `None` when it has no
    /// colorspace (image masks, JPX without `/ColorSpace`, patterns).
    fn image_channels(&self, page: PageId, image: &ImageRef) -> Result<Option<u32>>;

    /// Base font names of the fonts in a page's resources.
    fn page_fonts(&self, page: PageId) -> Result<Vec<String>>;

    /// Font sizes used by text-showing operators on a page.
    fn page_font_sizes(&self, page: PageId) -> Result<Vec<f32>>;

    /// Page width and height in millimetres.
    fn page_size_mm(&self, page: PageId) -> Result<(f32, f32)>;
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Follow a chain of references to a direct object.
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> Result<&'a Object> {
        for _ in 0..MAX_DEPTH {
            match obj {
                Object::Reference(id) => obj = self.doc.get_object(*id)?,
                _ => return Ok(obj),
            }
        }
        Err(Error::PdfParse("Reference chain too deep".to_string()))
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Result<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(d) => Ok(d),
            Object::Stream(s) => Ok(&s.dict),
            _ => Err(Error::PdfParse("Expected a dictionary".to_string())),
        }
    }

    /// Look up a page attribute, walking up the page tree for inherited ones.
    fn inherited<'a>(&'a self, page: PageId, key: &[u8]) -> Result<Option<&'a Object>> {
        let mut dict = self.doc.get_dictionary(page)?;
        for _ in 0..MAX_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => dict = self.doc.get_dictionary(parent)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn page_resources(&self, page: PageId) -> Result<Option<&Dictionary>> {
        match self.inherited(page, b"Resources")? {
            Some(res) => Ok(Some(self.resolve_dict(res)?)),
            None => Ok(None),
        }
    }

    /// Collect image XObjects from a resource dictionary, descending into forms.
    fn collect_images(
        &self,
        resources: &Dictionary,
        depth: usize,
        seen: &mut BTreeSet<ObjectId>,
        images: &mut Vec<ImageRef>,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::PdfParse("Form XObjects nested too deeply".to_string()));
        }

        let xobjects = match resources.get(b"XObject") {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => return Ok(()),
        };

        for (name, obj) in xobjects.iter() {
            let id = match obj.as_reference() {
                Ok(id) => id,
                Err(_) => continue,
            };
            if !seen.insert(id) {
                continue;
            }

            let stream = match self.doc.get_object(id).and_then(Object::as_stream) {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("Skipping unreadable XObject {}: {}", id.0, e);
                    continue;
                }
            };

            match stream.dict.get(b"Subtype").and_then(Object::as_name_str) {
                Ok("Image") => images.push(ImageRef {
                    name: String::from_utf8_lossy(name).to_string(),
                    id,
                }),
                Ok("Form") => {
                    if let Ok(form_res) = stream.dict.get(b"Resources") {
                        let form_res = self.resolve_dict(form_res)?;
                        self.collect_images(form_res, depth + 1, seen, images)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Channel count of a colorspace object.
    fn colorspace_channels(
        &self,
        cs: &Object,
        resources: Option<&Dictionary>,
        depth: usize,
    ) -> Result<Option<u32>> {
        if depth > MAX_DEPTH {
            return Err(Error::PdfParse("Colorspace nested too deeply".to_string()));
        }

        match self.resolve(cs)? {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"G" | b"CalGray" => Ok(Some(1)),
                b"DeviceRGB" | b"RGB" | b"CalRGB" => Ok(Some(3)),
                b"DeviceCMYK" | b"CMYK" => Ok(Some(4)),
                b"Pattern" => Ok(None),
                other => {
                    // Named entry in the page's /ColorSpace resources.
                    let named = resources
                        .and_then(|r| r.get(b"ColorSpace").ok())
                        .map(|cs_dict| self.resolve_dict(cs_dict))
                        .transpose()?
                        .and_then(|cs_dict| cs_dict.get(other).ok());
                    match named {
                        Some(obj) => self.colorspace_channels(obj, resources, depth + 1),
                        None => Err(Error::PdfParse(format!(
                            "Unknown colorspace /{}",
                            String::from_utf8_lossy(other)
                        ))),
                    }
                }
            },
            Object::Array(arr) => {
                let family = arr
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .ok_or_else(|| Error::PdfParse("Colorspace array without family".into()))?;
                match family {
                    b"ICCBased" => {
                        let stream = arr
                            .get(1)
                            .ok_or_else(|| Error::PdfParse("ICCBased without profile".into()))?;
                        let n = self
                            .resolve_dict(stream)?
                            .get(b"N")
                            .and_then(Object::as_i64)
                            .map_err(|_| Error::PdfParse("ICC profile without /N".into()))?;
                        Ok(u32::try_from(n).ok())
                    }
                    b"Indexed" | b"I" => {
                        let base = arr
                            .get(1)
                            .ok_or_else(|| Error::PdfParse("Indexed without base".into()))?;
                        self.colorspace_channels(base, resources, depth + 1)
                    }
                    b"DeviceN" => {
                        let names = arr
                            .get(1)
                            .map(|o| self.resolve(o))
                            .transpose()?
                            .and_then(|o| o.as_array().ok())
                            .ok_or_else(|| Error::PdfParse("DeviceN without colorants".into()))?;
                        Ok(u32::try_from(names.len()).ok())
                    }
                    b"Separation" | b"CalGray" => Ok(Some(1)),
                    b"CalRGB" | b"Lab" => Ok(Some(3)),
                    b"Pattern" => Ok(None),
                    _ => self.colorspace_channels(&arr[0], resources, depth + 1),
                }
            }
            _ => Err(Error::PdfParse("Invalid colorspace object".to_string())),
        }
    }

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        match self.resolve(contents)? {
            Object::Stream(s) => s
                .decompressed_content()
                .or_else(|_| Ok(s.content.clone())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Ok(Object::Stream(s)) = self.resolve(obj) {
                        let data = s
                            .decompressed_content()
                            .unwrap_or_else(|_| s.content.clone());
                        content.extend_from_slice(&data);
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn metadata(&self) -> Result<PdfMetadata> {
        let info = match self.doc.trailer.get(b"Info") {
            Ok(info) => self.resolve_dict(info)?,
            Err(_) => return Ok(PdfMetadata::default()),
        };

        Ok(PdfMetadata {
            author: get_string_from_dict(info, b"Author"),
            creator: get_string_from_dict(info, b"Creator"),
            creation_date: get_string_from_dict(info, b"CreationDate").map(|d| format_pdf_date(&d)),
            modification_date: get_string_from_dict(info, b"ModDate").map(|d| format_pdf_date(&d)),
            title: get_string_from_dict(info, b"Title"),
        })
    }

    fn page_images(&self, page: PageId) -> Result<Vec<ImageRef>> {
        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(page)? {
            let mut seen = BTreeSet::new();
            self.collect_images(resources, 0, &mut seen, &mut images)?;
        }
        Ok(images)
    }

    fn image_channels(&self, page: PageId, image: &ImageRef) -> Result<Option<u32>> {
        let stream = self.doc.get_object(image.id)?.as_stream()?;
        let dict = &stream.dict;

        if let Ok(true) = dict.get(b"ImageMask").and_then(Object::as_bool) {
            return Ok(None);
        }

        match dict.get(b"ColorSpace") {
            Ok(cs) => {
                let resources = self.page_resources(page)?;
                self.colorspace_channels(cs, resources, 0)
            }
            Err(_) => Ok(None),
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<String>> {
        let resources = match self.page_resources(page)? {
            Some(res) => res,
            None => return Ok(Vec::new()),
        };
        let fonts = match resources.get(b"Font") {
            Ok(fonts) => self.resolve_dict(fonts)?,
            Err(_) => return Ok(Vec::new()),
        };

        let mut names = Vec::with_capacity(fonts.len());
        for (_, font) in fonts.iter() {
            let font_dict = self.resolve_dict(font)?;
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| strip_subset_tag(&String::from_utf8_lossy(n)).to_string())
                .unwrap_or_else(|| "unknown".to_string());
            names.push(base_font);
        }
        Ok(names)
    }

    fn page_font_sizes(&self, page: PageId) -> Result<Vec<f32>> {
        let data = self.page_content(page)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let content = lopdf::content::Content::decode(&data)?;

        let mut sizes = Vec::new();
        let mut font_size: Option<f32> = None;
        let mut scale: f32 = 1.0;

        for op in &content.operations {
            match op.operator.as_str() {
                "BT" => scale = 1.0,
                "Tf" => {
                    if let Some(size) = op.operands.get(1).and_then(get_number) {
                        font_size = Some(size.abs());
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let c = get_number(&op.operands[2]).unwrap_or(0.0);
                        let d = get_number(&op.operands[3]).unwrap_or(1.0);
                        scale = (c * c + d * d).sqrt();
                    }
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if let Some(size) = font_size {
                        sizes.push(size * scale);
                    }
                }
                _ => {}
            }
        }

        Ok(sizes)
    }

    fn page_size_mm(&self, page: PageId) -> Result<(f32, f32)> {
        let media_box = self
            .inherited(page, b"MediaBox")?
            .map(|b| self.resolve(b))
            .transpose()?
            .and_then(|b| b.as_array().ok())
            .filter(|arr| arr.len() >= 4);

        // Default to Letter size
        let (width, height) = match media_box {
            Some(arr) => {
                let coords: Vec<f32> = arr.iter().take(4).filter_map(get_number).collect();
                if coords.len() < 4 {
                    return Err(Error::PdfParse("Invalid MediaBox".to_string()));
                }
                ((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs())
            }
            None => (612.0, 792.0),
        };

        Ok((width * MM_PER_POINT, height * MM_PER_POINT))
    }
}

/// Helper: extract a number from a PDF operand.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Drop the `ABCDEF+` prefix of an embedded font subset.
fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1).
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Render a PDF date (D:YYYYMMDDHHmmSS...) as `YYYY-MM-DD HH:MM:SS`.
///
/// Strings that do not parse are returned unchanged.
pub fn format_pdf_date(s: &str) -> String {
    match parse_pdf_date(s) {
        Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => s.to_string(),
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

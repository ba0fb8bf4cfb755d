//! Integration tests for the PDF analyzer, on documents built with lopdf.

use std::path::{Path, PathBuf};

use docstat::parser::{LopdfBackend, PdfBackend};
use docstat::{analyze_pdf, Analyzer, PdfAnalyzer, StructuredResult, Value};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tempfile::TempDir;

/// One page of a fixture document.
#[derive(Default)]
struct PageLayout {
    /// Colorspace of each image on the page
    images: Vec<Object>,
    /// Font sizes set with `Tf` before each `Tj`
    font_sizes: Vec<i64>,
    /// MediaBox width and height in points
    size: Option<(i64, i64)>,
}

fn image(doc: &mut Document, colorspace: Object) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "BitsPerComponent" => 8,
            "ColorSpace" => colorspace,
        },
        vec![0, 0, 0, 0],
    ))
}

fn build_pdf(path: &Path, pages: Vec<PageLayout>, info: Option<Dictionary>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "ABCDEF+Helvetica",
    });

    let mut kids = Vec::new();
    for layout in pages {
        let mut xobjects = Dictionary::new();
        for (i, cs) in layout.images.into_iter().enumerate() {
            let id = image(&mut doc, cs);
            xobjects.set(format!("Im{}", i), id);
        }

        let mut operations = vec![Operation::new("BT", vec![])];
        for size in &layout.font_sizes {
            operations.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
            operations.push(Operation::new("Td", vec![72.into(), 700.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal("Hello")],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        };
        if let Some((w, h)) = layout.size {
            page.set("MediaBox", vec![0.into(), 0.into(), w.into(), h.into()]);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if let Some(info) = info {
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }

    doc.save(path).unwrap();
}

fn fixture(dir: &TempDir, pages: Vec<PageLayout>) -> PathBuf {
    let path = dir.path().join("fixture.pdf");
    build_pdf(&path, pages, None);
    path
}

fn scalar<'a>(result: &'a StructuredResult, label: &str) -> &'a str {
    result
        .get(label)
        .and_then(Value::as_scalar)
        .unwrap_or_else(|| panic!("missing scalar {}", label))
}

fn list<'a>(result: &'a StructuredResult, label: &str) -> &'a [String] {
    result
        .get(label)
        .and_then(Value::as_list)
        .unwrap_or_else(|| panic!("missing list {}", label))
}

#[test]
fn test_rgb_and_cmyk_on_one_page() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        vec![PageLayout {
            images: vec!["DeviceRGB".into(), "DeviceCMYK".into()],
            ..Default::default()
        }],
    );

    let result = PdfAnalyzer::new(&path).analyze();

    assert_eq!(scalar(&result, "Pages"), "1");
    assert_eq!(
        list(&result, "Image statistics"),
        &["RGB: 1", "CMYK: 1", "Grayscale: 0"]
    );
    assert_eq!(scalar(&result, "Total images"), "2");
    assert_eq!(list(&result, "RGB pages"), &["1"]);
    assert_eq!(list(&result, "CMYK pages"), &["1"]);
    assert_eq!(scalar(&result, "Grayscale pages"), "none");
}

#[test]
fn test_label_order() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, vec![PageLayout::default()]);

    let result = PdfAnalyzer::new(&path).analyze();
    assert_eq!(
        result.labels(),
        vec![
            "Pages",
            "Metadata",
            "Image statistics",
            "Total images",
            "RGB pages",
            "CMYK pages",
            "Grayscale pages",
            "Fonts",
            "Font sizes",
            "Page size",
            "PDF version",
        ]
    );
    assert_eq!(scalar(&result, "PDF version"), "1.5");
}

#[test]
fn test_colorspace_families() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("families.pdf");

    // built by hand so the ICC profile object can be shared
    let mut doc = Document::with_version("1.7");
    let icc_id = doc.add_object(Stream::new(dictionary! { "N" => 4 }, vec![]));
    let pages_id = doc.new_object_id();

    let gray_indexed: Object = vec![
        "Indexed".into(),
        "DeviceGray".into(),
        1.into(),
        Object::string_literal(vec![0u8, 255]),
    ]
    .into();
    let icc_cmyk: Object = vec!["ICCBased".into(), Object::Reference(icc_id)].into();
    let separation: Object = vec![
        "Separation".into(),
        "Spot".into(),
        "DeviceCMYK".into(),
        Object::Null,
    ]
    .into();

    let mut page_ids = Vec::new();
    for cs in [gray_indexed, icc_cmyk, separation] {
        let img = image(&mut doc, cs);
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => img },
            },
        });
        page_ids.push(Object::Reference(page));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => 3,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(&path).unwrap();

    let result = PdfAnalyzer::new(&path).analyze();
    assert_eq!(list(&result, "Grayscale pages"), &["1", "3"]);
    assert_eq!(list(&result, "CMYK pages"), &["2"]);
    assert_eq!(scalar(&result, "RGB pages"), "none");
    assert_eq!(scalar(&result, "Total images"), "3");
    // no MediaBox anywhere: US Letter
    assert_eq!(scalar(&result, "Page size"), "215.9 x 279.4 mm");
}

#[test]
fn test_broken_image_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        vec![
            PageLayout {
                images: vec!["NoSuchSpace".into(), "DeviceGray".into()],
                ..Default::default()
            },
            PageLayout {
                images: vec!["DeviceRGB".into()],
                ..Default::default()
            },
        ],
    );

    let result = PdfAnalyzer::new(&path).analyze();

    assert!(!result.is_error());
    assert_eq!(scalar(&result, "Total images"), "3");
    assert_eq!(list(&result, "Grayscale pages"), &["1"]);
    assert_eq!(list(&result, "RGB pages"), &["2"]);
    assert_eq!(
        list(&result, "Image statistics"),
        &["RGB: 1", "CMYK: 0", "Grayscale: 1"]
    );
}

#[test]
fn test_fonts_and_sizes() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        vec![
            PageLayout {
                font_sizes: vec![12, 18],
                ..Default::default()
            },
            PageLayout {
                font_sizes: vec![9],
                ..Default::default()
            },
        ],
    );

    let result = PdfAnalyzer::new(&path).analyze();
    assert_eq!(list(&result, "Fonts"), &["Helvetica"]);
    assert_eq!(scalar(&result, "Font sizes"), "Min: 9.0, Max: 18.0");
}

#[test]
fn test_page_sizes() {
    let dir = TempDir::new().unwrap();

    let uniform = fixture(&dir, vec![PageLayout::default(), PageLayout::default()]);
    let result = PdfAnalyzer::new(&uniform).analyze();
    assert_eq!(scalar(&result, "Page size"), "209.9 x 297.0 mm");

    let mixed_path = dir.path().join("mixed.pdf");
    build_pdf(
        &mixed_path,
        vec![
            PageLayout::default(),
            PageLayout {
                size: Some((842, 595)),
                ..Default::default()
            },
        ],
        None,
    );
    let result = PdfAnalyzer::new(&mixed_path).analyze();
    assert_eq!(scalar(&result, "Page size"), "mixed page sizes");
}

#[test]
fn test_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meta.pdf");
    build_pdf(
        &path,
        vec![PageLayout::default()],
        Some(dictionary! {
            "Author" => Object::string_literal("Jane Roe"),
            "Title" => Object::string_literal("Quarterly report"),
            "CreationDate" => Object::string_literal("D:20240115103045Z"),
        }),
    );

    let result = PdfAnalyzer::new(&path).analyze();
    assert_eq!(
        list(&result, "Metadata"),
        &[
            "Author: Jane Roe",
            "Creator: unknown",
            "Creation date: 2024-01-15 10:30:45",
            "Modification date: unknown",
            "Title: Quarterly report",
        ]
    );
}

#[test]
fn test_no_fonts_no_images() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, vec![PageLayout::default()]);

    let report = analyze_pdf(&path);
    assert!(report.contains("Total images: 0\n"));
    assert!(report.contains("RGB pages: none\n"));
    assert!(report.contains("Font sizes: no data\n"));
    // font resources are present even without text
    assert!(report.contains("Fonts:\n  - Helvetica\n"));
}

#[test]
fn test_backend_directly() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        vec![PageLayout {
            images: vec!["DeviceRGB".into()],
            font_sizes: vec![10],
            ..Default::default()
        }],
    );

    let backend = LopdfBackend::load_file(&path).unwrap();
    let pages = backend.pages();
    assert_eq!(pages.len(), 1);

    let page = pages[&1];
    let images = backend.page_images(page).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "Im0");
    assert_eq!(backend.image_channels(page, &images[0]).unwrap(), Some(3));
    assert_eq!(backend.page_font_sizes(page).unwrap(), vec![10.0]);
}

#[test]
fn test_not_a_pdf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, b"just some text pretending to be a PDF").unwrap();

    let result = PdfAnalyzer::new(&path).analyze();
    assert_eq!(result.len(), 1);
    assert!(result
        .error_message()
        .unwrap()
        .starts_with("Failed to open PDF file"));
}

#[test]
fn test_missing_file_short_circuits() {
    let dir = TempDir::new().unwrap();
    let analyzer = PdfAnalyzer::new(dir.path().join("absent.pdf"));

    assert!(!analyzer.validate());
    let result = analyzer.analyze();
    assert_eq!(result.len(), 1);
    assert!(analyzer.format(&result).starts_with("error: Cannot read file: "));
}

#[test]
fn test_repeated_analysis_is_identical() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        vec![PageLayout {
            images: vec!["DeviceRGB".into(), "DeviceGray".into()],
            font_sizes: vec![11],
            ..Default::default()
        }],
    );

    let analyzer = PdfAnalyzer::new(&path);
    assert_eq!(analyzer.analyze(), analyzer.analyze());
}

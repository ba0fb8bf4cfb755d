//! Integration tests for the plain text analyzer.

use std::fs;
use std::path::PathBuf;

use docstat::{analyze_txt, Analyzer, AnalyzeOptions, StructuredResult, TextAnalyzer, Value};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn scalar<'a>(result: &'a StructuredResult, label: &str) -> &'a str {
    result
        .get(label)
        .and_then(Value::as_scalar)
        .unwrap_or_else(|| panic!("missing scalar {}", label))
}

#[test]
fn test_small_text_statistics() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "small.txt", b"a a b\nc\n");

    let result = TextAnalyzer::new(&path).analyze();

    assert_eq!(scalar(&result, "Encoding"), "ascii");
    assert_eq!(scalar(&result, "Lines"), "3");
    assert_eq!(scalar(&result, "Words"), "4");
    assert_eq!(scalar(&result, "Characters"), "8");
    assert_eq!(scalar(&result, "Empty lines"), "1");
    assert_eq!(
        result.get("Top 10 words").and_then(Value::as_list).unwrap()[0],
        "a: 2"
    );
}

#[test]
fn test_label_order() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "order.txt", b"one two\n");

    let result = TextAnalyzer::new(&path).analyze();
    assert_eq!(
        result.labels(),
        vec![
            "Encoding",
            "Lines",
            "Words",
            "Characters",
            "Characters (no spaces)",
            "Empty lines",
            "Whitespace-only lines",
            "Special characters",
            "Average word length",
            "Average line length",
            "Top 10 words",
        ]
    );
}

#[test]
fn test_utf8_cyrillic() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ru.txt", "Мама мыла раму.\nРаму мыла мама!".as_bytes());

    let result = TextAnalyzer::new(&path).analyze();
    assert_eq!(scalar(&result, "Encoding"), "utf-8");
    assert_eq!(scalar(&result, "Words"), "6");
    assert_eq!(scalar(&result, "Special characters"), "2");

    let top = result.get("Top 10 words").and_then(Value::as_list).unwrap();
    assert_eq!(top, &["мама: 2", "мыла: 2", "раму: 2"]);
}

#[test]
fn test_utf8_bom() {
    let dir = TempDir::new().unwrap();
    let mut content = vec![0xEF, 0xBB, 0xBF];
    content.extend_from_slice(b"hello world");
    let path = write_file(&dir, "bom.txt", &content);

    let result = TextAnalyzer::new(&path).analyze();
    assert_eq!(scalar(&result, "Encoding"), "UTF-8-SIG");
    assert_eq!(scalar(&result, "Words"), "2");
    assert_eq!(scalar(&result, "Characters"), "11");
}

#[test]
fn test_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.txt", b"");

    let analyzer = TextAnalyzer::new(&path);
    assert!(analyzer.validate());

    let result = analyzer.analyze();
    assert!(!result.is_error());
    assert_eq!(scalar(&result, "Encoding"), "ascii");
    assert_eq!(scalar(&result, "Words"), "0");
    assert_eq!(scalar(&result, "Average word length"), "0.00");
}

#[test]
fn test_top_words_option() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "many.txt", b"a b c d e f a b c a b a");

    let options = AnalyzeOptions::new().with_top_words(2);
    let result = TextAnalyzer::with_options(&path, options).analyze();

    let top = result.get("Top 2 words").and_then(Value::as_list).unwrap();
    assert_eq!(top, &["a: 4", "b: 3"]);
}

#[test]
fn test_size_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "big.txt", &[b'x'; 64]);

    let options = AnalyzeOptions::new().with_max_file_size(16);
    let result = TextAnalyzer::with_options(&path, options).analyze();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.error_message(),
        Some("File is too large: 64 bytes (limit is 16 bytes)")
    );
}

#[test]
fn test_missing_file_short_circuits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.txt");

    let analyzer = TextAnalyzer::new(&path);
    assert!(!analyzer.validate());

    let result = analyzer.analyze();
    assert_eq!(result.len(), 1);
    assert!(result.is_error());
    assert_eq!(
        analyzer.format(&result),
        format!("error: Cannot read file: {}", path.display())
    );
}

#[test]
fn test_report_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "same.txt", b"to be or not to be\nthat is the question\n");

    let first = analyze_txt(&path);
    let second = analyze_txt(&path);
    assert_eq!(first, second);
    assert!(first.starts_with("Encoding: ascii\nLines: 3\n"));
    assert!(first.contains("Top 10 words:\n  - to: 2\n  - be: 2\n"));
}

#[test]
fn test_crlf_counts_like_lf() {
    let dir = TempDir::new().unwrap();
    let lf = write_file(&dir, "lf.txt", b"a\nb\n\nc");
    let crlf = write_file(&dir, "crlf.txt", b"a\r\nb\r\n\r\nc");

    let result = TextAnalyzer::new(&crlf).analyze();
    assert_eq!(scalar(&result, "Lines"), "4");
    assert_eq!(scalar(&result, "Characters"), "6");
    assert_eq!(scalar(&result, "Characters (no spaces)"), "6");
    assert_eq!(scalar(&result, "Empty lines"), "1");
    assert_eq!(scalar(&result, "Whitespace-only lines"), "0");
    assert_eq!(scalar(&result, "Average line length"), "0.75");

    assert_eq!(analyze_txt(&lf), analyze_txt(&crlf));
}

#[test]
fn test_lone_carriage_return_ends_line() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "cr.txt", b"one\rtwo\r");

    let result = TextAnalyzer::new(&path).analyze();
    assert_eq!(scalar(&result, "Lines"), "3");
    assert_eq!(scalar(&result, "Characters"), "8");
}

#[test]
fn test_undecodable_content_is_single_error() {
    let dir = TempDir::new().unwrap();
    // UTF-16LE byte order mark followed by half a code unit
    let path = write_file(&dir, "broken.txt", b"\xff\xfe\x41");

    let result = TextAnalyzer::new(&path).analyze();
    assert_eq!(result.len(), 1);
    assert!(result.is_error());
    assert!(result
        .error_message()
        .unwrap()
        .starts_with("Failed to analyze file: Encoding error"));
}

//! Plain text analyzer: encoding, line/word statistics, word frequencies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{count_chars, Analyzer};
use crate::encoding::detect_encoding;
use crate::error::{Error, Result};
use crate::model::StructuredResult;
use crate::options::AnalyzeOptions;

/// Runs of Unicode word characters (letters of any script, digits, `_`).
const WORD_PATTERN: &str = r"\w+";

/// Anything that is not a Latin or Cyrillic letter, an ASCII digit or whitespace.
const SPECIAL_PATTERN: &str = r"[^a-zA-Zа-яА-Я0-9\s]";

/// Statistics of a decoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
    pub chars_without_spaces: usize,
    pub empty_lines: usize,
    pub whitespace_lines: usize,
    pub special_chars: usize,
    pub average_word_length: f64,
    pub average_line_length: f64,
    /// Most frequent case-folded words with their counts
    pub top_words: Vec<(String, usize)>,
    /// Requested length of the ranking
    pub top_limit: usize,
}

impl TextStats {
    /// Compute statistics over `content`, keeping the `top` most frequent words.
    pub fn compute(content: &str, top: usize) -> Result<Self> {
        let word_re = Regex::new(WORD_PATTERN).map_err(|e| Error::Other(e.to_string()))?;
        let special_re = Regex::new(SPECIAL_PATTERN).map_err(|e| Error::Other(e.to_string()))?;

        // split always yields at least one element, so a trailing newline
        // produces a final empty line
        let lines: Vec<&str> = content.split('\n').collect();

        let folded = content.to_lowercase();
        let words: Vec<&str> = word_re.find_iter(&folded).map(|m| m.as_str()).collect();

        let word_chars: usize = words.iter().map(|w| count_chars(w)).sum();
        let average_word_length = if words.is_empty() {
            0.0
        } else {
            word_chars as f64 / words.len() as f64
        };

        let line_chars: usize = lines.iter().map(|l| count_chars(l)).sum();
        let average_line_length = line_chars as f64 / lines.len() as f64;

        Ok(Self {
            lines: lines.len(),
            words: words.len(),
            chars: count_chars(content),
            chars_without_spaces: content.chars().filter(|&c| c != ' ').count(),
            empty_lines: lines.iter().filter(|l| l.trim().is_empty()).count(),
            whitespace_lines: lines
                .iter()
                .filter(|l| !l.is_empty() && l.chars().all(char::is_whitespace))
                .count(),
            special_chars: special_re.find_iter(content).count(),
            average_word_length,
            average_line_length,
            top_words: most_common(&words, top),
            top_limit: top,
        })
    }

    /// Lay the statistics out as a result, led by the encoding name.
    pub fn into_result(self, encoding: &str) -> StructuredResult {
        let mut result = StructuredResult::new();
        result.insert_scalar("Encoding", encoding);
        result.insert_scalar("Lines", self.lines);
        result.insert_scalar("Words", self.words);
        result.insert_scalar("Characters", self.chars);
        result.insert_scalar("Characters (no spaces)", self.chars_without_spaces);
        result.insert_scalar("Empty lines", self.empty_lines);
        result.insert_scalar("Whitespace-only lines", self.whitespace_lines);
        result.insert_scalar("Special characters", self.special_chars);
        result.insert_scalar(
            "Average word length",
            format!("{:.2}", self.average_word_length),
        );
        result.insert_scalar(
            "Average line length",
            format!("{:.2}", self.average_line_length),
        );
        result.insert_list(
            format!("Top {} words", self.top_limit),
            self.top_words
                .iter()
                .map(|(word, count)| format!("{}: {}", word, count)),
        );
        result
    }
}

/// Count words and rank by descending count; ties keep first-seen order.
fn most_common(words: &[&str], top: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &word in words {
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word.to_string(), 1));
            }
        }
    }

    // stable: equal counts stay in encounter order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top);
    counts
}

/// Analyzer for plain text files.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    path: PathBuf,
    options: AnalyzeOptions,
}

impl TextAnalyzer {
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

    fn collect(&self) -> Result<StructuredResult> {
        let raw = std::fs::read(&self.path)?;
        let encoding = detect_encoding(&raw);
        log::debug!(
            "Detected encoding {} for {}",
            encoding,
            self.path.display()
        );

        let content = normalize_newlines(&encoding.decode(&raw)?);
        let stats = TextStats::compute(&content, self.options.top_words)?;
        Ok(stats.into_result(encoding.name()))
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

impl Analyzer for TextAnalyzer {
    fn name(&self) -> &str {
        "txt"
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

        match self.collect() {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to analyze {}: {}", self.path.display(), e);
                StructuredResult::error(format!("Failed to analyze file: {}", e))
            }
        }
    }
}

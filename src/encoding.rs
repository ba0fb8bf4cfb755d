//! Character encoding detection for plain text files.
//!
//! Detection order:
//! 1. empty input reports `ascii`
//! 2. a byte-order mark wins (`UTF-8-SIG`, `UTF-16LE`, `UTF-16BE`)
//! 3. pure 7-bit input reports `ascii`
//! 4. valid UTF-8 reports `utf-8`
//! 5. otherwise `chardetng` guesses a legacy encoding from byte statistics,
//!    reported by its WHATWG label (e.g. `windows-1251`)

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Error, Result};

/// Name reported for empty and 7-bit input.
pub const ASCII: &str = "ascii";

/// Outcome of encoding detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedEncoding {
    name: &'static str,
    encoding: &'static Encoding,
    bom_len: usize,
}

impl DetectedEncoding {
    fn new(name: &'static str, encoding: &'static Encoding, bom_len: usize) -> Self {
        Self {
            name,
            encoding,
            bom_len,
        }
    }

    /// Encoding name as shown in reports.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying decoder.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Length of the byte-order mark that was found, if any.
    pub fn bom_len(&self) -> usize {
        self.bom_len
    }

    /// Decode `bytes` strictly with this encoding.
    ///
    /// A byte-order mark detected earlier is skipped. Malformed input is an
    /// error rather than being replaced with U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        let body = bytes.get(self.bom_len..).unwrap_or_default();
        self.encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or_else(|| {
                Error::Encoding(format!("content is not valid {}", self.name))
            })
    }
}

impl std::fmt::Display for DetectedEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Guess the encoding of a byte buffer. Never fails.
pub fn detect_encoding(bytes: &[u8]) -> DetectedEncoding {
    if bytes.is_empty() {
        return DetectedEncoding::new(ASCII, UTF_8, 0);
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let name = if encoding == UTF_8 {
            "UTF-8-SIG"
        } else if encoding == UTF_16LE {
            "UTF-16LE"
        } else if encoding == UTF_16BE {
            "UTF-16BE"
        } else {
            encoding.name()
        };
        return DetectedEncoding::new(name, encoding, bom_len);
    }

    if bytes.is_ascii() {
        return DetectedEncoding::new(ASCII, UTF_8, 0);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return DetectedEncoding::new("utf-8", UTF_8, 0);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, false);
    DetectedEncoding::new(encoding.name(), encoding, 0)
}

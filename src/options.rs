//! Analysis options and configuration.

/// Default upper bound on the size of an analyzed file (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Default number of entries in the word frequency ranking.
pub const DEFAULT_TOP_WORDS: usize = 10;

/// Options shared by every analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Largest file accepted by validation, in bytes (`None` = unlimited)
    pub max_file_size: Option<u64>,

    /// How many of the most frequent words the text analyzer reports
    pub top_words: usize,
}

impl AnalyzeOptions {
    /// Create new analyze options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted file size in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Accept files of any size.
    pub fn unlimited_size(mut self) -> Self {
        self.max_file_size = None;
        self
    }

    /// Set the length of the word frequency ranking.
    pub fn with_top_words(mut self, count: usize) -> Self {
        self.top_words = count;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            top_words: DEFAULT_TOP_WORDS,
        }
    }
}

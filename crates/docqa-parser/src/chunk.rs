//! Paragraph chunking
//!
//! Chunk boundaries follow blank-line boundaries in the extracted text only:
//! the text is split on a literal delimiter, each segment is trimmed, and
//! segments that end up empty are dropped. There is no size limit, overlap,
//! or token counting.

use docqa_core::Chunk;

/// Delimiter between chunks in extracted text
pub const DEFAULT_DELIMITER: &str = "\n\n";

/// Splits document text into paragraph chunks on a fixed delimiter
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    delimiter: String,
}

impl ParagraphChunker {
    /// Create a chunker splitting on `delimiter`
    ///
    /// An empty delimiter falls back to [`DEFAULT_DELIMITER`].
    pub fn new(delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        Self {
            delimiter: if delimiter.is_empty() {
                DEFAULT_DELIMITER.to_string()
            } else {
                delimiter
            },
        }
    }

    /// Ordered, non-empty, trimmed paragraphs of `text`
    pub fn split_paragraphs(&self, text: &str) -> Vec<String> {
        text.split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Chunks of `text` with ids derived from `source_file`
    pub fn chunk(&self, source_file: &str, text: &str) -> Vec<Chunk> {
        self.split_paragraphs(text)
            .into_iter()
            .enumerate()
            .map(|(index, segment)| Chunk::new(source_file, index, segment))
            .collect()
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

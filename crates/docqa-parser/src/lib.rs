//! DocQA Parser - Text extraction and chunking
//!
//! Turns uploaded documents into the ordered text segments that get
//! embedded and indexed:
//! - File type detection (only PDF is accepted)
//! - PDF text extraction via `pdf-extract`
//! - Paragraph chunking on a fixed delimiter

use std::path::Path;
use thiserror::Error;

pub mod chunk;
pub mod pdf;

pub use chunk::{ParagraphChunker, DEFAULT_DELIMITER};
pub use pdf::PdfExtractor;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during text extraction
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for docqa_core::DocQaError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::UnsupportedFormat(ext) => docqa_core::DocQaError::UnsupportedFormat(ext),
            other => docqa_core::DocQaError::Other(other.into()),
        }
    }
}

// ============================================================================
// File Types
// ============================================================================

/// File types recognized at the upload boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename or path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reject anything that is not a PDF before any processing starts
pub fn ensure_pdf(filename: &str) -> Result<()> {
    match FileType::from_path(filename) {
        FileType::Pdf => Ok(()),
        FileType::Unknown => Err(ParserError::UnsupportedFormat(
            Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string(),
        )),
    }
}

// ============================================================================
// Extractor Trait
// ============================================================================

/// Trait for turning raw document bytes into plain text
///
/// Implementations are synchronous and may be CPU heavy; async callers should
/// run them on a blocking thread.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of a document
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("docx"), FileType::Unknown);
        assert_eq!(FileType::from_path("report.final.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_path("notes"), FileType::Unknown);
        assert_eq!(FileType::Pdf.to_string(), "pdf");
    }

    #[test]
    fn test_ensure_pdf() {
        assert!(ensure_pdf("paper.pdf").is_ok());
        assert!(ensure_pdf("Paper.PDF").is_ok());

        match ensure_pdf("notes.txt") {
            Err(ParserError::UnsupportedFormat(ext)) => assert_eq!(ext, "txt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        match ensure_pdf("README") {
            Err(ParserError::UnsupportedFormat(ext)) => assert_eq!(ext, "none"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_error_conversion() {
        let err: docqa_core::DocQaError = ParserError::UnsupportedFormat("txt".into()).into();
        assert!(matches!(err, docqa_core::DocQaError::UnsupportedFormat(_)));
    }
}

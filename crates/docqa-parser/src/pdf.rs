//! PDF text extraction using pdf-extract

use crate::{ParserError, Result, TextExtractor};

/// PDF text extractor
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    /// Replace form feeds (page breaks) with a paragraph break
    pub page_breaks_as_paragraphs: bool,
}

impl PdfExtractor {
    /// Create a new PDF extractor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat page boundaries as chunk boundaries
    pub fn with_page_breaks_as_paragraphs(mut self, enabled: bool) -> Self {
        self.page_breaks_as_paragraphs = enabled;
        self
    }

    fn normalize(&self, text: String) -> String {
        if self.page_breaks_as_paragraphs {
            text.replace('\x0C', "\n\n")
        } else {
            text
        }
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(ParserError::PdfError("empty file".to_string()));
        }

        // pdf-extract panics on some malformed documents
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| ParserError::PdfError("extractor panicked on malformed PDF".to_string()))?
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        tracing::debug!("Extracted {} characters from PDF", extracted.len());
        Ok(self.normalize(extracted))
    }
}

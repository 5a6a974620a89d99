//! PDF text extraction.

use doc_extract_core::{Error, PdfText, Result};
use lopdf::Document;

/// Parser for PDF documents.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }

    /// Extract the document's text, pages in order separated by blank lines.
    pub fn parse(&self, data: &[u8]) -> Result<PdfText> {
        let pages = self.page_texts(data)?;
        Ok(PdfText::from_pages(pages))
    }

    /// Extract text per page, in page order. Pages whose content cannot be
    /// decoded yield an empty string.
    pub fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        let doc = Document::load_mem(data)
            .map_err(|e| Error::PdfParseError(format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        log::debug!("PDF has {} pages", pages.len());

        let texts = pages
            .keys()
            .map(|&page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
            })
            .collect();

        Ok(texts)
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

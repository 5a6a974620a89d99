//! PDF text extractor.
//!
//! Loads documents with `lopdf` and joins per-page text with blank lines.

pub mod parser;

pub use parser::PdfParser;

//! PPTX (Office Open XML) extractor for slide text and embedded pictures.
//!
//! Reads .pptx files, which are ZIP archives containing XML parts.

mod package;
pub mod parser;

pub use parser::PptxParser;

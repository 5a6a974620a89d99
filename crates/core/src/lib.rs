//! Core domain types, errors, and data URI encoding for document
//! extraction.

pub mod data_uri;
pub mod error;
pub mod types;

pub use data_uri::{encode_data_uri, mime_type_for_path};
pub use error::{Error, Result};
pub use types::{DocumentFormat, PdfText, SlideContent, SlideDeck, UploadedFile, DEFAULT_PPTX_MODE};

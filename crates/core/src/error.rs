//! Error types for document extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during document extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Failed to load or parse the PDF document.
    #[error("PDF parsing error: {0}")]
    PdfParseError(String),

    /// A required part is missing from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether this error means the document itself could not be parsed,
    /// as opposed to a failure reading it.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Error::IoError(_))
    }
}

//! Domain types for uploaded documents and their extracted content.

use serde::{Deserialize, Serialize};

/// The `mode` value assumed when a PPTX request does not send one.
pub const DEFAULT_PPTX_MODE: &str = "slides";

/// A document received for extraction. Lives for a single request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename declared by the client, if any.
    pub filename: Option<String>,

    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Create an uploaded file from its declared name and contents.
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self { filename, bytes }
    }

    /// Declared filename, or `"upload"` when the client sent none.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("upload")
    }
}

/// Text extracted from a PDF document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfText {
    /// Page texts in page order, separated by blank lines.
    pub text: String,
}

impl PdfText {
    /// Join per-page texts, skipping pages without any text.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for page in pages {
            let page = page.as_ref().trim();
            if page.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(page);
        }
        Self { text }
    }
}

/// Content extracted from a presentation, slides in presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDeck {
    pub slides: Vec<SlideContent>,
}

impl SlideDeck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slide.
    pub fn add_slide(&mut self, slide: SlideContent) {
        self.slides.push(slide);
    }

    /// Total number of images across all slides.
    pub fn image_count(&self) -> usize {
        self.slides.iter().map(|s| s.images.len()).sum()
    }
}

/// A single extracted slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContent {
    /// Text-frame contents joined with newlines, trimmed.
    pub text: String,

    /// Embedded pictures as `data:<mime>;base64,<payload>` URIs.
    pub images: Vec<String>,
}

impl SlideContent {
    /// Build a slide from the text of each text-bearing shape, in shape order.
    pub fn from_text_frames<I, S>(frames: I, images: Vec<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = frames
            .into_iter()
            .map(|f| f.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            text: joined.trim().to_string(),
            images,
        }
    }
}

/// The format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Modern PPTX (Office Open XML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        if bytes.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        None
    }

    /// Detect format from contents, falling back to the filename extension.
    pub fn detect(bytes: &[u8], filename: &str) -> Option<Self> {
        Self::from_magic(bytes).or_else(|| {
            filename
                .rsplit_once('.')
                .and_then(|(_, ext)| Self::from_extension(ext))
        })
    }
}

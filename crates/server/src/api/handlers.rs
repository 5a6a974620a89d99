//! API request handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use axum::Json;
use doc_extract_core::{PdfText, SlideDeck, UploadedFile, DEFAULT_PPTX_MODE};
use doc_extract_pdf::PdfParser;
use doc_extract_pptx::PptxParser;
use std::time::Instant;

use super::error::{ApiError, ApiResult};

/// Fields submitted with an extraction request.
#[derive(Debug)]
struct UploadForm {
    file: UploadedFile,
    /// Accepted for compatibility; extraction does not vary by mode.
    mode: String,
}

/// Extract text from an uploaded PDF (multipart form: file)
pub async fn parse_pdf(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PdfText>> {
    let start = Instant::now();
    let form = read_upload_form(multipart?).await?;
    let upload = form.file;
    let name = upload.display_name().to_string();
    log::info!("Parsing PDF '{}' ({} bytes)", name, upload.bytes.len());

    let pdf = tokio::task::spawn_blocking(move || PdfParser::new().parse(&upload.bytes)).await??;

    log::info!(
        "Extracted {} chars from '{}' in {:?}",
        pdf.text.len(),
        name,
        start.elapsed()
    );
    Ok(Json(pdf))
}

/// Extract slide text and images from an uploaded PPTX (multipart form: file, mode)
pub async fn parse_pptx(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<SlideDeck>> {
    let start = Instant::now();
    let form = read_upload_form(multipart?).await?;
    let upload = form.file;
    let name = upload.display_name().to_string();
    log::info!("Parsing PPTX '{}' ({} bytes)", name, upload.bytes.len());
    log::debug!("Requested mode '{}'", form.mode);

    let deck =
        tokio::task::spawn_blocking(move || PptxParser::new().parse_bytes(&upload.bytes)).await??;

    log::info!(
        "Extracted {} slides and {} images from '{}' in {:?}",
        deck.slides.len(),
        deck.image_count(),
        name,
        start.elapsed()
    );
    Ok(Json(deck))
}

/// Read the `file` and `mode` fields, ignoring anything else.
async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut file: Option<UploadedFile> = None;
    let mut mode: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await?;
                log::debug!(
                    "file part received: {:?} ({} bytes)",
                    filename,
                    data.len()
                );
                file = Some(UploadedFile::new(filename, data.to_vec()));
            }
            Some("mode") => {
                mode = Some(field.text().await?);
            }
            other => {
                log::debug!("Ignoring form field {:?}", other);
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::InputError("Missing 'file' field in multipart".to_string()))?;

    Ok(UploadForm {
        file,
        mode: mode
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_PPTX_MODE.to_string()),
    })
}

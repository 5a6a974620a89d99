//! Inline `data:` URI encoding for extracted images.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIME type used when nothing better is known.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Guess a MIME type from a part name's extension.
pub fn mime_type_for_path(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_data_uri() {
        let uri = encode_data_uri("image/png", &[0x89, b'P', b'N', b'G']);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");

        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(encode_data_uri("image/gif", &[]), "data:image/gif;base64,");
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(mime_type_for_path("ppt/media/image1.png"), "image/png");
        assert_eq!(mime_type_for_path("ppt/media/image2.JPEG"), "image/jpeg");
        assert_eq!(mime_type_for_path("ppt/media/blob"), FALLBACK_MIME_TYPE);
    }
}

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::models::UploadedFile;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const MAX_REPORT_CHARS: usize = 10_000;

/// What gets sent to the provider for one uploaded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportContent {
    /// Text decoded from a PDF upload, already truncated.
    Text(String),
    /// Base64 image payload for the provider's vision input.
    Image { mime_type: String, data: String },
}

impl ReportContent {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportContent::Text(_) => "text",
            ReportContent::Image { .. } => "image",
        }
    }
}

/// Branch on the declared MIME type. File contents are never sniffed.
pub fn extract_content(file: &UploadedFile) -> Result<ReportContent> {
    let mime_type = file.mime_type.trim();

    if mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE) {
        let text = decode_pdf_text(&file.bytes);
        let decoded_chars = text.chars().count();
        let text = truncate_chars(&text, MAX_REPORT_CHARS);
        if decoded_chars > MAX_REPORT_CHARS {
            debug!(
                file_name = %file.file_name,
                decoded_chars,
                "Report text truncated to {} characters",
                MAX_REPORT_CHARS
            );
        }
        return Ok(ReportContent::Text(text));
    }

    if is_image(mime_type) {
        return Ok(ReportContent::Image {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(&file.bytes),
        });
    }

    warn!(
        file_name = %file.file_name,
        mime_type = %file.mime_type,
        "Rejecting upload with unsupported MIME type"
    );
    Err(AnalysisError::UnsupportedFileType(file.mime_type.clone()))
}

fn is_image(mime_type: &str) -> bool {
    mime_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Reads the PDF bytes as UTF-8 without parsing any PDF structure, so
/// compressed streams come through as replacement characters.
pub fn decode_pdf_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(mime_type: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile::new("report", mime_type, bytes.to_vec())
    }

    #[test]
    fn pdf_routes_to_text_branch() {
        let content = extract_content(&upload("application/pdf", b"Glucose 95 mg/dL")).unwrap();
        assert_eq!(content, ReportContent::Text("Glucose 95 mg/dL".to_string()));
    }

    #[test]
    fn images_route_to_base64_branch() {
        for mime in ["image/png", "image/jpeg", "image/webp", "IMAGE/GIF"] {
            let content = extract_content(&upload(mime, &[0x89, 0x50, 0x4E, 0x47])).unwrap();
            assert_eq!(
                content,
                ReportContent::Image {
                    mime_type: mime.to_string(),
                    data: "iVBORw==".to_string(),
                },
                "mime {mime}"
            );
        }
    }

    #[test]
    fn other_types_are_rejected_regardless_of_content() {
        for mime in ["text/plain", "application/json", "", "imag", "application/pdfx"] {
            let err = extract_content(&upload(mime, b"%PDF-1.7 looks like a pdf")).unwrap_err();
            assert!(
                matches!(err, AnalysisError::UnsupportedFileType(_)),
                "mime {mime:?}"
            );
        }
    }

    #[test]
    fn long_text_is_truncated_to_exact_limit() {
        let long = "a".repeat(MAX_REPORT_CHARS + 2_500);
        match extract_content(&upload("application/pdf", long.as_bytes())).unwrap() {
            ReportContent::Text(text) => assert_eq!(text.chars().count(), MAX_REPORT_CHARS),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn text_at_exact_limit_is_kept_whole() {
        let full = "b".repeat(MAX_REPORT_CHARS);
        match extract_content(&upload("application/pdf", full.as_bytes())).unwrap() {
            ReportContent::Text(text) => assert_eq!(text, full),
            other => panic!("unexpected content: {other:?}"),
        }

        let multibyte = "µ".repeat(MAX_REPORT_CHARS);
        assert_eq!(truncate_chars(&multibyte, MAX_REPORT_CHARS), multibyte);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(12);
        let truncated = truncate_chars(&text, 10);
        assert_eq!(truncated.chars().count(), 10);
        assert_eq!(truncated.len(), 20);
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn binary_pdf_bytes_decode_lossily() {
        let text = decode_pdf_text(b"%PDF-1.4\n\xFF\xFEstream");
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with("stream"));
    }

    #[test]
    fn leading_bom_is_dropped() {
        assert_eq!(decode_pdf_text(b"\xEF\xBB\xBFHDL 55"), "HDL 55");
    }
}

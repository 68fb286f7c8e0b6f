//! Document storage abstractions.
//!
//! Defines the trait for storing client document bytes plus the pure helpers
//! shared by every implementation. Implementations live in firerange-infra.

use std::path::Path;

pub mod document_store;

/// Detect MIME type from file extension.
pub fn detect_mime(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "odt" => "application/vnd.oasis.opendocument.text",
        "txt" => "text/plain",
        "csv" => "text/csv",

        // Images (scans and photos of documents)
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",

        // Archives
        "zip" => "application/zip",

        _ => "application/octet-stream",
    }
    .to_string()
}

/// Check an uploaded file name: non-empty, no path separators, no `..`.
pub fn validate_filename(filename: &str) -> Result<(), String> {
    if filename.trim().is_empty() {
        return Err("file name cannot be empty".to_string());
    }
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err("file name must not contain path separators or '..'".to_string());
    }
    if filename.chars().any(char::is_control) {
        return Err("file name must not contain control characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime() {
        assert_eq!(detect_mime("rg.pdf"), "application/pdf");
        assert_eq!(detect_mime("FOTO.JPG"), "image/jpeg");
        assert_eq!(detect_mime("comprovante.png"), "image/png");
        assert_eq!(detect_mime("unknown.xyz"), "application/octet-stream");
        assert_eq!(detect_mime("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("certidao federal.pdf").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("   ").is_err());
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("a/b.pdf").is_err());
        assert!(validate_filename("a\\b.pdf").is_err());
        assert!(validate_filename("a\nb.pdf").is_err());
    }
}

use anyhow::{Result, anyhow};
use std::path::Path;

pub const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const ZIP_MIME: &str = "application/zip";

/// Local file header signature every OOXML package starts with.
const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// Maximum filename length in bytes
const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Sanitizes filename to prevent path traversal and injection attacks
/// Returns the sanitized filename or an error if the name is invalid
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Get only the filename component (remove any path)
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > MAX_FILENAME_LEN {
        let mut end = MAX_FILENAME_LEN;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    // Prevent hidden files
    if sanitized.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "HIDDEN_FILE",
            message: "Hidden files (starting with '.') are not allowed".to_string(),
        }));
    }

    Ok(sanitized)
}

pub fn has_pptx_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pptx"))
}

/// Checks magic bytes to confirm the upload is a zip based OOXML package.
/// Returns the detected MIME type.
pub fn sniff_package(bytes: &[u8]) -> Result<&'static str> {
    if bytes.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_FILE",
            message: "File appears to be empty".to_string(),
        }));
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.mime_type() == PPTX_MIME {
            return Ok(PPTX_MIME);
        }
    }

    if bytes.starts_with(ZIP_SIGNATURE) {
        return Ok(ZIP_MIME);
    }

    Err(anyhow!(ValidationError {
        code: "NOT_A_PACKAGE",
        message: "File content is not a PPTX package".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("deck.pptx").unwrap(), "deck.pptx");
        assert_eq!(
            sanitize_filename("../../etc/passwd").unwrap(),
            "passwd"
        );
        assert_eq!(
            sanitize_filename("Q1: plan?.pptx").unwrap(),
            "Q1_ plan_.pptx"
        );
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename(".hidden.pptx").is_err());
    }

    #[test]
    fn test_sanitize_long_filename() {
        let long = format!("{}.pptx", "é".repeat(200));
        let sanitized = sanitize_filename(&long).unwrap();
        assert!(sanitized.len() <= MAX_FILENAME_LEN);
    }

    #[test]
    fn test_has_pptx_extension() {
        assert!(has_pptx_extension("deck.pptx"));
        assert!(has_pptx_extension("DECK.PPTX"));
        assert!(!has_pptx_extension("deck.ppt"));
        assert!(!has_pptx_extension("pptx"));
    }

    #[test]
    fn test_sniff_package() {
        assert!(sniff_package(b"PK\x03\x04rest-of-archive").is_ok());
        assert!(sniff_package(b"%PDF-1.7").is_err());

        let err = sniff_package(b"").unwrap_err();
        assert!(err.to_string().starts_with("EMPTY_FILE"));
    }
}

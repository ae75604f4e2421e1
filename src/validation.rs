//! Validation module for uploaded images
//!
//! Cheap checks performed before any decoding work:
//!
//! - Empty uploads
//! - Uploads over the configured size limit
//! - Bytes whose magic number is not a supported raster format
//!
//! Errors are returned as localization keys (prefixed with `error-` in the
//! catalogs) so the HTTP layer can report them in the caller's language.

use image::ImageFormat;

/// Formats accepted for analysis
pub const SUPPORTED_FORMATS: [ImageFormat; 6] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

/// Validates an uploaded image before analysis
///
/// # Arguments
/// * `bytes` - The raw upload
/// * `max_bytes` - Maximum accepted size
///
/// # Returns
/// * `Ok(ImageFormat)` - The sniffed format
/// * `Err(&str)` - Error type: "upload-empty", "upload-too-large" or "upload-unsupported-format"
///
/// # Examples
/// ```
/// use bodytalk::validation::validate_upload;
///
/// assert_eq!(validate_upload(&[], 1024), Err("upload-empty"));
/// assert_eq!(validate_upload(&[0u8; 2048], 1024), Err("upload-too-large"));
/// assert_eq!(validate_upload(b"hello", 1024), Err("upload-unsupported-format"));
/// ```
pub fn validate_upload(bytes: &[u8], max_bytes: usize) -> Result<ImageFormat, &'static str> {
    if bytes.is_empty() {
        return Err("upload-empty");
    }

    if bytes.len() > max_bytes {
        return Err("upload-too-large");
    }

    match image::guess_format(bytes) {
        Ok(format) if SUPPORTED_FORMATS.contains(&format) => Ok(format),
        Ok(format) => {
            tracing::debug!(format = ?format, "Rejected upload with unsupported format");
            Err("upload-unsupported-format")
        }
        Err(_) => Err("upload-unsupported-format"),
    }
}

/// Catalog key for a validation error key
pub fn error_message_key(error: &str) -> String {
    format!("error-{}", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

    #[test]
    fn test_empty_upload() {
        assert_eq!(validate_upload(&[], 100), Err("upload-empty"));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(64, 0);
        assert_eq!(validate_upload(&bytes, 64), Ok(ImageFormat::Png));
        assert_eq!(validate_upload(&bytes, 63), Err("upload-too-large"));
    }

    #[test]
    fn test_sniffs_supported_formats() {
        assert_eq!(validate_upload(&PNG_MAGIC, 1024), Ok(ImageFormat::Png));
        assert_eq!(validate_upload(&JPEG_MAGIC, 1024), Ok(ImageFormat::Jpeg));
        assert_eq!(validate_upload(b"GIF89a....", 1024), Ok(ImageFormat::Gif));
    }

    #[test]
    fn test_rejects_unknown_bytes() {
        assert_eq!(
            validate_upload(b"%PDF-1.7 not an image", 1024),
            Err("upload-unsupported-format")
        );
    }

    #[test]
    fn test_error_message_key() {
        assert_eq!(error_message_key("upload-empty"), "error-upload-empty");
    }
}

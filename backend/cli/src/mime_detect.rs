//! MIME type detection for ticket photos.

use std::path::Path;

/// Detect an image MIME type by file extension. Unknown extensions fall
/// back to `image/png`, the same default the upload endpoint applies.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(detect_mime_type(Path::new("ticket.JPG")), "image/jpeg");
        assert_eq!(detect_mime_type(Path::new("scan.webp")), "image/webp");
        assert_eq!(detect_mime_type(Path::new("IMG_0001.HEIC")), "image/heic");
        assert_eq!(detect_mime_type(Path::new("no_extension")), "image/png");
    }

    #[test]
    fn image_prefix() {
        assert!(is_image("image/jpeg"));
        assert!(!is_image("application/pdf"));
    }
}

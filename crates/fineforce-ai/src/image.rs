use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Base64 image payload sent to the analysis model.
///
/// Enhancement (downsampling, colour adjustment) happens before this point;
/// [`ProcessedImage::from_bytes`] is the pass-through used when no enhanced
/// rendition is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub mime_type: String,
    pub data: String,
}

impl ProcessedImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// `data:<mime>;base64,<data>`, e.g. for a preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Image MIME type from the file extension, defaulting to JPEG.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_payload() {
        let img = ProcessedImage::from_bytes(b"\xff\xd8\xff", "image/jpeg");
        assert_eq!(img.data, "/9j/");
        assert_eq!(img.data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("cam/IMG_01.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("shot.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "image/jpeg");
    }
}

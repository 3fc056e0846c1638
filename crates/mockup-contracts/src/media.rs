use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::MockupError;

/// Largest accepted reference image, in bytes.
pub const MAX_REFERENCE_BYTES: u64 = 5 * 1024 * 1024;

const DEFAULT_MIME: &str = "image/png";

/// A base64 bitmap with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], path_hint: Option<&Path>) -> Self {
        Self {
            mime_type: sniff_mime(bytes, path_hint).to_string(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(BASE64.decode(self.data.as_bytes())?)
    }
}

/// Reject files above [`MAX_REFERENCE_BYTES`] before any bytes are read.
pub fn check_reference_size(size: u64) -> Result<(), MockupError> {
    if size > MAX_REFERENCE_BYTES {
        return Err(MockupError::OversizeFile {
            size,
            limit: MAX_REFERENCE_BYTES,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// First clipboard entry whose type names an image; the rest are ignored.
pub fn first_clipboard_image(items: &[ClipboardItem]) -> Option<&ClipboardItem> {
    items
        .iter()
        .find(|item| item.mime_type.to_ascii_lowercase().contains("image"))
}

pub fn sniff_mime(bytes: &[u8], path_hint: Option<&Path>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        if let Some(mime) = mime_for_format(format) {
            return mime;
        }
    }
    path_hint.and_then(mime_for_path).unwrap_or(DEFAULT_MIME)
}

fn mime_for_format(format: image::ImageFormat) -> Option<&'static str> {
    match format {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())?;
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

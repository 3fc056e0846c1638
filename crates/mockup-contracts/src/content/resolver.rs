use serde_json::Value;

use crate::error::MockupError;
use crate::media::EncodedImage;

pub const ANALYSIS_FALLBACK: &str = "Failed to analyze image.";

/// A reply part the resolver understands. Anything else is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    InlineImage { mime_type: Option<String>, data: String },
    Text(String),
}

/// Parts of the first candidate that carries any. Unknown part shapes are skipped.
pub fn response_parts(response: &Value) -> Vec<ResponsePart> {
    let candidates = response
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        else {
            continue;
        };
        if parts.is_empty() {
            continue;
        }
        return parts.iter().filter_map(decode_part).collect();
    }
    Vec::new()
}

fn decode_part(part: &Value) -> Option<ResponsePart> {
    if let Some(inline) = part
        .get("inlineData")
        .or_else(|| part.get("inline_data"))
        .and_then(Value::as_object)
    {
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !data.is_empty() {
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return Some(ResponsePart::InlineImage {
                mime_type,
                data: data.to_string(),
            });
        }
    }
    part.get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| ResponsePart::Text(text.to_string()))
}

fn joined_text(parts: &[ResponsePart]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            ResponsePart::Text(text) => Some(text.as_str()),
            ResponsePart::InlineImage { .. } => None,
        })
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Extract the generated image, or the reason there isn't one.
///
/// The image is always labelled PNG regardless of the reported type.
pub fn resolve_image(response: &Value) -> Result<EncodedImage, MockupError> {
    let parts = response_parts(response);
    let image = parts.iter().find_map(|part| match part {
        ResponsePart::InlineImage { data, .. } => Some(data),
        ResponsePart::Text(_) => None,
    });
    if let Some(data) = image {
        return Ok(EncodedImage::new("image/png", data.clone()));
    }

    let text = joined_text(&parts);
    if !text.trim().is_empty() {
        return Err(MockupError::ModelRefusal(text));
    }
    Err(MockupError::NoImageData)
}

/// Text of an image-analysis reply, or the fixed fallback.
pub fn resolve_analysis(response: &Value) -> String {
    let text = joined_text(&response_parts(response));
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ANALYSIS_FALLBACK.to_string();
    }
    trimmed.to_string()
}

use serde_json::{json, Map, Value};

use crate::media::EncodedImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    InlineImage(EncodedImage),
    Text(String),
}

impl ContentPart {
    pub fn to_json(&self) -> Value {
        match self {
            Self::InlineImage(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }),
            Self::Text(text) => json!({ "text": text }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: Option<String>,
}

impl ImageConfig {
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "aspectRatio".to_string(),
            Value::String(self.aspect_ratio.clone()),
        );
        if let Some(size) = self.image_size.as_ref() {
            map.insert("imageSize".to_string(), Value::String(size.clone()));
        }
        Value::Object(map)
    }
}

/// One `generateContent` call: a model, ordered parts, optional image config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub image_config: Option<ImageConfig>,
}

impl ContentRequest {
    pub fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert(
            "contents".to_string(),
            Value::Array(vec![json!({
                "role": "user",
                "parts": self.parts.iter().map(ContentPart::to_json).collect::<Vec<Value>>(),
            })]),
        );
        if let Some(image_config) = self.image_config.as_ref() {
            payload.insert(
                "generationConfig".to_string(),
                json!({ "imageConfig": image_config.to_json() }),
            );
        }
        Value::Object(payload)
    }

    pub fn inline_images(&self) -> impl Iterator<Item = &EncodedImage> {
        self.parts.iter().filter_map(|part| match part {
            ContentPart::InlineImage(image) => Some(image),
            ContentPart::Text(_) => None,
        })
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::InlineImage(_) => None,
            })
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

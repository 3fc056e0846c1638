use std::io::Cursor;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mockup_contracts::content::ContentRequest;
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::config::StudioConfig;
use crate::response_json_or_error;

/// The hosted `generateContent` capability. Returns the raw reply; decoding
/// is left to the resolver.
pub trait GenerationBackend: Send {
    fn name(&self) -> &str;
    fn generate_content(&self, request: &ContentRequest) -> Result<Value>;
}

pub struct GeminiBackend {
    api_base: String,
    api_key: Option<String>,
    timeout_s: Option<f64>,
    http: HttpClient,
}

impl GeminiBackend {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            timeout_s: config.request_timeout_s,
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate_content(&self, request: &ContentRequest) -> Result<Value> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY or API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        let mut builder = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(&request.payload());
        if let Some(timeout_s) = self.timeout_s {
            builder = builder.timeout(Duration::from_secs_f64(timeout_s));
        }
        let response = builder
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error("Gemini", response)
    }
}

/// Offline stand-in: a solid PNG whose color is derived from the request,
/// or a canned description for requests without an image config.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunBackend;

impl DryrunBackend {
    const BASE_EDGE: u32 = 256;

    fn dims_for_ratio(aspect_ratio: &str) -> (u32, u32) {
        let Some((w, h)) = aspect_ratio
            .split_once(':')
            .and_then(|(w, h)| {
                Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?))
            })
            .filter(|(w, h)| *w > 0 && *h > 0)
        else {
            return (Self::BASE_EDGE, Self::BASE_EDGE);
        };
        if w >= h {
            (Self::BASE_EDGE, (Self::BASE_EDGE * h / w).max(1))
        } else {
            ((Self::BASE_EDGE * w / h).max(1), Self::BASE_EDGE)
        }
    }

    fn digest(request: &ContentRequest) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(request.model.as_bytes());
        hasher.update(request.text().as_bytes());
        for image in request.inline_images() {
            hasher.update(image.data.as_bytes());
        }
        hasher.finalize().to_vec()
    }

    fn render_png(width: u32, height: u32, rgb: [u8; 3]) -> Result<Vec<u8>> {
        let mut canvas = RgbImage::new(width, height);
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb(rgb);
        }
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut out, ImageFormat::Png)
            .context("dryrun PNG encode failed")?;
        Ok(out.into_inner())
    }
}

impl GenerationBackend for DryrunBackend {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate_content(&self, request: &ContentRequest) -> Result<Value> {
        let digest = Self::digest(request);
        let Some(image_config) = request.image_config.as_ref() else {
            return Ok(json!({
                "candidates": [{
                    "content": {"parts": [{
                        "text": format!(
                            "Studio product photograph, centered subject, soft key light, \
                             neutral backdrop (dryrun {}).",
                            hex::encode(&digest[..4])
                        )
                    }]}
                }]
            }));
        };

        let (width, height) = Self::dims_for_ratio(&image_config.aspect_ratio);
        let png = Self::render_png(width, height, [digest[0], digest[1], digest[2]])?;
        Ok(json!({
            "candidates": [{
                "content": {"parts": [{
                    "inlineData": {
                        "mimeType": "image/png",
                        "data": BASE64.encode(png),
                    }
                }]}
            }],
            "modelVersion": format!("dryrun/{}", request.model),
        }))
    }
}

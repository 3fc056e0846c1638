use std::fmt;
use std::str::FromStr;

use crate::error::MockupError;
use crate::media::EncodedImage;
use crate::models::{AspectRatio, ModelTier, QualityTier};

pub const DEFAULT_BACKGROUND: &str = "#000000";

/// `#RRGGBB` background override. Black is the "no override" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundColor(String);

impl BackgroundColor {
    /// Accepts `#RRGGBB`, bare `RRGGBB`, or `none` for the default.
    pub fn parse(raw: &str) -> Result<Self, MockupError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(MockupError::InvalidInput(format!(
                "background color '{raw}' is not a #RRGGBB hex value"
            )));
        }
        Ok(Self(format!("#{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.eq_ignore_ascii_case(DEFAULT_BACKGROUND)
    }

    /// `None` when the color is the default.
    pub fn override_hex(&self) -> Option<&str> {
        if self.is_default() {
            None
        } else {
            Some(self.as_str())
        }
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self(DEFAULT_BACKGROUND.to_string())
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BackgroundColor {
    type Err = MockupError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub quality_tier: QualityTier,
    pub aspect_ratio: AspectRatio,
    pub model_tier: ModelTier,
    pub reference_image: Option<EncodedImage>,
    pub background_color: BackgroundColor,
    pub refine_mode: bool,
}

impl GenerationRequest {
    pub fn has_reference(&self) -> bool {
        self.reference_image.is_some()
    }

    /// Checks that must pass before anything goes over the network.
    pub fn validate(&self) -> Result<(), MockupError> {
        if self.prompt_text.trim().is_empty() && !self.has_reference() {
            return Err(MockupError::Validation(
                "Enter a description or attach a reference image.".to_string(),
            ));
        }
        if self.refine_mode && !self.has_reference() {
            return Err(MockupError::Validation(
                "Refine mode needs a reference image to enhance.".to_string(),
            ));
        }
        Ok(())
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MockupError;

/// Output fidelity requested by the user, lowest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[default]
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "FHD")]
    Fhd,
    #[serde(rename = "2K")]
    R2k,
    #[serde(rename = "4K")]
    R4k,
    #[serde(rename = "8K")]
    R8k,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Hd,
        QualityTier::Fhd,
        QualityTier::R2k,
        QualityTier::R4k,
        QualityTier::R8k,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Hd => "HD",
            Self::Fhd => "FHD",
            Self::R2k => "2K",
            Self::R4k => "4K",
            Self::R8k => "8K",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|tier| tier.label() == normalized)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityTier {
    type Err = MockupError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw).ok_or_else(|| {
            MockupError::InvalidInput(format!(
                "unknown quality tier '{raw}' (expected one of HD, FHD, 2K, 4K, 8K)"
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "4:3")]
    StandardLandscape,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::StandardLandscape,
        AspectRatio::StandardPortrait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "9:16",
            Self::Landscape => "16:9",
            Self::StandardLandscape => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "square" => return Some(Self::Square),
            "portrait" | "tall" => return Some(Self::Portrait),
            "landscape" | "wide" => return Some(Self::Landscape),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == normalized)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = MockupError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw).ok_or_else(|| {
            MockupError::InvalidInput(format!(
                "unknown aspect ratio '{raw}' (expected one of 1:1, 9:16, 16:9, 4:3, 3:4)"
            ))
        })
    }
}

/// Backing model family. `Flash` is fast and unmetered; `Pro` needs a
/// selected credential and honours explicit output sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelTier {
    #[default]
    #[serde(rename = "gemini-2.5-flash-image")]
    Flash,
    #[serde(rename = "gemini-3-pro-image-preview")]
    Pro,
}

impl ModelTier {
    pub fn api_model(self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::Pro => "pro",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        [Self::Flash, Self::Pro]
            .into_iter()
            .find(|tier| tier.short_name() == normalized || tier.api_model() == normalized)
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ModelTier {
    type Err = MockupError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw).ok_or_else(|| {
            MockupError::InvalidInput(format!("unknown model '{raw}' (expected flash or pro)"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AspectRatio, ModelTier, QualityTier};

    #[test]
    fn quality_tiers_are_ordered() {
        assert!(QualityTier::Hd < QualityTier::Fhd);
        assert!(QualityTier::Fhd < QualityTier::R2k);
        assert!(QualityTier::R4k < QualityTier::R8k);
    }

    #[test]
    fn quality_tier_parse_is_case_insensitive() {
        assert_eq!(QualityTier::parse("fhd"), Some(QualityTier::Fhd));
        assert_eq!(QualityTier::parse(" 8k "), Some(QualityTier::R8k));
        assert_eq!(QualityTier::parse("16K"), None);
        assert!("16K".parse::<QualityTier>().is_err());
    }

    #[test]
    fn tiers_serialize_with_public_labels() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&QualityTier::R2k)?, "\"2K\"");
        assert_eq!(serde_json::to_string(&AspectRatio::Portrait)?, "\"9:16\"");
        assert_eq!(
            serde_json::to_string(&ModelTier::Pro)?,
            "\"gemini-3-pro-image-preview\""
        );
        let parsed: ModelTier = serde_json::from_str("\"gemini-2.5-flash-image\"")?;
        assert_eq!(parsed, ModelTier::Flash);
        Ok(())
    }

    #[test]
    fn aspect_ratio_accepts_keywords() {
        assert_eq!(AspectRatio::parse("wide"), Some(AspectRatio::Landscape));
        assert_eq!(AspectRatio::parse("3:4"), Some(AspectRatio::StandardPortrait));
        assert_eq!(AspectRatio::parse("21:9"), None);
    }

    #[test]
    fn model_tier_accepts_short_and_api_names() {
        assert_eq!(ModelTier::parse("PRO"), Some(ModelTier::Pro));
        assert_eq!(
            ModelTier::parse("gemini-2.5-flash-image"),
            Some(ModelTier::Flash)
        );
        assert_eq!(ModelTier::parse("imagen"), None);
    }
}

use std::fmt;

use crate::models::QualityTier;

pub const FALLBACK_DESCRIPTOR: &str = "high quality";

/// Explicit output size accepted by models that honour `imageSize`.
/// The API tops out at 4K, so the two highest tiers share a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeBucket {
    Low,
    Medium,
    High,
}

impl SizeBucket {
    pub fn token(self) -> &'static str {
        match self {
            Self::Low => "1K",
            Self::Medium => "2K",
            Self::High => "4K",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

pub fn size_bucket(tier: QualityTier) -> SizeBucket {
    match tier {
        QualityTier::Hd | QualityTier::Fhd => SizeBucket::Low,
        QualityTier::R2k => SizeBucket::Medium,
        QualityTier::R4k | QualityTier::R8k => SizeBucket::High,
    }
}

/// Wording that nudges models which ignore explicit sizing toward the tier.
pub fn quality_descriptor(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Hd => "standard quality, clear image",
        QualityTier::Fhd => "high definition, sharp focus, 1080p",
        QualityTier::R2k => "2K resolution, highly detailed, refined textures",
        QualityTier::R4k => {
            "4K resolution, hyper-realistic, incredible detail, 8k textures, macro photography"
        }
        QualityTier::R8k => {
            "8K resolution, masterpiece, extreme detail, uncompressed, raytracing, cinematic lighting"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub size: SizeBucket,
    pub descriptor: &'static str,
}

impl QualityProfile {
    pub fn for_tier(tier: QualityTier) -> Self {
        Self {
            size: size_bucket(tier),
            descriptor: quality_descriptor(tier),
        }
    }

    /// Label-level lookup; unrecognised labels get the generic descriptor
    /// and the smallest size.
    pub fn for_label(label: &str) -> Self {
        match QualityTier::parse(label) {
            Some(tier) => Self::for_tier(tier),
            None => Self {
                size: SizeBucket::Low,
                descriptor: FALLBACK_DESCRIPTOR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{quality_descriptor, size_bucket, QualityProfile, SizeBucket, FALLBACK_DESCRIPTOR};
    use crate::models::QualityTier;

    #[test]
    fn two_highest_tiers_share_the_high_bucket() {
        assert_eq!(size_bucket(QualityTier::R4k), SizeBucket::High);
        assert_eq!(size_bucket(QualityTier::R8k), size_bucket(QualityTier::R4k));
        assert_eq!(SizeBucket::High.token(), "4K");
    }

    #[test]
    fn size_mapping_is_deterministic_and_monotonic() {
        let mut previous = None;
        for tier in QualityTier::ALL {
            let bucket = size_bucket(tier);
            assert_eq!(bucket, size_bucket(tier));
            if let Some(prev) = previous {
                assert!(bucket as u8 >= prev as u8);
            }
            previous = Some(bucket);
        }
        assert_eq!(size_bucket(QualityTier::Hd).token(), "1K");
        assert_eq!(size_bucket(QualityTier::Fhd).token(), "1K");
        assert_eq!(size_bucket(QualityTier::R2k).token(), "2K");
    }

    #[test]
    fn descriptors_differ_per_tier() {
        assert!(quality_descriptor(QualityTier::Fhd).contains("1080p"));
        assert!(quality_descriptor(QualityTier::R8k).starts_with("8K resolution"));
        let mut seen: Vec<&str> = QualityTier::ALL
            .into_iter()
            .map(quality_descriptor)
            .collect();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn unknown_label_falls_back_to_generic_profile() {
        let profile = QualityProfile::for_label("16K");
        assert_eq!(profile.size, SizeBucket::Low);
        assert_eq!(profile.descriptor, FALLBACK_DESCRIPTOR);

        let known = QualityProfile::for_label("2k");
        assert_eq!(known, QualityProfile::for_tier(QualityTier::R2k));
    }
}

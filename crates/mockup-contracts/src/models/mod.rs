mod registry;
mod tiers;

pub use registry::{ModelRegistry, ModelSpec, CAPABILITY_IMAGE, CAPABILITY_VISION};
pub use tiers::{AspectRatio, ModelTier, QualityTier};

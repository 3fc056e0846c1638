use indexmap::IndexMap;

use super::tiers::ModelTier;

pub const CAPABILITY_IMAGE: &str = "image";
pub const CAPABILITY_VISION: &str = "vision";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// API-facing model identifier.
    pub name: String,
    pub tier: Option<ModelTier>,
    pub capabilities: Vec<String>,
    /// Whether `imageConfig.imageSize` is honoured. Models without it only
    /// see the descriptor text.
    pub accepts_image_size: bool,
    pub requires_credential: bool,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// The built-in Flash, Pro and vision models.
    pub fn new() -> Self {
        Self {
            models: default_models(),
        }
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn for_tier(&self, tier: ModelTier) -> Option<&ModelSpec> {
        self.models
            .values()
            .find(|model| model.tier == Some(tier) && model.supports(CAPABILITY_IMAGE))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str,
                      tier: Option<ModelTier>,
                      capabilities: &[&str],
                      accepts_image_size: bool,
                      requires_credential: bool| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                tier,
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
                accepts_image_size,
                requires_credential,
            },
        );
    };

    insert(
        ModelTier::Flash.api_model(),
        Some(ModelTier::Flash),
        &[CAPABILITY_IMAGE],
        false,
        false,
    );
    insert(
        ModelTier::Pro.api_model(),
        Some(ModelTier::Pro),
        &[CAPABILITY_IMAGE],
        true,
        true,
    );
    insert("gemini-2.5-flash", None, &[CAPABILITY_VISION], false, false);

    map
}

#[cfg(test)]
mod tests {
    use super::{ModelRegistry, CAPABILITY_IMAGE, CAPABILITY_VISION};
    use crate::models::ModelTier;

    #[test]
    fn default_registry_maps_each_tier_to_an_image_model() {
        let registry = ModelRegistry::new();
        let flash = registry.for_tier(ModelTier::Flash).cloned();
        let pro = registry.for_tier(ModelTier::Pro).cloned();

        assert_eq!(
            flash.as_ref().map(|spec| spec.name.as_str()),
            Some("gemini-2.5-flash-image")
        );
        assert_eq!(
            pro.as_ref().map(|spec| spec.name.as_str()),
            Some("gemini-3-pro-image-preview")
        );
        assert!(!flash.map(|spec| spec.accepts_image_size).unwrap_or(true));
        assert!(pro.map(|spec| spec.requires_credential).unwrap_or(false));
    }

    #[test]
    fn vision_capability_is_separate_from_image_models() {
        let registry = ModelRegistry::new();
        let vision: Vec<String> = registry
            .by_capability(CAPABILITY_VISION)
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(vision, vec!["gemini-2.5-flash".to_string()]);
        assert_eq!(registry.by_capability(CAPABILITY_IMAGE).len(), 2);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptModifier {
    pub group: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

pub const PROMPT_PRESETS: &[PromptPreset] = &[
    PromptPreset {
        id: "minimal",
        label: "Minimalist",
        value: "Clean white background, soft shadows, minimal aesthetic, high key lighting, Apple-style product photography",
    },
    PromptPreset {
        id: "dark",
        label: "Dark Elegant",
        value: "Dark moody background, dramatic rim lighting, premium luxury feel, black and gold accents, mysterious atmosphere",
    },
    PromptPreset {
        id: "nature",
        label: "Nature",
        value: "Placed on a wooden surface, sunlight filtering through leaves, natural bokeh background, organic vibes, fresh",
    },
    PromptPreset {
        id: "neon",
        label: "Cyberpunk",
        value: "Futuristic city blurred background, blue and pink neon rim lights, metallic surfaces, high contrast, sci-fi",
    },
    PromptPreset {
        id: "sunlight",
        label: "Golden Hour",
        value: "Warm sunset lighting, long shadows, cozy atmosphere, photorealistic, lens flare",
    },
    PromptPreset {
        id: "industrial",
        label: "Industrial",
        value: "Raw concrete background, steel textures, harsh shadows, brutalist architecture style, cold tones",
    },
    PromptPreset {
        id: "clay",
        label: "Claymorphism",
        value: "Soft matte 3D render style, pastel colors, rounded edges, plastic toy texture, isometric view, cute",
    },
    PromptPreset {
        id: "knolling",
        label: "Knolling",
        value: "Top-down view, organized items at 90 degree angles, flat lay photography, clean alignment, studio lighting",
    },
    PromptPreset {
        id: "vaporwave",
        label: "Vaporwave",
        value: "Retro 80s aesthetic, purple and teal grid, glitch effects, marble statues, nostalgic, lo-fi",
    },
    PromptPreset {
        id: "cinematic",
        label: "Cinematic",
        value: "Anamorphic lens look, movie scene, teal and orange color grading, shallow depth of field, dramatic composition",
    },
    PromptPreset {
        id: "isometric",
        label: "Isometric",
        value: "Orthographic 3D view, diorama style, miniature world, clean floating island look",
    },
    PromptPreset {
        id: "pastel",
        label: "Pastel Dream",
        value: "Soft marshmallows colors, dreamy haze, ethereal lighting, smooth gradients, calming",
    },
    PromptPreset {
        id: "vintage",
        label: "Vintage",
        value: "Film grain, light leaks, polaroid aesthetic, desaturated colors, 90s photography style",
    },
];

pub const PROMPT_MODIFIERS: &[PromptModifier] = &[
    PromptModifier {
        group: "lighting",
        label: "Softbox",
        value: "soft studio lighting",
    },
    PromptModifier {
        group: "lighting",
        label: "Hard Rim",
        value: "strong rim lighting",
    },
    PromptModifier {
        group: "lighting",
        label: "Natural",
        value: "natural daylight",
    },
    PromptModifier {
        group: "lighting",
        label: "Neon",
        value: "neon lighting",
    },
    PromptModifier {
        group: "lighting",
        label: "Volumetric",
        value: "volumetric fog lighting",
    },
    PromptModifier {
        group: "camera",
        label: "Front",
        value: "front view",
    },
    PromptModifier {
        group: "camera",
        label: "Top Down",
        value: "top-down flat lay view",
    },
    PromptModifier {
        group: "camera",
        label: "Isometric",
        value: "isometric 45 degree view",
    },
    PromptModifier {
        group: "camera",
        label: "Macro",
        value: "macro close-up",
    },
    PromptModifier {
        group: "camera",
        label: "Wide",
        value: "wide angle",
    },
    PromptModifier {
        group: "material",
        label: "Matte",
        value: "matte finish",
    },
    PromptModifier {
        group: "material",
        label: "Glossy",
        value: "high gloss finish",
    },
    PromptModifier {
        group: "material",
        label: "Metallic",
        value: "brushed metal texture",
    },
    PromptModifier {
        group: "material",
        label: "Glass",
        value: "translucent glass material",
    },
    PromptModifier {
        group: "material",
        label: "Wood",
        value: "natural wood texture",
    },
];

pub fn find_preset(id: &str) -> Option<&'static PromptPreset> {
    let needle = id.trim().to_ascii_lowercase();
    PROMPT_PRESETS
        .iter()
        .find(|preset| preset.id == needle || preset.label.to_ascii_lowercase() == needle)
}

/// Modifiers are looked up by label, optionally qualified as `group:label`
/// to disambiguate (e.g. `camera:isometric`).
pub fn find_modifier(raw: &str) -> Option<&'static PromptModifier> {
    let needle = raw.trim().to_ascii_lowercase();
    let (group, label) = match needle.split_once(':') {
        Some((group, label)) => (Some(group.trim().to_string()), label.trim().to_string()),
        None => (None, needle),
    };
    PROMPT_MODIFIERS.iter().find(|modifier| {
        group.as_deref().map_or(true, |group| modifier.group == group)
            && normalize_label(modifier.label) == normalize_label(&label)
    })
}

/// Append a snippet to the prompt, comma separated.
pub fn append_snippet(prompt: &str, snippet: &str) -> String {
    let current = prompt.trim();
    if current.is_empty() {
        return snippet.to_string();
    }
    format!("{current}, {snippet}")
}

fn normalize_label(label: &str) -> String {
    label
        .to_ascii_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect()
}

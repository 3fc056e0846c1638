mod composer;
mod presets;

pub use composer::{background_directive, compose_instruction, DEFAULT_DIRECTION};
pub use presets::{
    append_snippet, find_modifier, find_preset, PromptModifier, PromptPreset, PROMPT_MODIFIERS,
    PROMPT_PRESETS,
};

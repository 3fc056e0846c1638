use crate::quality::quality_descriptor;
use crate::request::GenerationRequest;

pub const DEFAULT_DIRECTION: &str = "Clean studio photography, elegant lighting";

/// Build the single instruction string sent alongside the optional image.
///
/// User text is interpolated verbatim; there is no escaping.
pub fn compose_instruction(request: &GenerationRequest) -> String {
    let descriptor = quality_descriptor(request.quality_tier);
    let background = background_directive(request.background_color.override_hex());
    let prompt = request.prompt_text.as_str();
    let has_prompt = !prompt.trim().is_empty();
    let mut lines: Vec<String> = Vec::new();

    match (request.has_reference(), request.refine_mode) {
        (true, true) => {
            lines.extend(restoration_preamble(descriptor));
            lines.push(String::new());
            lines.push("INPUT IMAGE: Source to be enhanced.".to_string());
            lines.push("INSTRUCTION:".to_string());
            lines.push("1. Upscale and clean the reference image.".to_string());
            lines.push(
                "2. Remove any text overlays or watermarks if they look like errors, but keep product text clear."
                    .to_string(),
            );
            if has_prompt {
                lines.push(format!("3. ADDITIONAL DIRECTION: {prompt}"));
            }
            lines.extend(background);
        }
        (true, false) => {
            lines.extend(composition_preamble(descriptor));
            lines.push(String::new());
            lines.push("INPUT IMAGE IS THE REFERENCE FOR SHAPE AND LAYOUT ONLY.".to_string());
            lines.push("INSTRUCTION:".to_string());
            lines.push(
                "1. Identify the MAIN PRODUCT/OBJECT in the image. Keep its shape and angle 100% accurate."
                    .to_string(),
            );
            lines.push(
                "2. IGNORE and REMOVE any text, watermarks, or stock photo grid lines overlaid on the image. Reconstruct the texture underneath."
                    .to_string(),
            );
            lines.push(format!(
                "3. UPGRADE the visual quality to {}.",
                request.quality_tier.label()
            ));
            let direction = if has_prompt { prompt } else { DEFAULT_DIRECTION };
            lines.push(format!("4. APPLY PROMPT: \"{direction}\"."));
            lines.extend(background);
        }
        (false, refine) => {
            // Refine without a source is rejected upstream; compose as a new scene.
            let preamble = if refine {
                restoration_preamble(descriptor)
            } else {
                composition_preamble(descriptor)
            };
            lines.extend(preamble);
            lines.push(format!("PROMPT: {prompt}."));
            lines.extend(background);
            lines.push(format!(
                "DETAILS: High-end finish, perfect materials, studio environment, no watermarks, no noise, no blur, {descriptor}."
            ));
        }
    }

    lines.join("\n")
}

pub fn background_directive(hex: Option<&str>) -> Option<String> {
    hex.map(|hex| {
        format!(
            "BACKGROUND: Use a clean, solid background color with Hex Code: {hex}. Ensure the object blends naturally with this color using appropriate shadows."
        )
    })
}

fn restoration_preamble(descriptor: &str) -> Vec<String> {
    vec![
        "ROLE: High-End Image Restoration & Enhancement Specialist.".to_string(),
        "TASK: Denoise, upscale, and refine the input image while preserving 100% of the visual content identity.".to_string(),
        String::new(),
        "STRICT RULES:".to_string(),
        format!("1. QUALITY TARGET: {descriptor}."),
        "2. RESTORATION: Remove compression artifacts, noise, blur, and pixelation.".to_string(),
        "3. FIDELITY: Do NOT change the subject, pose, or main elements. This is an enhancement, not a reimaging.".to_string(),
        "4. DETAIL: Add high-frequency textures (skin pores, fabric weaves, surface imperfections) to make it look like a raw photo.".to_string(),
        "5. LIGHTING: Fix blown-out highlights or crushed shadows without altering the mood.".to_string(),
    ]
}

fn composition_preamble(descriptor: &str) -> Vec<String> {
    vec![
        "ROLE: World-class Product Photographer & 3D Visualization Expert.".to_string(),
        "TASK: Create a clean, premium product mockup.".to_string(),
        format!("QUALITY TARGET: {descriptor}."),
        String::new(),
        "STRICT RULES FOR REFERENCE IMAGES:".to_string(),
        "1. GEOMETRY: Preserve the EXACT shape, perspective, and position of the MAIN OBJECT from the reference.".to_string(),
        "2. CLEANING: REMOVE ALL existing watermarks, logos, text overlays, or artifacts from the reference. The surface must be pristine.".to_string(),
        "3. LIGHTING: Re-light the scene with studio-quality global illumination (softbox/rim light).".to_string(),
        "4. COMPOSITION: Keep the main layout, but you are free to improve the background environment to be more premium.".to_string(),
        String::new(),
        "OUTPUT VISUALS:".to_string(),
        format!("- {descriptor}"),
        "- No noise, no blur, no distortion.".to_string(),
        "- Perfect material rendering (glass, metal, fabric).".to_string(),
    ]
}

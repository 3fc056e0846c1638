use mockup_contracts::content::{
    resolve_analysis, resolve_image, ContentPart, ContentRequest, ImageConfig,
};
use mockup_contracts::events::{SessionLog, StudioEvent};
use mockup_contracts::media::EncodedImage;
use mockup_contracts::models::{ModelRegistry, ModelSpec, CAPABILITY_VISION};
use mockup_contracts::prompt::compose_instruction;
use mockup_contracts::quality::size_bucket;
use mockup_contracts::request::GenerationRequest;
use mockup_contracts::MockupError;
use serde_json::{json, Value};

use crate::backend::GenerationBackend;
use crate::credentials::CredentialSelector;
use crate::error_chain_text;

pub const ANALYSIS_INSTRUCTION: &str = "Analyze this image and write a detailed, high-quality \
text-to-image prompt that would generate a similar image. Focus on the subject, composition, \
camera angle, lighting, colors, and materials. Output ONLY the prompt text, no intro/outro.";

const TRANSPORT_ERROR_MAX_CHARS: usize = 512;

/// Turns a [`GenerationRequest`] into one backend call and one outcome.
pub struct RequestDispatcher {
    backend: Box<dyn GenerationBackend>,
    credentials: Option<Box<dyn CredentialSelector>>,
    models: ModelRegistry,
    events: SessionLog,
}

impl RequestDispatcher {
    pub fn new(
        backend: Box<dyn GenerationBackend>,
        credentials: Option<Box<dyn CredentialSelector>>,
        events: SessionLog,
    ) -> Self {
        Self {
            backend,
            credentials,
            models: ModelRegistry::new(),
            events,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn image_model(&self, request: &GenerationRequest) -> Result<ModelSpec, MockupError> {
        self.models
            .for_tier(request.model_tier)
            .cloned()
            .ok_or_else(|| {
                MockupError::InvalidInput(format!(
                    "no image model registered for tier '{}'",
                    request.model_tier
                ))
            })
    }

    fn vision_model(&self) -> Result<ModelSpec, MockupError> {
        self.models
            .by_capability(CAPABILITY_VISION)
            .into_iter()
            .next()
            .ok_or_else(|| MockupError::InvalidInput("no vision model registered".to_string()))
    }

    /// Validated wire request: image part first, instruction second.
    pub fn build_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<ContentRequest, MockupError> {
        request.validate()?;
        let model = self.image_model(request)?;

        let mut parts = Vec::with_capacity(2);
        if let Some(reference) = request.reference_image.as_ref() {
            parts.push(ContentPart::InlineImage(reference.clone()));
        }
        parts.push(ContentPart::Text(compose_instruction(request)));

        let image_size = model
            .accepts_image_size
            .then(|| size_bucket(request.quality_tier).token().to_string());
        Ok(ContentRequest {
            model: model.name,
            parts,
            image_config: Some(ImageConfig {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                image_size,
            }),
        })
    }

    /// Validate, consult the credential hook if the model needs it, make
    /// exactly one call, and resolve the reply.
    pub fn dispatch(&self, request: &GenerationRequest) -> Result<EncodedImage, MockupError> {
        let content = self.build_request(request)?;
        let model = self.image_model(request)?;
        if model.requires_credential {
            self.ensure_credential();
        }

        let image_size = content
            .image_config
            .as_ref()
            .and_then(|config| config.image_size.clone());
        self.events.record(
            StudioEvent::GenerationDispatched,
            json!({
                "backend": self.backend.name(),
                "model": content.model,
                "quality": request.quality_tier.label(),
                "aspect_ratio": request.aspect_ratio.as_str(),
                "image_size": image_size,
                "has_reference": request.has_reference(),
                "refine": request.refine_mode,
            }),
        );

        let reply = self.send(&content)?;
        resolve_image(&reply)
    }

    /// Ask the vision model for a prompt describing `image`.
    pub fn analyze(&self, image: &EncodedImage) -> Result<String, MockupError> {
        let model = self.vision_model()?;
        let content = ContentRequest {
            model: model.name,
            parts: vec![
                ContentPart::InlineImage(image.clone()),
                ContentPart::Text(ANALYSIS_INSTRUCTION.to_string()),
            ],
            image_config: None,
        };

        self.events.record(
            StudioEvent::AnalysisDispatched,
            json!({
                "backend": self.backend.name(),
                "model": content.model,
            }),
        );

        let reply = self.send(&content)?;
        Ok(resolve_analysis(&reply))
    }

    fn send(&self, content: &ContentRequest) -> Result<Value, MockupError> {
        self.backend
            .generate_content(content)
            .map_err(|err| {
                MockupError::Transport(error_chain_text(&err, TRANSPORT_ERROR_MAX_CHARS))
            })
    }

    /// Best effort: failures are logged and never block generation.
    fn ensure_credential(&self) {
        let Some(selector) = self.credentials.as_ref() else {
            return;
        };
        let outcome = selector.has_selected_credential().and_then(|has_key| {
            if has_key {
                return Ok(false);
            }
            selector.open_selection().map(|()| true)
        });
        match outcome {
            Ok(true) => self
                .events
                .record(StudioEvent::CredentialSelectionOpened, Value::Null),
            Ok(false) => {}
            Err(err) => self.events.record_failure(
                StudioEvent::CredentialCheckFailed,
                &MockupError::CredentialCheck(format!("{err:#}")),
                Value::Null,
            ),
        }
    }
}

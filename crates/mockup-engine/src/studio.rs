use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use mockup_contracts::events::{SessionLog, StudioEvent};
use mockup_contracts::history::{
    persist_with_fallback, GeneratedResult, HistoryFilter, HistoryLog, HistoryStore,
    JsonFileHistoryStore, PersistOutcome,
};
use mockup_contracts::media::{
    check_reference_size, first_clipboard_image, ClipboardItem, EncodedImage,
};
use mockup_contracts::models::{AspectRatio, ModelTier, QualityTier};
use mockup_contracts::prompt::{append_snippet, find_modifier, find_preset};
use mockup_contracts::request::{BackgroundColor, GenerationRequest};
use mockup_contracts::MockupError;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::GenerationBackend;
use crate::config::StudioConfig;
use crate::credentials::ConfiguredKeySelector;
use crate::dispatcher::RequestDispatcher;
use crate::now_millis;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Dispatched,
    Succeeded,
    Failed,
}

/// Everything the user can see: current options, the last outcome, and the log.
#[derive(Debug, Clone, Default)]
pub struct StudioState {
    pub prompt: String,
    pub quality: QualityTier,
    pub aspect_ratio: AspectRatio,
    pub model: ModelTier,
    pub reference: Option<EncodedImage>,
    pub background: BackgroundColor,
    pub refine_mode: bool,
    pub phase: GenerationPhase,
    pub current: Option<GeneratedResult>,
    /// Inline message from the last failed action.
    pub error: Option<String>,
    pub history: HistoryLog,
}

pub struct MockupStudio {
    dispatcher: RequestDispatcher,
    store: Box<dyn HistoryStore>,
    events: SessionLog,
    state: StudioState,
}

impl MockupStudio {
    /// Restores persisted history. An unreadable slot starts an empty log.
    pub fn new(
        dispatcher: RequestDispatcher,
        store: Box<dyn HistoryStore>,
        events: SessionLog,
    ) -> Self {
        let history = match store.load() {
            Ok(entries) => HistoryLog::from_entries(entries),
            Err(err) => {
                events.record_failure(
                    StudioEvent::HistoryLoadFailed,
                    &MockupError::Storage(format!("{err:#}")),
                    Value::Null,
                );
                HistoryLog::new()
            }
        };
        events.record(
            StudioEvent::SessionStarted,
            json!({
                "backend": dispatcher.backend_name(),
                "history_entries": history.len(),
            }),
        );
        Self {
            dispatcher,
            store,
            events,
            state: StudioState {
                history,
                ..StudioState::default()
            },
        }
    }

    /// A fresh session over `config.state_dir`: the history slot, the event
    /// log, and a credential check against the configured key.
    pub fn open(config: &StudioConfig, backend: Box<dyn GenerationBackend>) -> Self {
        let events = SessionLog::new(config.events_path(), Uuid::new_v4().to_string());
        let selector = ConfiguredKeySelector::new(config.api_key.is_some());
        let dispatcher =
            RequestDispatcher::new(backend, Some(Box::new(selector)), events.clone());
        Self::new(
            dispatcher,
            Box::new(JsonFileHistoryStore::in_dir(config.state_dir())),
            events,
        )
    }

    pub fn session_id(&self) -> &str {
        self.events.session_id()
    }

    pub fn state(&self) -> &StudioState {
        &self.state
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    pub fn set_quality(&mut self, quality: QualityTier) {
        self.state.quality = quality;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.state.aspect_ratio = aspect_ratio;
    }

    pub fn set_model(&mut self, model: ModelTier) {
        self.state.model = model;
    }

    pub fn set_background(&mut self, background: BackgroundColor) {
        self.state.background = background;
    }

    pub fn set_refine_mode(&mut self, refine: bool) {
        self.state.refine_mode = refine;
    }

    /// Snapshot of the current options as a one-shot request.
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt_text: self.state.prompt.clone(),
            quality_tier: self.state.quality,
            aspect_ratio: self.state.aspect_ratio,
            model_tier: self.state.model,
            reference_image: self.state.reference.clone(),
            background_color: self.state.background.clone(),
            refine_mode: self.state.refine_mode,
        }
    }

    pub fn generate(&mut self) -> Result<GeneratedResult, MockupError> {
        let request = self.request();
        self.state.error = None;
        self.state.phase = GenerationPhase::Dispatched;

        let image = match self.dispatcher.dispatch(&request) {
            Ok(image) => image,
            Err(err) => {
                self.state.phase = GenerationPhase::Failed;
                return Err(self.record_failure(StudioEvent::GenerationFailed, err));
            }
        };

        let created_at = now_millis();
        let result = GeneratedResult {
            id: self.state.history.next_id(created_at),
            image,
            source_prompt: request.prompt_text,
            quality_tier: request.quality_tier,
            created_at,
            reference_image: request.reference_image,
            model_tier: request.model_tier,
        };
        let evicted: Vec<String> = self
            .state
            .history
            .push(result.clone())
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        self.state.current = Some(result.clone());
        self.state.phase = GenerationPhase::Succeeded;
        self.events.record(
            StudioEvent::GenerationSucceeded,
            json!({
                "id": result.id,
                "quality": result.quality_tier.label(),
                "model": result.model_tier.api_model(),
                "evicted": evicted,
            }),
        );
        self.persist_history();
        Ok(result)
    }

    /// Replace the prompt with a description of the reference image.
    pub fn analyze_reference(&mut self) -> Result<String, MockupError> {
        let Some(reference) = self.state.reference.clone() else {
            return Err(self.record_failure(
                StudioEvent::AnalysisFailed,
                MockupError::Validation("Attach a reference image to analyze.".to_string()),
            ));
        };
        match self.dispatcher.analyze(&reference) {
            Ok(prompt) => {
                self.state.prompt = prompt.clone();
                self.state.refine_mode = false;
                self.state.error = None;
                Ok(prompt)
            }
            Err(err) => Err(self.record_failure(StudioEvent::AnalysisFailed, err)),
        }
    }

    /// Size is checked from metadata, so oversized files are never read.
    pub fn attach_reference_file(&mut self, path: &Path) -> Result<(), MockupError> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                return Err(self.record_failure(
                    StudioEvent::ReferenceRejected,
                    MockupError::InvalidInput(format!("cannot read {}: {err}", path.display())),
                ))
            }
        };
        if let Err(err) = check_reference_size(size) {
            return Err(self.record_failure(StudioEvent::ReferenceRejected, err));
        }
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                return Err(self.record_failure(
                    StudioEvent::ReferenceRejected,
                    MockupError::InvalidInput(format!("cannot read {}: {err}", path.display())),
                ))
            }
        };
        self.set_reference(EncodedImage::from_bytes(&bytes, Some(path)), "file");
        Ok(())
    }

    /// Uses the first image item. Returns false when there is none.
    pub fn attach_clipboard(&mut self, items: &[ClipboardItem]) -> Result<bool, MockupError> {
        let Some(item) = first_clipboard_image(items) else {
            return Ok(false);
        };
        if let Err(err) = check_reference_size(item.bytes.len() as u64) {
            return Err(self.record_failure(StudioEvent::ReferenceRejected, err));
        }
        let mut image = EncodedImage::from_bytes(&item.bytes, None);
        image.mime_type = item.mime_type.clone();
        self.set_reference(image, "clipboard");
        Ok(true)
    }

    fn set_reference(&mut self, image: EncodedImage, source: &str) {
        self.events.record(
            StudioEvent::ReferenceAttached,
            json!({
                "source": source,
                "mime_type": image.mime_type,
            }),
        );
        self.state.reference = Some(image);
        self.state.error = None;
    }

    pub fn clear_reference(&mut self) {
        self.state.reference = None;
        self.state.refine_mode = false;
    }

    /// Show a past result and restore the options it was made with. An entry
    /// without a reference also turns refine mode off.
    pub fn load_from_history(&mut self, id: &str) -> Result<(), MockupError> {
        let Some(entry) = self.state.history.get(id).cloned() else {
            return Err(self.record_failure(StudioEvent::HistoryLookupFailed, unknown_entry(id)));
        };
        self.state.prompt = entry.source_prompt.clone();
        self.state.quality = entry.quality_tier;
        self.state.model = entry.model_tier;
        self.state.reference = entry.reference_image.clone();
        if self.state.reference.is_none() {
            self.state.refine_mode = false;
        }
        self.state.current = Some(entry);
        self.state.error = None;
        Ok(())
    }

    pub fn remove_history_entry(&mut self, id: &str) -> Result<GeneratedResult, MockupError> {
        let Some(removed) = self.state.history.remove(id) else {
            return Err(self.record_failure(StudioEvent::HistoryLookupFailed, unknown_entry(id)));
        };
        self.persist_history();
        Ok(removed)
    }

    /// Empties the log and its slot. The displayed result stays.
    pub fn clear_history(&mut self) {
        self.state.history.clear();
        if let Err(err) = self.store.clear() {
            self.events.record_failure(
                StudioEvent::HistoryClearFailed,
                &MockupError::Storage(format!("{err:#}")),
                Value::Null,
            );
        }
    }

    pub fn apply_preset(&mut self, id: &str) -> Result<(), MockupError> {
        let Some(preset) = find_preset(id) else {
            return Err(self.record_failure(
                StudioEvent::PresetRejected,
                MockupError::InvalidInput(format!("unknown preset '{id}'")),
            ));
        };
        self.state.prompt = append_snippet(&self.state.prompt, preset.value);
        Ok(())
    }

    pub fn apply_modifier(&mut self, label: &str) -> Result<(), MockupError> {
        let Some(modifier) = find_modifier(label) else {
            return Err(self.record_failure(
                StudioEvent::PresetRejected,
                MockupError::InvalidInput(format!("unknown modifier '{label}'")),
            ));
        };
        self.state.prompt = append_snippet(&self.state.prompt, modifier.value);
        Ok(())
    }

    pub fn history_view(&self, filter: &HistoryFilter) -> Vec<&GeneratedResult> {
        self.state.history.view(filter)
    }

    /// Write the displayed result into `dir` under its download name.
    pub fn download_current(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let Some(current) = self.state.current.as_ref() else {
            bail!("no generated image to download");
        };
        let bytes = current
            .image
            .decode()
            .with_context(|| format!("result {} has undecodable image data", current.id))?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed creating {}", dir.display()))?;
        let path = dir.join(current.download_file_name());
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed writing {}", path.display()))?;
        self.events.record(
            StudioEvent::ResultDownloaded,
            json!({
                "id": current.id,
                "path": path.to_string_lossy(),
            }),
        );
        Ok(path)
    }

    fn persist_history(&self) {
        match persist_with_fallback(&*self.store, self.state.history.entries()) {
            PersistOutcome::Saved(_) => {}
            PersistOutcome::Truncated { kept, reason } => self.events.record_failure(
                StudioEvent::HistoryTruncated,
                &MockupError::Storage(reason),
                json!({"kept": kept}),
            ),
            PersistOutcome::Failed(reason) => self.events.record_failure(
                StudioEvent::HistorySaveFailed,
                &MockupError::Storage(reason),
                Value::Null,
            ),
        }
    }

    fn record_failure(&mut self, event: StudioEvent, err: MockupError) -> MockupError {
        self.state.error = Some(err.to_string());
        self.events.record_failure(event, &err, Value::Null);
        err
    }
}

fn unknown_entry(id: &str) -> MockupError {
    MockupError::InvalidInput(format!("no history entry with id '{id}'"))
}

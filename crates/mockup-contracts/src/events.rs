use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::MockupError;

/// Everything the studio writes to `events.jsonl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioEvent {
    SessionStarted,
    GenerationDispatched,
    GenerationSucceeded,
    GenerationFailed,
    AnalysisDispatched,
    AnalysisFailed,
    CredentialSelectionOpened,
    CredentialCheckFailed,
    ReferenceAttached,
    ReferenceRejected,
    HistoryLoadFailed,
    HistoryLookupFailed,
    HistoryTruncated,
    HistorySaveFailed,
    HistoryClearFailed,
    PresetRejected,
    ResultDownloaded,
}

impl StudioEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::GenerationDispatched => "generation_dispatched",
            Self::GenerationSucceeded => "generation_succeeded",
            Self::GenerationFailed => "generation_failed",
            Self::AnalysisDispatched => "analysis_dispatched",
            Self::AnalysisFailed => "analysis_failed",
            Self::CredentialSelectionOpened => "credential_selection_opened",
            Self::CredentialCheckFailed => "credential_check_failed",
            Self::ReferenceAttached => "reference_attached",
            Self::ReferenceRejected => "reference_rejected",
            Self::HistoryLoadFailed => "history_load_failed",
            Self::HistoryLookupFailed => "history_lookup_failed",
            Self::HistoryTruncated => "history_truncated",
            Self::HistorySaveFailed => "history_save_failed",
            Self::HistoryClearFailed => "history_clear_failed",
            Self::PresetRejected => "preset_rejected",
            Self::ResultDownloaded => "result_downloaded",
        }
    }
}

/// One studio session's view of the shared JSONL event log.
///
/// Each line starts with `type`, `session_id` and `ts`; detail fields follow
/// and may not replace those three.
#[derive(Debug, Clone)]
pub struct SessionLog {
    shared: Arc<SessionLogShared>,
}

#[derive(Debug)]
struct SessionLogShared {
    path: PathBuf,
    session_id: String,
    append_lock: Mutex<()>,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(SessionLogShared {
                path: path.into(),
                session_id: session_id.into(),
                append_lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    /// Append one line. An object `detail` is flattened into the line, any
    /// other non-null value is kept under `detail`.
    pub fn append(&self, event: StudioEvent, detail: Value) -> anyhow::Result<Value> {
        let mut line = Map::new();
        line.insert("type".to_string(), Value::from(event.name()));
        line.insert("session_id".to_string(), Value::from(self.session_id()));
        line.insert(
            "ts".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        match detail {
            Value::Object(fields) => {
                for (key, value) in fields {
                    line.entry(key).or_insert(value);
                }
            }
            Value::Null => {}
            other => {
                line.insert("detail".to_string(), other);
            }
        }
        let line = Value::Object(line);

        if let Some(parent) = self.shared.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string(&line)?;
        let _guard = self
            .shared
            .append_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("session log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.shared.path)?;
        writeln!(file, "{encoded}")?;
        Ok(line)
    }

    /// [`SessionLog::append`] for callers that must not fail on logging.
    pub fn record(&self, event: StudioEvent, detail: Value) {
        let _ = self.append(event, detail);
    }

    /// Records `err` with its `kind` tag and message next to `detail`.
    pub fn record_failure(&self, event: StudioEvent, err: &MockupError, detail: Value) {
        let mut fields = match detail {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.insert("kind".to_string(), Value::from(err.kind()));
        fields.insert("error".to_string(), Value::from(err.to_string()));
        self.record(event, Value::Object(fields));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;
    use serde_json::{json, Value};

    use super::{SessionLog, StudioEvent};
    use crate::error::MockupError;

    fn lines(path: &std::path::Path) -> anyhow::Result<Vec<Value>> {
        fs::read_to_string(path)?
            .lines()
            .map(|line| Ok(serde_json::from_str(line)?))
            .collect()
    }

    #[test]
    fn append_writes_header_then_detail() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let log = SessionLog::new(&path, "session-123");

        let written = log.append(
            StudioEvent::GenerationDispatched,
            json!({"model": "gemini-2.5-flash-image"}),
        )?;

        let rows = lines(&path)?;
        assert_eq!(rows, vec![written]);
        assert_eq!(rows[0]["type"], json!("generation_dispatched"));
        assert_eq!(rows[0]["session_id"], json!("session-123"));
        assert_eq!(rows[0]["model"], json!("gemini-2.5-flash-image"));
        DateTime::parse_from_rfc3339(rows[0]["ts"].as_str().unwrap_or(""))?;
        Ok(())
    }

    #[test]
    fn detail_cannot_override_header_fields() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let log = SessionLog::new(temp.path().join("events.jsonl"), "session-123");

        let written = log.append(
            StudioEvent::SessionStarted,
            json!({"type": "forged", "session_id": "other"}),
        )?;
        assert_eq!(written["type"], json!("session_started"));
        assert_eq!(written["session_id"], json!("session-123"));

        let scalar = log.append(StudioEvent::ResultDownloaded, json!("out.png"))?;
        assert_eq!(scalar["detail"], json!("out.png"));
        Ok(())
    }

    #[test]
    fn record_failure_tags_kind_and_message() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("events.jsonl");
        let log = SessionLog::new(&path, "session-123");

        log.record_failure(
            StudioEvent::HistoryTruncated,
            &MockupError::Storage("quota exceeded".to_string()),
            json!({"kept": 5}),
        );
        log.record(StudioEvent::SessionStarted, Value::Null);

        let rows = lines(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["kind"], json!("storage"));
        assert_eq!(rows[0]["error"], json!("history storage failed: quota exceeded"));
        assert_eq!(rows[0]["kept"], json!(5));
        assert_eq!(rows[1]["type"], json!("session_started"));
        Ok(())
    }

    #[test]
    fn record_swallows_unwritable_path() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file, not a dir")?;
        let log = SessionLog::new(blocker.join("events.jsonl"), "session-123");

        assert!(log.append(StudioEvent::SessionStarted, Value::Null).is_err());
        log.record(StudioEvent::SessionStarted, Value::Null);
        Ok(())
    }
}

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use super::log::{GeneratedResult, HISTORY_CAP};

pub const HISTORY_SLOT: &str = "mockup_history.json";

/// Entries kept when a full write is refused.
pub const DEGRADED_HISTORY_LEN: usize = 5;

/// Where the history log lives between sessions.
pub trait HistoryStore: Send {
    fn load(&self) -> anyhow::Result<Vec<GeneratedResult>>;
    fn save(&self, entries: &[GeneratedResult]) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Single JSON slot on disk.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_SLOT))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> anyhow::Result<Vec<GeneratedResult>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        let entries: Vec<GeneratedResult> = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing {}", self.path.display()))?;
        Ok(entries)
    }

    fn save(&self, entries: &[GeneratedResult]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(entries)?)
            .with_context(|| format!("failed writing {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process slot, for sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<GeneratedResult>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> anyhow::Result<Vec<GeneratedResult>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("history store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, entries: &[GeneratedResult]) -> anyhow::Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("history store lock poisoned"))?;
        *guard = entries.to_vec();
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.save(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(usize),
    /// First write failed; only the most recent entries were kept.
    Truncated { kept: usize, reason: String },
    Failed(String),
}

/// Save up to [`HISTORY_CAP`] entries, retrying once with the
/// [`DEGRADED_HISTORY_LEN`] most recent if the first write fails.
pub fn persist_with_fallback(
    store: &dyn HistoryStore,
    entries: &[GeneratedResult],
) -> PersistOutcome {
    let capped = &entries[..entries.len().min(HISTORY_CAP)];
    let first_err = match store.save(capped) {
        Ok(()) => return PersistOutcome::Saved(capped.len()),
        Err(err) => format!("{err:#}"),
    };
    if capped.len() <= DEGRADED_HISTORY_LEN {
        return PersistOutcome::Failed(first_err);
    }
    let recent = &capped[..DEGRADED_HISTORY_LEN];
    match store.save(recent) {
        Ok(()) => PersistOutcome::Truncated {
            kept: recent.len(),
            reason: first_err,
        },
        Err(err) => PersistOutcome::Failed(format!("{first_err}; retry failed: {err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{
        persist_with_fallback, HistoryStore, JsonFileHistoryStore, MemoryHistoryStore,
        PersistOutcome, HISTORY_SLOT,
    };
    use crate::history::log::{sample_result, GeneratedResult, HistoryLog};
    use crate::media::EncodedImage;
    use crate::models::{ModelTier, QualityTier};

    /// Refuses writes larger than `limit` entries, like a full quota.
    struct QuotaStore {
        limit: usize,
        saved: Mutex<Vec<usize>>,
    }

    impl HistoryStore for QuotaStore {
        fn load(&self) -> anyhow::Result<Vec<GeneratedResult>> {
            Ok(Vec::new())
        }

        fn save(&self, entries: &[GeneratedResult]) -> anyhow::Result<()> {
            if entries.len() > self.limit {
                anyhow::bail!("quota exceeded");
            }
            self.saved
                .lock()
                .map_err(|_| anyhow::anyhow!("poisoned"))?
                .push(entries.len());
            Ok(())
        }

        fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_store_round_trips_full_results() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let store = JsonFileHistoryStore::in_dir(temp.path());
        assert!(store.path().ends_with(HISTORY_SLOT));
        assert!(store.load()?.is_empty());

        let mut entry = sample_result(42, QualityTier::R8k);
        entry.reference_image = Some(EncodedImage::new("image/jpeg", "cmVm"));
        entry.model_tier = ModelTier::Pro;
        store.save(&[entry.clone()])?;

        let loaded = store.load()?;
        assert_eq!(loaded, vec![entry]);

        store.clear()?;
        store.clear()?;
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn json_store_reports_corrupt_slot() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        std::fs::write(temp.path().join(HISTORY_SLOT), "{not json")?;
        let store = JsonFileHistoryStore::in_dir(temp.path());
        assert!(store.load().is_err());
        Ok(())
    }

    #[test]
    fn persist_degrades_to_five_most_recent() -> anyhow::Result<()> {
        let store = QuotaStore {
            limit: 5,
            saved: Mutex::new(Vec::new()),
        };
        let mut log = HistoryLog::new();
        for id in 1..=8 {
            log.push(sample_result(id, QualityTier::Hd));
        }

        let outcome = persist_with_fallback(&store, log.entries());
        assert!(matches!(outcome, PersistOutcome::Truncated { kept: 5, .. }));
        let saved = store.saved.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        assert_eq!(*saved, vec![5]);
        Ok(())
    }

    #[test]
    fn persist_reports_failure_when_retry_is_pointless() {
        let store = QuotaStore {
            limit: 0,
            saved: Mutex::new(Vec::new()),
        };
        let entries = vec![sample_result(1, QualityTier::Hd)];
        assert!(matches!(
            persist_with_fallback(&store, &entries),
            PersistOutcome::Failed(_)
        ));
    }

    #[test]
    fn persist_caps_at_twenty() -> anyhow::Result<()> {
        let store = MemoryHistoryStore::new();
        let entries: Vec<_> = (1..=30).map(|id| sample_result(id, QualityTier::Hd)).collect();
        assert_eq!(persist_with_fallback(&store, &entries), PersistOutcome::Saved(20));
        assert_eq!(store.load()?.len(), 20);
        Ok(())
    }
}

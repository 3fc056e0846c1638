use serde::{Deserialize, Serialize};

use crate::media::EncodedImage;
use crate::models::{ModelTier, QualityTier};

pub const HISTORY_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub id: String,
    pub image: EncodedImage,
    pub source_prompt: String,
    pub quality_tier: QualityTier,
    /// Unix milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub reference_image: Option<EncodedImage>,
    #[serde(default)]
    pub model_tier: ModelTier,
}

impl GeneratedResult {
    /// File name used when saving the image locally.
    pub fn download_file_name(&self) -> String {
        format!("mockup-{}-{}.png", self.id, self.quality_tier.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub quality: Option<QualityTier>,
    pub order: SortOrder,
}

/// Most-recent-first list of results, capped at [`HISTORY_CAP`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<GeneratedResult>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries. Newest first, duplicates by id dropped.
    pub fn from_entries(mut entries: Vec<GeneratedResult>) -> Self {
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut deduped: Vec<GeneratedResult> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !deduped.iter().any(|existing| existing.id == entry.id) {
                deduped.push(entry);
            }
        }
        deduped.truncate(HISTORY_CAP);
        Self { entries: deduped }
    }

    pub fn entries(&self) -> &[GeneratedResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GeneratedResult> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Insert at the front; returns whatever fell off the end.
    pub fn push(&mut self, result: GeneratedResult) -> Vec<GeneratedResult> {
        self.entries.retain(|entry| entry.id != result.id);
        self.entries.insert(0, result);
        if self.entries.len() > HISTORY_CAP {
            return self.entries.split_off(HISTORY_CAP);
        }
        Vec::new()
    }

    pub fn remove(&mut self, id: &str) -> Option<GeneratedResult> {
        let idx = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Time-derived id that is strictly greater than any numeric id already held.
    pub fn next_id(&self, now_millis: i64) -> String {
        let newest = self
            .entries
            .iter()
            .filter_map(|entry| entry.id.parse::<i64>().ok())
            .max();
        match newest {
            Some(newest) if newest >= now_millis => (newest + 1).to_string(),
            _ => now_millis.to_string(),
        }
    }

    pub fn view(&self, filter: &HistoryFilter) -> Vec<&GeneratedResult> {
        let mut rows: Vec<&GeneratedResult> = self
            .entries
            .iter()
            .filter(|entry| filter.quality.map_or(true, |tier| entry.quality_tier == tier))
            .collect();
        match filter.order {
            SortOrder::Newest => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        rows
    }
}

#[cfg(test)]
pub(crate) fn sample_result(id: i64, tier: QualityTier) -> GeneratedResult {
    GeneratedResult {
        id: id.to_string(),
        image: EncodedImage::new("image/png", format!("aW1hZ2Ut{id}")),
        source_prompt: format!("prompt {id}"),
        quality_tier: tier,
        created_at: id,
        reference_image: None,
        model_tier: ModelTier::Flash,
    }
}

#[cfg(test)]
mod tests {
    use super::{sample_result, HistoryFilter, HistoryLog, SortOrder, HISTORY_CAP};
    use crate::models::QualityTier;

    #[test]
    fn twenty_first_entry_evicts_the_oldest() {
        let mut log = HistoryLog::new();
        for id in 1..=20 {
            assert!(log.push(sample_result(id, QualityTier::Hd)).is_empty());
        }
        let evicted = log.push(sample_result(21, QualityTier::Hd));

        assert_eq!(log.len(), HISTORY_CAP);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, "1");
        let ids: Vec<&str> = log.entries().iter().map(|e| e.id.as_str()).collect();
        let expected: Vec<String> = (2..=21).rev().map(|id: i64| id.to_string()).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<&str>>());
    }

    #[test]
    fn from_entries_orders_dedupes_and_caps() {
        let mut entries: Vec<_> = (1..=25).map(|id| sample_result(id, QualityTier::Hd)).collect();
        entries.push(sample_result(25, QualityTier::R4k));
        let log = HistoryLog::from_entries(entries);
        assert_eq!(log.len(), HISTORY_CAP);
        assert_eq!(log.entries()[0].id, "25");
        assert_eq!(log.entries()[HISTORY_CAP - 1].id, "6");
    }

    #[test]
    fn next_id_never_collides() {
        let mut log = HistoryLog::new();
        assert_eq!(log.next_id(1_000), "1000");
        log.push(sample_result(1_000, QualityTier::Hd));
        assert_eq!(log.next_id(1_000), "1001");
        assert_eq!(log.next_id(900), "1001");
        assert_eq!(log.next_id(2_000), "2000");
    }

    #[test]
    fn remove_and_clear() {
        let mut log = HistoryLog::new();
        log.push(sample_result(1, QualityTier::Hd));
        log.push(sample_result(2, QualityTier::Hd));
        assert_eq!(log.remove("1").map(|e| e.id), Some("1".to_string()));
        assert!(log.remove("1").is_none());
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn view_filters_by_tier_and_sorts() {
        let mut log = HistoryLog::new();
        log.push(sample_result(1, QualityTier::R4k));
        log.push(sample_result(2, QualityTier::Hd));
        log.push(sample_result(3, QualityTier::R4k));

        let newest = log.view(&HistoryFilter {
            quality: Some(QualityTier::R4k),
            order: SortOrder::Newest,
        });
        assert_eq!(
            newest.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["3", "1"]
        );

        let oldest = log.view(&HistoryFilter {
            quality: None,
            order: SortOrder::Oldest,
        });
        assert_eq!(
            oldest.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn download_name_uses_id_and_tier() {
        assert_eq!(
            sample_result(1_700_000_000_000, QualityTier::R2k).download_file_name(),
            "mockup-1700000000000-2K.png"
        );
    }
}

use std::path::{Path, PathBuf};

use crate::non_empty_env;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Everything the engine needs from its environment, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    /// `None` leaves timeouts to the HTTP client.
    pub request_timeout_s: Option<f64>,
    pub state_dir: PathBuf,
}

impl StudioConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_s: None,
            state_dir: state_dir.into(),
        }
    }

    /// Reads `GEMINI_API_KEY` / `GOOGLE_API_KEY` / `API_KEY`,
    /// `GEMINI_API_BASE` and `MOCKUP_REQUEST_TIMEOUT`.
    pub fn from_env(state_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(state_dir);
        config.api_key = non_empty_env("GEMINI_API_KEY")
            .or_else(|| non_empty_env("GOOGLE_API_KEY"))
            .or_else(|| non_empty_env("API_KEY"));
        if let Some(base) = non_empty_env("GEMINI_API_BASE") {
            config.api_base = normalize_api_base(&base);
        }
        config.request_timeout_s = non_empty_env("MOCKUP_REQUEST_TIMEOUT")
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0);
        config
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.api_key = Some(key);
        }
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn events_path(&self) -> PathBuf {
        self.state_dir.join("events.jsonl")
    }
}

pub(crate) fn normalize_api_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::{normalize_api_base, StudioConfig, DEFAULT_API_BASE};

    #[test]
    fn new_config_uses_public_endpoint_and_no_timeout() {
        let config = StudioConfig::new("/tmp/state");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.request_timeout_s.is_none());
        assert!(config.events_path().ends_with("events.jsonl"));
    }

    #[test]
    fn explicit_key_overrides_only_when_non_empty() {
        let config = StudioConfig::new("/tmp/state").with_api_key(Some("  k-1 ".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("k-1"));
        let kept = config.with_api_key(Some("   ".to_string()));
        assert_eq!(kept.api_key.as_deref(), Some("k-1"));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        assert_eq!(
            normalize_api_base(" https://proxy.test/v1beta/ "),
            "https://proxy.test/v1beta"
        );
    }
}

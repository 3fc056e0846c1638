//! Network-facing half of the mockup studio: backends, the request
//! dispatcher, and the session controller that owns the history log.

pub mod backend;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod studio;

use std::env;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Response as HttpResponse;
use serde_json::Value;

pub use backend::{DryrunBackend, GeminiBackend, GenerationBackend};
pub use config::StudioConfig;
pub use credentials::{ConfiguredKeySelector, CredentialSelector};
pub use dispatcher::RequestDispatcher;
pub use studio::{GenerationPhase, MockupStudio, StudioState};

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

/// Every distinct message in the chain, outermost first.
pub(crate) fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() || parts.last().is_some_and(|existing| existing == trimmed) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

/// Cuts `value` to `max_chars` characters and marks the cut with `…`.
pub fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}


#[cfg(test)]
mod tests {
    use super::{error_chain_text, truncate_text};

    #[test]
    fn error_chain_text_keeps_nested_contexts() {
        let err = anyhow::anyhow!("socket closed")
            .context("Gemini request failed (https://example.test)")
            .context("generation dispatch failed");
        let rendered = error_chain_text(&err, 400);
        assert!(rendered.starts_with("generation dispatch failed"));
        assert!(rendered.contains("Gemini request failed"));
        assert!(rendered.ends_with("socket closed"));
    }

    #[test]
    fn truncate_text_marks_cut_point() {
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}

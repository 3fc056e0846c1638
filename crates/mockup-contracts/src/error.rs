use thiserror::Error;

/// Failures surfaced by the mockup request pipeline.
///
/// `Storage` and `CredentialCheck` are recovered where they occur and only
/// reach callers that inspect the event log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockupError {
    #[error("{0}")]
    Validation(String),
    #[error("reference image is too large ({size} bytes); the limit is {limit} bytes")]
    OversizeFile { size: u64, limit: u64 },
    #[error("AI Response (No Image): {0}")]
    ModelRefusal(String),
    #[error("No image data found in response. The model may have blocked the request.")]
    NoImageData,
    #[error("{0}")]
    Transport(String),
    #[error("history storage failed: {0}")]
    Storage(String),
    #[error("credential check failed: {0}")]
    CredentialCheck(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl MockupError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::OversizeFile { .. } => "oversize_file",
            Self::ModelRefusal(_) => "model_refusal",
            Self::NoImageData => "no_image_data",
            Self::Transport(_) => "transport",
            Self::Storage(_) => "storage",
            Self::CredentialCheck(_) => "credential_check",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MockupError;

    #[test]
    fn refusal_message_carries_model_text() {
        let err = MockupError::ModelRefusal("sorry, I can't".to_string());
        assert_eq!(err.to_string(), "AI Response (No Image): sorry, I can't");
        assert_eq!(err.kind(), "model_refusal");
    }

    #[test]
    fn oversize_message_names_both_sizes() {
        let err = MockupError::OversizeFile {
            size: 5_242_881,
            limit: 5_242_880,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("5242881"));
        assert!(rendered.contains("5242880"));
    }
}

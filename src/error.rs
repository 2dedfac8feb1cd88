use serde::Serialize;
use thiserror::Error;

/// Outcomes of a decision that did not yield an action.
///
/// These never abort a request; they are turned into an [`ErrorPayload`]
/// so the caller can see exactly what the model said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecideError {
    #[error("{message}")]
    InvalidAction {
        message: String,
        raw_response: String,
    },
    #[error("Failed to parse LLM response as JSON")]
    MalformedResponse { raw_response: String },
    #[error("{0}")]
    UpstreamFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl DecideError {
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            DecideError::InvalidAction { raw_response, .. }
            | DecideError::MalformedResponse { raw_response } => Some(raw_response),
            DecideError::UpstreamFailure(_) => None,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            raw_response: self.raw_response().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("session {session_id} has no step {index}")]
    StepNotFound { session_id: String, index: usize },
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("no content in model response: {0}")]
    NoContent(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid signing key")]
    InvalidKey,
    #[error("system clock is before the unix epoch")]
    Clock,
    #[error("failed to encode token claims: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_raw_text_for_parse_errors() {
        let err = DecideError::MalformedResponse {
            raw_response: "not json".into(),
        };
        assert_eq!(
            err.payload(),
            ErrorPayload {
                error: "Failed to parse LLM response as JSON".into(),
                raw_response: Some("not json".into()),
            }
        );
    }

    #[test]
    fn upstream_payload_omits_raw_response() {
        let err = DecideError::UpstreamFailure("model call timed out".into());
        let body = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "model call timed out"}));
    }
}

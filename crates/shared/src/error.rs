use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EMPTY_PROMPT_MESSAGE: &str =
    "Quack! Please describe your duck before we start hatching.";
pub const PROMPT_TOO_LONG_MESSAGE: &str =
    "Quack! That's too much duck description. Keep it under 1024 characters!";
pub const TIMEOUT_MESSAGE: &str =
    "Quack! Your duck is taking too long to hatch. Please try again.";
pub const TRANSPORT_MESSAGE: &str =
    "Quack! The pond is a bit choppy right now. Please waddle back and try again.";
pub const SERVER_REJECTED_MESSAGE: &str =
    "Quack! Something ruffled my feathers. Please try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Quack! I could not hatch that duck. Please try a new description.";

/// Vocabulary a display error must contain at least one of (case-insensitive).
pub const DUCK_TOKENS: [&str; 6] = ["quack", "duck", "waddle", "pond", "hatch", "feathers"];

pub fn is_duck_themed(text: &str) -> bool {
    let lower = text.to_lowercase();
    DUCK_TOKENS.iter().any(|token| lower.contains(token))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationRejected,
    Timeout,
    Transport,
    ServerRejected,
    MalformedResponse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationRejected => "validation_rejected",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::ServerRejected => "server_rejected",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("prompt is {length} characters, limit is {max}")]
    PromptTooLong { length: usize, max: usize },
}

/// Everything that can end a generation attempt without an image.
///
/// `Display` is the technical description meant for logs. Anything shown to a
/// user goes through [`GenerationError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("validation rejected: {0}")]
    ValidationRejected(#[from] ValidationFailure),
    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },
    #[error("transport failure: {detail}")]
    Transport { detail: String },
    #[error("server rejected request with status {status}")]
    ServerRejected {
        status: u16,
        server_message: Option<String>,
    },
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },
}

impl GenerationError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::ValidationRejected(_) => ErrorKind::ValidationRejected,
            GenerationError::Timeout { .. } => ErrorKind::Timeout,
            GenerationError::Transport { .. } => ErrorKind::Transport,
            GenerationError::ServerRejected { .. } => ErrorKind::ServerRejected,
            GenerationError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// Themed, non-empty text for the display layer. Raw transport detail never leaks here.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::ValidationRejected(ValidationFailure::EmptyPrompt) => {
                EMPTY_PROMPT_MESSAGE.to_string()
            }
            GenerationError::ValidationRejected(ValidationFailure::PromptTooLong { .. }) => {
                PROMPT_TOO_LONG_MESSAGE.to_string()
            }
            GenerationError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            GenerationError::Transport { .. } => TRANSPORT_MESSAGE.to_string(),
            GenerationError::ServerRejected {
                server_message: Some(text),
                ..
            } if !text.trim().is_empty() => {
                let text = text.trim();
                if is_duck_themed(text) {
                    text.to_string()
                } else {
                    format!("Quack! {text}")
                }
            }
            GenerationError::ServerRejected { .. } => SERVER_REJECTED_MESSAGE.to_string(),
            GenerationError::MalformedResponse { .. } => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }
}

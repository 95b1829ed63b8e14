use serde::{Deserialize, Serialize};

use crate::{
    domain::{GenerationResult, DEFAULT_SUCCESS_MESSAGE},
    error::GenerationError,
};

pub const GENERATE_PATH: &str = "/api/duck/generate";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    pub description: String,
}

/// Body of a 2xx reply from the generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_fallback: Option<bool>,
    #[serde(default)]
    pub prompt_used: Option<String>,
}

impl TryFrom<GenerateResponse> for GenerationResult {
    type Error = GenerationError;

    fn try_from(value: GenerateResponse) -> Result<Self, Self::Error> {
        if !value.success {
            return Err(GenerationError::malformed("response reported success=false"));
        }
        if value.image.trim().is_empty() {
            return Err(GenerationError::malformed("response is missing an image"));
        }

        let message = value
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());

        Ok(GenerationResult {
            image: value.image,
            message,
            is_fallback: value.is_fallback.unwrap_or(false),
            prompt_used: value.prompt_used,
        })
    }
}

/// Best-effort body of a non-2xx reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// `error` wins over `message`; blank strings count as absent.
    pub fn preferred_text(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_response_tolerates_missing_optional_fields() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"success":true,"image":"data:image/png;base64,x"}"#)
                .expect("decode");
        assert!(body.success);
        assert_eq!(body.message, None);
        assert_eq!(body.is_fallback, None);
        assert_eq!(body.prompt_used, None);
    }

    #[test]
    fn success_payload_becomes_result_with_default_message() {
        let result = GenerationResult::try_from(GenerateResponse {
            success: true,
            image: "data:image/png;base64,duck".to_string(),
            message: None,
            is_fallback: Some(true),
            prompt_used: Some("a duck, duck-themed".to_string()),
        })
        .expect("result");
        assert_eq!(result.message, DEFAULT_SUCCESS_MESSAGE);
        assert!(result.is_fallback);
        assert_eq!(result.prompt_used.as_deref(), Some("a duck, duck-themed"));
    }

    #[test]
    fn unsuccessful_or_imageless_payload_is_malformed() {
        let failed = GenerationResult::try_from(GenerateResponse {
            success: false,
            image: "data:image/png;base64,duck".to_string(),
            message: None,
            is_fallback: None,
            prompt_used: None,
        });
        assert!(matches!(failed, Err(GenerationError::MalformedResponse { .. })));

        let imageless = GenerationResult::try_from(GenerateResponse {
            success: true,
            image: String::new(),
            message: Some("Quack!".to_string()),
            is_fallback: None,
            prompt_used: None,
        });
        assert!(matches!(imageless, Err(GenerationError::MalformedResponse { .. })));
    }

    #[test]
    fn error_body_prefers_error_over_message() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"Quack! Keep it under 1024 characters!","message":"too long"}"#,
        )
        .expect("decode");
        assert_eq!(
            body.preferred_text(),
            Some("Quack! Keep it under 1024 characters!")
        );
    }

    #[test]
    fn error_body_falls_back_to_message_when_error_is_blank() {
        let body = ErrorBody {
            error: Some("   ".to_string()),
            message: Some("pond drained".to_string()),
        };
        assert_eq!(body.preferred_text(), Some("pond drained"));
        assert_eq!(ErrorBody::default().preferred_text(), None);
    }
}

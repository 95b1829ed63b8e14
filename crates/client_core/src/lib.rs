use std::{future::Future, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use shared::{
    domain::ImageSource,
    error::GenerationError,
    protocol::{ErrorBody, GenerateRequest, GenerateResponse, GENERATE_PATH, HEALTH_PATH},
};
use tracing::{debug, info, warn};

pub mod config;
pub mod controller;

pub use config::{load_settings, ConfigError, Settings};
pub use controller::{GenerationController, PendingGeneration, RequestState, Submission};
pub use shared::domain::{GenerationResult, RequestId};

pub const DEFAULT_AGENT_ENDPOINT: &str = "http://localhost:8081";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One remote round trip per call; retrying is the caller's decision.
#[async_trait]
pub trait DuckGenerator: Send + Sync {
    async fn generate(&self, description: &str) -> Result<GenerationResult, GenerationError>;
    async fn check_health(&self) -> Result<(), GenerationError>;
}

#[derive(Debug, Clone)]
pub struct HttpDuckClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpDuckClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let endpoint = settings.validated_endpoint()?;
        Ok(Self::new(endpoint).with_timeout(settings.request_timeout()?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Resolves a result's `image` into raw bytes: data URIs are decoded in place,
    /// http(s) URLs are fetched under the same deadline as generation.
    pub async fn load_image_bytes(&self, image: &str) -> Result<Vec<u8>, GenerationError> {
        match ImageSource::parse(image) {
            Some(ImageSource::DataUri { base64_payload, .. }) => decode_base64_image(base64_payload),
            Some(ImageSource::Url(url)) => {
                with_deadline(self.timeout, self.fetch_bytes(url.to_string())).await
            }
            None => Err(GenerationError::malformed(
                "image is neither a base64 data URI nor an http(s) URL",
            )),
        }
    }

    async fn fetch_bytes(&self, url: String) -> Result<Vec<u8>, GenerationError> {
        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::ServerRejected {
                status: status.as_u16(),
                server_message: None,
            });
        }
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn post_generate(&self, description: &str) -> Result<GenerationResult, GenerationError> {
        let response = self
            .http
            .post(self.endpoint(GENERATE_PATH))
            .json(&GenerateRequest {
                description: description.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let server_message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.preferred_text().map(str::to_string));
            return Err(GenerationError::ServerRejected {
                status: status.as_u16(),
                server_message,
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let payload: GenerateResponse = serde_json::from_slice(&body)
            .map_err(|e| GenerationError::malformed(format!("invalid generate payload: {e}")))?;
        GenerationResult::try_from(payload)
    }

    async fn get_health(&self) -> Result<(), GenerationError> {
        let response = self
            .http
            .get(self.endpoint(HEALTH_PATH))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GenerationError::ServerRejected {
                status: status.as_u16(),
                server_message: None,
            })
        }
    }
}

#[async_trait]
impl DuckGenerator for HttpDuckClient {
    async fn generate(&self, description: &str) -> Result<GenerationResult, GenerationError> {
        debug!(
            base_url = %self.base_url,
            chars = description.chars().count(),
            "requesting duck generation"
        );

        let outcome = with_deadline(self.timeout, self.post_generate(description)).await;
        match &outcome {
            Ok(result) => info!(is_fallback = result.is_fallback, "duck generation succeeded"),
            Err(err) => warn!(kind = err.kind().as_str(), error = %err, "duck generation failed"),
        }
        outcome
    }

    async fn check_health(&self) -> Result<(), GenerationError> {
        let outcome = with_deadline(self.timeout, self.get_health()).await;
        if let Err(err) = &outcome {
            warn!(base_url = %self.base_url, error = %err, "duck service health check failed");
        }
        outcome
    }
}

/// Runs `request` under `timeout`. The timer and the request future are owned by the
/// `Timeout` future, so every exit path drops both and an elapsed deadline aborts the
/// connection instead of leaving it running.
async fn with_deadline<T, F>(timeout: Duration, request: F) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, GenerationError>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(GenerationError::Timeout { after: timeout }),
    }
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    GenerationError::transport(err.to_string())
}

fn decode_base64_image(payload: &str) -> Result<Vec<u8>, GenerationError> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| GenerationError::malformed(format!("image payload is not valid base64: {e}")))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

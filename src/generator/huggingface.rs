use async_trait::async_trait;
use serde::Serialize;

use super::{GenerateError, GeneratedImage, ImageGenerator};

/// Calls a Hugging Face inference endpoint that returns image bytes.
pub struct HuggingFaceGenerator {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl HuggingFaceGenerator {
    pub fn new(api_key: String, url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            url,
        }
    }

    /// Pull a message out of an error response, falling back to the status.
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                format!(
                    "Failed to generate emoji: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            })
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerateError> {
        let body = ApiRequest {
            inputs: prompt,
            options: ApiOptions {
                wait_for_model: true,
            },
        };

        let resp = self
            .http
            .post(&self.url)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %text, "inference endpoint error");
            return Err(GenerateError::Api(Self::error_message(status, &text)));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty());

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if bytes.is_empty() {
            return Err(GenerateError::EmptyImage);
        }

        tracing::debug!(bytes = bytes.len(), ?content_type, "image generated");
        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    fn model(&self) -> &str {
        self.url.rsplit("/models/").next().unwrap_or(&self.url)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
    options: ApiOptions,
}

#[derive(Serialize)]
struct ApiOptions {
    wait_for_model: bool,
}

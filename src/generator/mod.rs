pub mod huggingface;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Raw image bytes as returned by the inference endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    /// MIME type reported by the endpoint, if any.
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The request never got an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with an error; carries the message to show.
    #[error("{0}")]
    Api(String),
    #[error("Generated image is empty or invalid")]
    EmptyImage,
}

/// Something that turns a prompt into an image. Could be a hosted model or a
/// test script.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerateError>;

    /// Human-readable name of the model, for banners and `/whoami`.
    fn model(&self) -> &str;
}

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GenerateError, GeneratedImage, ImageGenerator};

/// A scripted generator for tests. Returns pre-defined results in order and
/// records the prompts it was given.
pub struct MockGenerator {
    results: Vec<Result<GeneratedImage, GenerateError>>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(results: Vec<Result<GeneratedImage, GenerateError>>) -> Self {
        Self {
            results,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator that always succeeds with a tiny PNG-labelled payload.
    pub fn png(times: usize) -> Self {
        let image = GeneratedImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            content_type: Some("image/png".to_string()),
        };
        Self::new(vec![Ok(image); times])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.results.get(i).cloned().unwrap_or_else(|| {
            Err(GenerateError::Api(format!(
                "MockGenerator: no more results (called {} times)",
                i + 1
            )))
        })
    }

    fn model(&self) -> &str {
        "mock"
    }
}

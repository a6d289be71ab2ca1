//! Prompt → inference endpoint → document store.

pub mod data_url;
pub mod download;
pub mod gallery;

use chrono::Utc;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AuthClient, AuthError};
use crate::events::{Event, EventBus};
use crate::generator::{GenerateError, ImageGenerator};
use crate::store::{EmojiRecord, Store};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmojiError {
    #[error("HuggingFace API key is not configured")]
    NotConfigured,
    #[error("Please sign in to generate emojis")]
    NotSignedIn,
    #[error("Please provide a description for your emoji")]
    EmptyPrompt,
    /// Message from the inference endpoint.
    #[error("{0}")]
    Generation(String),
    #[error("Network error. Please check your internet connection.")]
    Network,
    #[error("Failed to save emoji. Please try again.")]
    Save,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<GenerateError> for EmojiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Network(_) => Self::Network,
            other => Self::Generation(other.to_string()),
        }
    }
}

/// Who can see a generated emoji.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Private => "private",
        })
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown visibility: {other} (expected public or private)")),
        }
    }
}

pub struct EmojiService {
    generator: Option<Arc<dyn ImageGenerator>>,
    store: Arc<dyn Store>,
    auth: Arc<AuthClient>,
    events: Arc<EventBus>,
}

impl EmojiService {
    /// `generator` is `None` when no inference API key is configured.
    pub fn new(
        generator: Option<Arc<dyn ImageGenerator>>,
        store: Arc<dyn Store>,
        auth: Arc<AuthClient>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            generator,
            store,
            auth,
            events,
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model())
    }

    /// Generate an emoji for the signed-in user and persist it.
    ///
    /// The returned record's `image_url` is the image as a `data:` URL.
    pub async fn generate_emoji(
        &self,
        prompt: &str,
        visibility: Visibility,
    ) -> Result<EmojiRecord, EmojiError> {
        let generator = self.generator.as_ref().ok_or(EmojiError::NotConfigured)?;
        let user = self.auth.current_user().await?.ok_or(EmojiError::NotSignedIn)?;
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(EmojiError::EmptyPrompt);
        }

        // the endpoint gets the prompt as typed; the record keeps it trimmed
        let image = generator.generate(prompt).await.map_err(|e| {
            tracing::error!(error = %e, "error generating emoji");
            EmojiError::from(e)
        })?;

        let record = EmojiRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.uid,
            prompt: trimmed.to_string(),
            image_url: data_url::encode(image.content_type.as_deref(), &image.bytes),
            created_at: Utc::now(),
            is_public: visibility.is_public(),
        };

        self.store.add_emoji(&record).await.map_err(|e| {
            tracing::error!(error = %e, "error saving emoji");
            EmojiError::Save
        })?;

        tracing::info!(id = %record.id, %visibility, "emoji created");
        self.events.emit(Event::EmojiCreated {
            id: record.id.clone(),
        });
        Ok(record)
    }
}

//! Wiring: settings, the shared database, and the services built on it.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::auth::firebase::FirebaseIdentity;
use crate::auth::oauth::GoogleOAuth;
use crate::auth::{AuthClient, IdentityProvider, SessionStore};
use crate::config::{Config, Overrides, Settings};
use crate::emoji::EmojiService;
use crate::emoji::gallery::Gallery;
use crate::events::EventBus;
use crate::generator::ImageGenerator;
use crate::generator::huggingface::HuggingFaceGenerator;
use crate::profile::ProfileService;
use crate::store::Store;
use crate::store::sqlite::SqliteStore;

const EVENT_CAPACITY: usize = 64;

/// Everything a command needs, built once per process.
pub struct App {
    pub settings: Settings,
    pub db_path: String,
    pub events: Arc<EventBus>,
    pub auth: Arc<AuthClient>,
    /// `None` until a Google client id is configured.
    pub google: Option<GoogleOAuth>,
    pub emojis: EmojiService,
    pub gallery: Gallery,
    pub profiles: ProfileService,
    pub http: reqwest::Client,
}

/// Collaborators that tests swap for mocks.
pub struct Parts {
    pub settings: Settings,
    pub db_path: String,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionStore,
    pub generator: Option<Arc<dyn ImageGenerator>>,
}

impl App {
    /// Open the database at `db_path` and build the production services.
    pub fn open(db_path: &str, overrides: &Overrides) -> Result<Self> {
        let config = Config::open(db_path).context("failed to open config")?;
        let settings = Settings::resolve(&config, overrides)?;
        tracing::debug!(db = db_path, model = %settings.model_url, "settings resolved");

        let store = Arc::new(SqliteStore::new(db_path)?);
        let sessions = SessionStore::open(db_path)?;
        let identity = Arc::new(FirebaseIdentity::from_settings(&settings));
        let generator = settings.huggingface_api_key.clone().map(|key| {
            Arc::new(HuggingFaceGenerator::new(key, settings.model_url.clone()))
                as Arc<dyn ImageGenerator>
        });
        if generator.is_none() {
            tracing::warn!("no inference API key configured; generation disabled");
        }

        Ok(Self::from_parts(Parts {
            settings,
            db_path: db_path.to_string(),
            identity,
            store,
            sessions,
            generator,
        }))
    }

    pub fn from_parts(parts: Parts) -> Self {
        let events = Arc::new(EventBus::new(EVENT_CAPACITY));
        let auth = Arc::new(AuthClient::new(
            parts.identity,
            Arc::clone(&parts.store),
            parts.sessions,
            Arc::clone(&events),
        ));
        let google = GoogleOAuth::from_settings(&parts.settings);

        Self {
            emojis: EmojiService::new(
                parts.generator,
                Arc::clone(&parts.store),
                Arc::clone(&auth),
                Arc::clone(&events),
            ),
            gallery: Gallery::new(Arc::clone(&parts.store)),
            profiles: ProfileService::new(parts.store, Arc::clone(&auth)),
            settings: parts.settings,
            db_path: parts.db_path,
            events,
            auth,
            google,
            http: reqwest::Client::new(),
        }
    }

    /// Short description of the database for the banner.
    pub fn db_label(&self) -> &str {
        if self.db_path == ":memory:" {
            "ephemeral"
        } else {
            &self.db_path
        }
    }
}

//! Sign-up, sign-in and sign-out against the identity provider.
//!
//! [`AuthClient`] owns the local session mirror and broadcasts every auth
//! state change on the [`EventBus`]. The provider itself sits behind
//! [`IdentityProvider`].

pub mod error;
pub mod firebase;
pub mod identity;
pub mod mock;
pub mod oauth;
pub mod storage;

pub use error::AuthError;
pub use identity::{IdentityProvider, ProfileUpdate, ProviderSession};
pub use storage::{Session, SessionStore};

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::events::{Event, EventBus};
use crate::store::{Store, UserPatch};

/// The signed-in user as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl AuthUser {
    /// Best name to greet the user with.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

pub struct AuthClient {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn Store>,
    sessions: SessionStore,
    events: Arc<EventBus>,
}

impl AuthClient {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn Store>,
        sessions: SessionStore,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            identity,
            store,
            sessions,
            events,
        }
    }

    /// Create an account, name it, and write its profile document.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthUser, AuthError> {
        validate_sign_up(email, password, name)?;

        let result = async {
            let mut provider = self.identity.sign_up(email, password).await?;
            self.identity
                .update_profile(
                    &provider.id_token,
                    &ProfileUpdate {
                        display_name: Some(name.to_string()),
                        photo_url: None,
                    },
                )
                .await?;
            provider.display_name = Some(name.to_string());
            self.create_user_profile(&provider, Some(name)).await?;
            self.begin_session(&provider)
        }
        .await;

        result.inspect_err(|e| tracing::error!(error = ?e, "sign up failed"))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Please enter both email and password.".to_string(),
            ));
        }

        let result = async {
            let provider = self.identity.sign_in(email, password).await?;
            self.update_last_login(&provider.uid).await;
            self.begin_session(&provider)
        }
        .await;

        result.inspect_err(|e| tracing::error!(error = ?e, "sign in failed"))
    }

    /// Finish a Google sign-in with the ID token from the OAuth exchange.
    pub async fn sign_in_with_google(&self, google_id_token: &str) -> Result<AuthUser, AuthError> {
        let result = async {
            let provider = self.identity.sign_in_with_google(google_id_token).await?;
            let existing = self
                .store
                .get_user(&provider.uid)
                .await
                .map_err(|e| AuthError::Unexpected(format!("{e:#}")))?;
            if existing.is_none() {
                self.create_user_profile(&provider, None).await?;
            } else {
                self.update_last_login(&provider.uid).await;
            }
            self.begin_session(&provider)
        }
        .await;

        result.inspect_err(|e| tracing::error!(error = ?e, "google sign in failed"))
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.sessions.clear().map_err(|e| {
            tracing::error!(error = %e, "sign out failed");
            AuthError::Unexpected(format!("{e:#}"))
        })?;
        self.events.emit(Event::AuthStateChanged { user: None });
        Ok(())
    }

    /// Subscribe to sign-in / sign-out notifications.
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// The signed-in user, revalidating the session with the provider when
    /// its tokens or its mirror have expired.
    pub async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.current_session().await?.map(|s| s.user()))
    }

    /// A valid ID token for the signed-in user.
    pub async fn id_token(&self) -> Result<String, AuthError> {
        self.current_session()
            .await?
            .map(|s| s.id_token)
            .ok_or(AuthError::NotSignedIn)
    }

    /// Push display name / photo changes to the provider and the local mirror.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AuthError> {
        let Some(mut session) = self.current_session().await? else {
            return Err(AuthError::NotSignedIn);
        };
        self.identity
            .update_profile(&session.id_token, update)
            .await?;
        if let Some(name) = &update.display_name {
            session.display_name = Some(name.clone());
        }
        if let Some(photo) = &update.photo_url {
            session.photo_url = Some(photo.clone());
        }
        self.persist(&session)
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let session = self
            .sessions
            .get()
            .map_err(|e| AuthError::Unexpected(format!("{e:#}")))?;
        let Some(session) = session else {
            return Ok(None);
        };
        if !session.is_expired() && !session.is_mirror_stale() {
            return Ok(Some(session));
        }

        tracing::debug!(uid = %session.uid, "refreshing session");
        match self.identity.refresh(&session.refresh_token).await {
            Ok(tokens) => {
                let session = session.refreshed(tokens);
                self.persist(&session)?;
                Ok(Some(session))
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                tracing::warn!(error = ?e, "session revoked, signing out");
                self.sign_out().await?;
                Ok(None)
            }
        }
    }

    fn begin_session(&self, provider: &ProviderSession) -> Result<AuthUser, AuthError> {
        let session = Session::from_provider(provider);
        self.persist(&session)?;
        let user = session.user();
        tracing::info!(uid = %user.uid, "signed in");
        self.events.emit(Event::AuthStateChanged {
            user: Some(user.clone()),
        });
        Ok(user)
    }

    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        self.sessions
            .set(session)
            .map_err(|e| AuthError::Unexpected(format!("failed to save session: {e:#}")))
    }

    async fn create_user_profile(
        &self,
        provider: &ProviderSession,
        name: Option<&str>,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let name = name
            .map(str::to_string)
            .or_else(|| provider.display_name.clone())
            .unwrap_or_else(|| "User".to_string());
        let patch = UserPatch {
            email: provider.email.clone(),
            name: Some(name),
            photo_url: provider.photo_url.clone(),
            created_at: Some(now),
            last_login: Some(now),
            ..UserPatch::default()
        };
        self.store
            .merge_user(&provider.uid, &patch)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "error creating user profile");
                AuthError::Unexpected(format!("{e:#}"))
            })
    }

    async fn update_last_login(&self, uid: &str) {
        let patch = UserPatch {
            last_login: Some(Utc::now()),
            ..UserPatch::default()
        };
        if let Err(e) = self.store.merge_user(uid, &patch).await {
            tracing::error!(error = %e, uid, "error updating last login");
        }
    }
}

fn validate_sign_up(email: &str, password: &str, name: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() || name.is_empty() {
        return Err(AuthError::Validation(
            "Please fill in all required fields.".to_string(),
        ));
    }
    if password.chars().count() < 6 {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters long.".to_string(),
        ));
    }
    if name.chars().count() < 2 {
        return Err(AuthError::Validation(
            "Name must be at least 2 characters long.".to_string(),
        ));
    }
    Ok(())
}

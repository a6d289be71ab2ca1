//! Per-user profile documents and profile pictures.

pub mod resize;

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthClient, AuthError, AuthUser, ProfileUpdate};
use crate::consts::MAX_UPLOAD_BYTES;
use crate::store::{Store, UserDoc, UserPatch};

pub const BIO_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(String),
    #[error("File size must be less than 5MB")]
    FileTooLarge,
    #[error("File must be an image")]
    NotAnImage,
    #[error("Failed to load image")]
    LoadImage,
    #[error("Failed to fetch user profile")]
    Fetch,
    #[error("Failed to update profile")]
    Update,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Editable profile fields. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    /// Ignored: pictures go through [`ProfileService::update_profile_picture`].
    pub photo_url: Option<String>,
    /// Ignored, like `photo_url`.
    pub thumbnail_url: Option<String>,
}

impl ProfileChanges {
    /// Set one field by name, as typed at the prompt.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), ProfileError> {
        let value = Some(value.trim().to_string());
        match field {
            "name" => self.name = value,
            "city" => self.city = value,
            "country" => self.country = value,
            "bio" => self.bio = value,
            other => {
                return Err(ProfileError::Validation(format!(
                    "Unknown profile field: {other} (expected name, city, country or bio)"
                )));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let too_short = |v: &Option<String>| v.as_ref().is_some_and(|s| s.chars().count() < 2);
        if too_short(&self.name) {
            return Err(ProfileError::Validation(
                "Name must be at least 2 characters".to_string(),
            ));
        }
        if too_short(&self.city) {
            return Err(ProfileError::Validation(
                "City must be at least 2 characters".to_string(),
            ));
        }
        if too_short(&self.country) {
            return Err(ProfileError::Validation(
                "Country must be at least 2 characters".to_string(),
            ));
        }
        if self
            .bio
            .as_ref()
            .is_some_and(|b| b.chars().count() > BIO_MAX_CHARS)
        {
            return Err(ProfileError::Validation(
                "Bio must be less than 500 characters".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct ProfileService {
    store: Arc<dyn Store>,
    auth: Arc<AuthClient>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, auth: Arc<AuthClient>) -> Self {
        Self { store, auth }
    }

    /// Read a profile, creating a default one from the signed-in user when
    /// the document does not exist yet.
    pub async fn get_user_profile(&self, uid: &str) -> Result<UserDoc, ProfileError> {
        let existing = self.store.get_user(uid).await.map_err(|e| {
            tracing::error!(error = %e, uid, "error fetching user profile");
            ProfileError::Fetch
        })?;
        if let Some(doc) = existing {
            return Ok(doc);
        }

        let user = self.signed_in_as(uid).await;
        let now = Utc::now();
        let doc = UserDoc {
            name: Some(user.as_ref().and_then(|u| u.display_name.clone()).unwrap_or_default()),
            email: Some(user.as_ref().and_then(|u| u.email.clone()).unwrap_or_default()),
            photo_url: Some(String::new()),
            thumbnail_url: Some(user.and_then(|u| u.photo_url).unwrap_or_default()),
            created_at: Some(now),
            updated_at: Some(now),
            ..UserDoc::new(uid)
        };
        self.store.set_user(&doc).await.map_err(|e| {
            tracing::error!(error = %e, uid, "error creating default profile");
            ProfileError::Fetch
        })?;
        tracing::debug!(uid, "default profile created");
        Ok(doc)
    }

    /// Write text fields of an existing profile. Picture fields are dropped.
    pub async fn update_user_profile(
        &self,
        uid: &str,
        changes: &ProfileChanges,
    ) -> Result<(), ProfileError> {
        changes.validate()?;

        let patch = UserPatch {
            name: changes.name.clone(),
            city: changes.city.clone(),
            country: changes.country.clone(),
            bio: changes.bio.clone(),
            updated_at: Some(Utc::now()),
            ..UserPatch::default()
        };
        self.store.update_user(uid, &patch).await.map_err(|e| {
            tracing::error!(error = %e, uid, "error updating user profile");
            ProfileError::Update
        })?;

        let Some(name) = changes.name.as_deref().filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        if let Some(user) = self.signed_in_as(uid).await
            && user.display_name.as_deref() != Some(name)
        {
            let update = ProfileUpdate {
                display_name: Some(name.to_string()),
                photo_url: None,
            };
            self.auth.update_profile(&update).await.map_err(|e| {
                tracing::error!(error = ?e, uid, "error updating display name");
                ProfileError::Update
            })?;
        }
        Ok(())
    }

    /// Store a new profile picture. Returns the display-size data URL.
    pub async fn update_profile_picture(
        &self,
        uid: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProfileError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ProfileError::FileTooLarge);
        }
        if !content_type.starts_with("image/") {
            return Err(ProfileError::NotAnImage);
        }

        let resized = resize::resize_variants(bytes).await.map_err(|e| {
            tracing::error!(error = %e, uid, "error resizing profile picture");
            ProfileError::LoadImage
        })?;

        let patch = UserPatch {
            photo_url: Some(resized.display.clone()),
            thumbnail_url: Some(resized.thumbnail.clone()),
            updated_at: Some(Utc::now()),
            ..UserPatch::default()
        };
        self.store.update_user(uid, &patch).await.map_err(|e| {
            tracing::error!(error = %e, uid, "error updating profile picture");
            ProfileError::Update
        })?;

        if self.signed_in_as(uid).await.is_some() {
            let update = ProfileUpdate {
                display_name: None,
                photo_url: Some(resized.thumbnail),
            };
            self.auth.update_profile(&update).await?;
        }

        tracing::info!(uid, "profile picture updated");
        Ok(resized.display)
    }

    /// The signed-in user, if it is `uid`.
    async fn signed_in_as(&self, uid: &str) -> Option<AuthUser> {
        match self.auth.current_user().await {
            Ok(user) => user.filter(|u| u.uid == uid),
            Err(e) => {
                tracing::warn!(error = ?e, "could not read current user");
                None
            }
        }
    }
}

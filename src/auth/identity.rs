use async_trait::async_trait;

use super::AuthError;

/// What the identity provider hands back after a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSession {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime of `id_token` in seconds.
    pub expires_in: u64,
    /// True when the account was created by this sign-in.
    pub is_new_user: bool,
}

/// Fresh tokens from a refresh-token exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshedTokens {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Fields to change on the provider's user record. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// The external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError>;

    /// Sign in with a Google ID token obtained through OAuth.
    async fn sign_in_with_google(&self, google_id_token: &str)
    -> Result<ProviderSession, AuthError>;

    async fn update_profile(&self, id_token: &str, update: &ProfileUpdate)
    -> Result<(), AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError>;
}

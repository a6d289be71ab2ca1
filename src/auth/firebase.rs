//! Identity Toolkit REST client.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::AuthError;
use super::identity::{IdentityProvider, ProfileUpdate, ProviderSession, RefreshedTokens};
use crate::config::Settings;

/// Where the provider sends Google after the IdP round trip. Never visited.
const IDP_REQUEST_URI: &str = "http://localhost";

/// An [`IdentityProvider`] backed by Firebase Authentication.
pub struct FirebaseIdentity {
    http: reqwest::Client,
    api_key: Option<String>,
    identity_url: String,
    token_url: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: Option<String>, identity_url: &str, token_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            identity_url: identity_url.trim_end_matches('/').to_string(),
            token_url: token_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.firebase_api_key.clone(),
            &settings.identity_url,
            &settings.token_url,
        )
    }

    fn api_key(&self) -> Result<&str, AuthError> {
        self.api_key.as_deref().ok_or(AuthError::NotConfigured)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: String,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key()?)])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::from_transport(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => AuthError::from_provider_message(&envelope.error.message),
                Err(_) => AuthError::Unexpected(format!("identity provider error ({status}): {text}")),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| AuthError::Unexpected(format!("malformed identity response: {e}")))
    }

    async fn accounts<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        self.post(format!("{}/accounts:{method}", self.identity_url), body)
            .await
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let resp: AccountResponse = self.accounts("signUp", &body).await?;
        let mut session = resp.into_session()?;
        session.is_new_user = true;
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let resp: AccountResponse = self.accounts("signInWithPassword", &body).await?;
        resp.into_session()
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
    ) -> Result<ProviderSession, AuthError> {
        let body = json!({
            "postBody": format!("id_token={google_id_token}&providerId=google.com"),
            "requestUri": IDP_REQUEST_URI,
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        let resp: AccountResponse = self.accounts("signInWithIdp", &body).await?;
        resp.into_session()
    }

    async fn update_profile(
        &self,
        id_token: &str,
        update: &ProfileUpdate,
    ) -> Result<(), AuthError> {
        let mut body = json!({ "idToken": id_token, "returnSecureToken": false });
        if let Some(name) = &update.display_name {
            body["displayName"] = json!(name);
        }
        if let Some(photo) = &update.photo_url {
            body["photoUrl"] = json!(photo);
        }
        let _: serde_json::Value = self.accounts("update", &body).await?;
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
        let body = json!({ "grant_type": "refresh_token", "refresh_token": refresh_token });
        let resp: RefreshResponse = self.post(format!("{}/token", self.token_url), &body).await?;
        Ok(RefreshedTokens {
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
            expires_in: parse_expires_in(&resp.expires_in)?,
        })
    }
}

fn parse_expires_in(raw: &str) -> Result<u64, AuthError> {
    raw.parse()
        .map_err(|_| AuthError::Unexpected(format!("bad expiresIn: {raw}")))
}

// --- API types ---

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
    #[serde(default)]
    is_new_user: bool,
}

impl AccountResponse {
    fn into_session(self) -> Result<ProviderSession, AuthError> {
        Ok(ProviderSession {
            expires_in: parse_expires_in(&self.expires_in)?,
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|n| !n.is_empty()),
            photo_url: self.photo_url.filter(|p| !p.is_empty()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            is_new_user: self.is_new_user,
        })
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_response_parses_sign_in_payload() {
        let raw = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "abc123",
            "email": "ada@example.com",
            "displayName": "",
            "idToken": "id",
            "registered": true,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;
        let resp: AccountResponse = serde_json::from_str(raw).unwrap();
        let session = resp.into_session().unwrap();
        assert_eq!(session.uid, "abc123");
        assert_eq!(session.expires_in, 3600);
        assert!(session.display_name.is_none());
        assert!(!session.is_new_user);
    }

    #[test]
    fn bad_expires_in_is_unexpected() {
        assert!(matches!(
            parse_expires_in("soon"),
            Err(AuthError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let identity = FirebaseIdentity::new(None, "http://127.0.0.1:9", "http://127.0.0.1:9");
        let err = identity.sign_in("a@b.c", "secret").await.unwrap_err();
        assert_eq!(err, AuthError::NotConfigured);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let identity = FirebaseIdentity::new(None, "http://host/v1/", "http://host/v1/");
        assert_eq!(identity.identity_url, "http://host/v1");
        assert_eq!(identity.token_url, "http://host/v1");
    }
}

//! Google sign-in via the OAuth authorization-code flow with PKCE.
//!
//! The user opens the authorize URL, picks an account, and pastes back the
//! address the browser was redirected to (or just the `code` from it).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use sha2::{Digest, Sha256};

use super::AuthError;
use crate::config::Settings;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://localhost";
const SCOPES: &str = "openid email profile";

/// PKCE verifier and challenge pair.
struct Pkce {
    verifier: String,
    challenge: String,
}

/// Generate a PKCE code verifier and S256 challenge.
fn generate_pkce() -> Pkce {
    let verifier = random_token();
    let hash = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    Pkce {
        verifier,
        challenge,
    }
}

fn random_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Check a verifier against its challenge.
pub fn verify_pkce(verifier: &str, challenge: &str) -> bool {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())) == challenge
}

/// State the caller must keep between showing the URL and exchanging the code.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub url: String,
    pub verifier: String,
    pub state: String,
}

/// The code (and state, when present) pulled out of what the user pasted.
#[derive(Debug, Clone, PartialEq)]
pub struct PastedCode {
    pub code: String,
    pub state: Option<String>,
}

/// Google OAuth client configuration.
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: Option<String>,
    token_url: String,
}

impl GoogleOAuth {
    pub fn new(client_id: String, client_secret: Option<String>, token_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            token_url: token_url.to_string(),
        }
    }

    /// `None` when no Google client id is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let client_id = settings.google_client_id.clone()?;
        Some(Self::new(
            client_id,
            settings.google_client_secret.clone(),
            DEFAULT_TOKEN_URL,
        ))
    }

    /// Build the authorization URL for the user to visit.
    pub fn start(&self) -> PendingLogin {
        let pkce = generate_pkce();
        let state = random_token();

        let params = [
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", REDIRECT_URI),
            ("scope", SCOPES),
            ("code_challenge", &pkce.challenge),
            ("code_challenge_method", "S256"),
            ("state", &state),
            ("prompt", "select_account"),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoded(v)))
            .collect::<Vec<_>>()
            .join("&");

        PendingLogin {
            url: format!("{AUTHORIZE_URL}?{query}"),
            verifier: pkce.verifier,
            state,
        }
    }

    /// Exchange what the user pasted for a Google ID token.
    ///
    /// An empty paste means the user gave up, like closing the popup.
    pub async fn finish(&self, pending: &PendingLogin, pasted: &str) -> Result<String, AuthError> {
        let pasted = extract_code(pasted).ok_or(AuthError::PopupClosedByUser)?;
        if let Some(state) = &pasted.state
            && *state != pending.state
        {
            return Err(AuthError::CancelledPopupRequest);
        }

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", pasted.code.as_str()),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("code_verifier", pending.verifier.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let resp = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::from_transport(&e))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(body = %text, "google token exchange failed");
            return Err(AuthError::InvalidCredential);
        }

        let data: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Unexpected(format!("malformed token response: {e}")))?;
        Ok(data.id_token)
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    id_token: String,
}

/// Pull the authorization code out of a pasted redirect URL or bare code.
pub fn extract_code(pasted: &str) -> Option<PastedCode> {
    let pasted = pasted.trim();
    if pasted.is_empty() {
        return None;
    }

    let Ok(redirect) = url::Url::parse(pasted) else {
        return Some(PastedCode {
            code: pasted.to_string(),
            state: None,
        });
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in redirect.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }
    code.filter(|c| !c.is_empty())
        .map(|code| PastedCode { code, state })
}

/// Minimal URL encoding for query parameters.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuth {
        GoogleOAuth::new("client-123".to_string(), None, DEFAULT_TOKEN_URL)
    }

    #[test]
    fn authorize_url_carries_pkce_and_account_picker() {
        let pending = client().start();
        assert!(pending.url.starts_with(AUTHORIZE_URL));
        assert!(pending.url.contains("client_id=client-123"));
        assert!(pending.url.contains("code_challenge_method=S256"));
        assert!(pending.url.contains("prompt=select_account"));
        assert!(pending.url.contains("scope=openid%20email%20profile"));
        assert!(pending.url.contains(&format!("state={}", pending.state)));
    }

    #[test]
    fn pkce_challenge_matches_verifier() {
        let pkce = generate_pkce();
        assert!(verify_pkce(&pkce.verifier, &pkce.challenge));
        assert!(!verify_pkce("other", &pkce.challenge));
    }

    #[test]
    fn each_login_gets_fresh_secrets() {
        let a = client().start();
        let b = client().start();
        assert_ne!(a.verifier, b.verifier);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn extract_bare_code() {
        assert_eq!(
            extract_code("  4/0Abc  "),
            Some(PastedCode {
                code: "4/0Abc".to_string(),
                state: None
            })
        );
    }

    #[test]
    fn extract_from_redirect_url() {
        let pasted = "http://localhost/?state=xyz&code=4%2F0Abc&scope=email";
        assert_eq!(
            extract_code(pasted),
            Some(PastedCode {
                code: "4/0Abc".to_string(),
                state: Some("xyz".to_string())
            })
        );
    }

    #[test]
    fn extract_empty_is_none() {
        assert!(extract_code("").is_none());
        assert!(extract_code("   ").is_none());
        assert!(extract_code("http://localhost/?error=access_denied").is_none());
    }

    #[test]
    fn extract_decodes_plus_and_ignores_fragment() {
        let pasted = "https://example.com/cb?code=4%2F0A+b&state=s%201#frag";
        assert_eq!(
            extract_code(pasted),
            Some(PastedCode {
                code: "4/0A b".to_string(),
                state: Some("s 1".to_string())
            })
        );
    }

    #[test]
    fn urlencoded_escapes_reserved_bytes() {
        assert_eq!(urlencoded("4/0A b+c~"), "4%2F0A%20b%2Bc~");
    }

    #[tokio::test]
    async fn empty_paste_is_cancelled_sign_in() {
        let oauth = client();
        let pending = oauth.start();
        assert_eq!(
            oauth.finish(&pending, "").await.unwrap_err(),
            AuthError::PopupClosedByUser
        );
    }

    #[tokio::test]
    async fn mismatched_state_is_rejected() {
        let oauth = client();
        let pending = oauth.start();
        let err = oauth
            .finish(&pending, "http://localhost/?code=abc&state=forged")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::CancelledPopupRequest);
    }
}

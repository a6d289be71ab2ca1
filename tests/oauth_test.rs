use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emojify::auth::AuthError;
use emojify::auth::oauth::{GoogleOAuth, extract_code, verify_pkce};

fn google(server: &MockServer) -> GoogleOAuth {
    GoogleOAuth::new(
        "client-123.apps.googleusercontent.com".to_string(),
        Some("shh".to_string()),
        &format!("{}/token", server.uri()),
    )
}

fn query_value(url: &str, key: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

#[test]
fn authorize_url_asks_to_pick_an_account() {
    let pending = GoogleOAuth::new("cid".to_string(), None, "http://unused").start();
    assert!(pending.url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert_eq!(query_value(&pending.url, "prompt").as_deref(), Some("select_account"));
    assert_eq!(query_value(&pending.url, "client_id").as_deref(), Some("cid"));
    assert_eq!(
        query_value(&pending.url, "code_challenge_method").as_deref(),
        Some("S256")
    );
    assert_eq!(query_value(&pending.url, "state"), Some(pending.state.clone()));

    let challenge = query_value(&pending.url, "code_challenge").unwrap();
    assert!(verify_pkce(&pending.verifier, &challenge));
}

#[test]
fn each_login_gets_fresh_secrets() {
    let google = GoogleOAuth::new("cid".to_string(), None, "http://unused");
    let a = google.start();
    let b = google.start();
    assert_ne!(a.verifier, b.verifier);
    assert_ne!(a.state, b.state);
}

#[test]
fn code_is_pulled_from_redirect_url() {
    let pasted = extract_code("http://localhost/?state=s1&code=4%2F0Ab&scope=email").unwrap();
    assert_eq!(pasted.code, "4/0Ab");
    assert_eq!(pasted.state.as_deref(), Some("s1"));

    let bare = extract_code("  4/0Ab  ").unwrap();
    assert_eq!(bare.code, "4/0Ab");
    assert_eq!(bare.state, None);
}

#[tokio::test]
async fn code_is_exchanged_for_an_id_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("client_secret=shh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29",
            "id_token": "google-id-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let google = google(&server);
    let pending = google.start();
    let pasted = format!("http://localhost/?code=the-code&state={}", pending.state);
    let id_token = google.finish(&pending, &pasted).await.unwrap();
    assert_eq!(id_token, "google-id-token");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains(&format!("code_verifier={}", pending.verifier)));
}

#[tokio::test]
async fn empty_paste_means_cancelled() {
    let server = MockServer::start().await;
    let google = google(&server);
    let pending = google.start();
    let err = google.finish(&pending, "   ").await.unwrap_err();
    assert_eq!(err, AuthError::PopupClosedByUser);
    assert_eq!(err.to_string(), "Sign in was cancelled. Please try again.");
}

#[tokio::test]
async fn state_mismatch_is_rejected() {
    let server = MockServer::start().await;
    let google = google(&server);
    let pending = google.start();
    let err = google
        .finish(&pending, "http://localhost/?code=c&state=forged")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::CancelledPopupRequest);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_code_is_invalid_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let google = google(&server);
    let pending = google.start();
    let err = google.finish(&pending, "bad-code").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::AuthError;
use super::identity::{IdentityProvider, ProfileUpdate, ProviderSession, RefreshedTokens};

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    id_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
    issued: usize,
    fail_next: Option<AuthError>,
    updates: Vec<(String, ProfileUpdate)>,
    refreshes: usize,
}

/// An in-memory identity provider for tests.
///
/// Google sign-in treats the ID token as the account email.
pub struct MockIdentity {
    state: Mutex<State>,
    token_lifetime: u64,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::with_token_lifetime(3600)
    }

    /// Issue ID tokens that live this many seconds.
    pub fn with_token_lifetime(secs: u64) -> Self {
        Self {
            state: Mutex::new(State::default()),
            token_lifetime: secs,
        }
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: AuthError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    /// Every profile update received, as `(uid, update)`.
    pub fn updates(&self) -> Vec<(String, ProfileUpdate)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.state.lock().unwrap().refreshes
    }

    /// Display name and photo currently on the provider record.
    pub fn profile_of(&self, uid: &str) -> Option<(Option<String>, Option<String>)> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .values()
            .find(|a| a.uid == uid)
            .map(|a| (a.display_name.clone(), a.photo_url.clone()))
    }

    fn take_failure(state: &mut State) -> Result<(), AuthError> {
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn issue(&self, state: &mut State, account: &Account, is_new_user: bool) -> ProviderSession {
        state.issued += 1;
        let id_token = format!("id-{}-{}", account.uid, state.issued);
        let refresh_token = format!("refresh-{}-{}", account.uid, state.issued);
        state.id_tokens.insert(id_token.clone(), account.uid.clone());
        state
            .refresh_tokens
            .insert(refresh_token.clone(), account.uid.clone());
        ProviderSession {
            uid: account.uid.clone(),
            email: Some(account.email.clone()),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            id_token,
            refresh_token,
            expires_in: self.token_lifetime,
            is_new_user,
        }
    }
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }
        if state.accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let account = Account {
            uid: format!("uid-{}", state.accounts.len() + 1),
            email: email.to_string(),
            password: Some(password.to_string()),
            display_name: None,
            photo_url: None,
        };
        state.accounts.insert(email.to_string(), account.clone());
        Ok(self.issue(&mut state, &account, true))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let account = state
            .accounts
            .get(email)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;
        if account.password.as_deref() != Some(password) {
            return Err(AuthError::WrongPassword);
        }
        Ok(self.issue(&mut state, &account, false))
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
    ) -> Result<ProviderSession, AuthError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let email = google_id_token;
        let (account, is_new) = match state.accounts.get(email) {
            Some(a) => (a.clone(), false),
            None => {
                let account = Account {
                    uid: format!("uid-{}", state.accounts.len() + 1),
                    email: email.to_string(),
                    password: None,
                    display_name: email.split('@').next().map(str::to_string),
                    photo_url: Some("https://example.com/google.png".to_string()),
                };
                state.accounts.insert(email.to_string(), account.clone());
                (account, true)
            }
        };
        Ok(self.issue(&mut state, &account, is_new))
    }

    async fn update_profile(
        &self,
        id_token: &str,
        update: &ProfileUpdate,
    ) -> Result<(), AuthError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let uid = state
            .id_tokens
            .get(id_token)
            .cloned()
            .ok_or(AuthError::InvalidCredential)?;
        if let Some(account) = state.accounts.values_mut().find(|a| a.uid == uid) {
            if let Some(name) = &update.display_name {
                account.display_name = Some(name.clone());
            }
            if let Some(photo) = &update.photo_url {
                account.photo_url = Some(photo.clone());
            }
        }
        state.updates.push((uid, update.clone()));
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let uid = state
            .refresh_tokens
            .get(refresh_token)
            .cloned()
            .ok_or(AuthError::InvalidCredential)?;
        let account = state
            .accounts
            .values()
            .find(|a| a.uid == uid)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;
        state.refreshes += 1;
        let session = self.issue(&mut state, &account, false);
        Ok(RefreshedTokens {
            id_token: session.id_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
        })
    }
}

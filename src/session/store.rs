use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::session::SessionHandle;
use crate::client::{ApiClient, RequestOptions};
use crate::error::{ClientError, NormalizedError, Result};
use crate::models::{AuthResponse, LoginPayload, SignupPayload, UserProfile};
use crate::navigation::Navigator;

/// Reported when the backend accepts credentials but hands back no token.
const MISSING_TOKEN_STATUS: u16 = 502;
const MISSING_TOKEN_MESSAGE: &str = "Authentication response did not include an access token";

/// Login, signup, profile and logout on top of the shared session.
///
/// Two states: anonymous (no token) and authenticated (token present, profile
/// possibly not loaded yet). Concurrent calls are not serialized.
pub struct SessionStore {
    client: ApiClient,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    loading: AtomicBool,
}

/// Resets the loading flag however the call ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        LoadingGuard(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionStore {
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        SessionStore {
            session: client.session().clone(),
            client,
            navigator,
            login_path: login_path.into(),
            loading: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.access_token()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    /// Advisory only: true while some call is in flight.
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// On failure the session is left exactly as it was.
    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse> {
        let response = self.authenticate("/auth/login", payload).await?;
        info!(
            event_name = "session.login",
            user_id = response.user.id.as_str(),
            "signed in"
        );
        Ok(response)
    }

    pub async fn signup(&self, payload: &SignupPayload) -> Result<AuthResponse> {
        let response = self.authenticate("/auth/signup", payload).await?;
        info!(
            event_name = "session.signup",
            user_id = response.user.id.as_str(),
            "account created and signed in"
        );
        Ok(response)
    }

    async fn authenticate<B: Serialize>(&self, path: &str, payload: &B) -> Result<AuthResponse> {
        let _loading = LoadingGuard::start(&self.loading);
        let response: AuthResponse = self
            .client
            .request(path, RequestOptions::post(payload)?.without_auth())
            .await?;
        // a profile is only ever stored next to a usable token
        if response.access_token.trim().is_empty() {
            warn!(path, "authentication response carried no access token");
            return Err(ClientError::Request(NormalizedError::new(
                MISSING_TOKEN_STATUS,
                MISSING_TOKEN_MESSAGE,
            )));
        }
        self.session
            .establish(response.access_token.clone(), response.user.clone())?;
        Ok(response)
    }

    /// `None` without touching the network when nobody is signed in, and also
    /// when the session was cleared while the call was in flight.
    pub async fn fetch_profile(&self) -> Result<Option<UserProfile>> {
        if !self.session.is_authenticated() {
            debug!("Skipping profile fetch: no session token");
            return Ok(None);
        }

        let _loading = LoadingGuard::start(&self.loading);
        let profile: UserProfile = self.client.request("/auth/me", RequestOptions::get()).await?;
        if !self.session.replace_user(profile.clone()) {
            return Ok(None);
        }
        Ok(Some(profile))
    }

    /// Forget the session, then send the user to the login view. Safe to repeat.
    pub async fn logout(&self) -> Result<()> {
        let was_authenticated = self.session.is_authenticated();
        let cleared = self.session.invalidate();
        if was_authenticated {
            info!(event_name = "session.logout", "signed out");
        }
        self.navigator.redirect_to(&self.login_path).await;
        cleared.map_err(Into::into)
    }
}

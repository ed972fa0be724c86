//! Auth service: login, logout, password reset, user creation.
//!
//! DESIGN
//! ======
//! The service holds no state of its own. The current role and loading flag
//! are derived from the tab's session cache, so every writer (login, refresh,
//! another tab) is reflected without extra bookkeeping.
//!
//! Cross-tab consistency comes from [`AuthService::spawn_storage_listener`]:
//! storage events written by other tabs reload this tab's cache, and a removed
//! access token forces a redirect to the login page.

use std::sync::{Arc, Weak};

use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::net::client::ApiClient;
use crate::net::types::{
    ApiResponse, CreateUserRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, SetPasswordRequest,
};
use crate::net::{FORGOT_PASSWORD_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, SET_PASSWORD_ENDPOINT, USERS_ENDPOINT};
use crate::routes::Route;
use crate::state::auth::{AuthState, AuthWatch};
use crate::state::session::SessionStore;
use crate::state::storage::{ACCESS_TOKEN_KEY, DurableStorage, REFRESH_TOKEN_KEY, ROLE_KEY, StorageEvent};
use crate::ui::Navigator;

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Current auth state without touching durable storage.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.watch().current()
    }

    /// Read the stored session and end the loading phase.
    pub fn hydrate(&self) -> AuthState {
        self.session().snapshot();
        self.state()
    }

    #[must_use]
    pub fn watch(&self) -> AuthWatch {
        AuthWatch::new(self.session().subscribe())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Exchange credentials for a token pair. Returns `true` when the session
    /// now holds the new tokens.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let request = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response: ApiResponse<LoginResponse> = self.client.post_public(LOGIN_ENDPOINT, &request).await;

        let Some(tokens) = response.into_result() else {
            tracing::info!("login rejected");
            return false;
        };
        self.session()
            .set_tokens(&tokens.access_token, &tokens.refresh_token, tokens.role.as_deref());
        tracing::info!(role = tokens.role.as_deref().unwrap_or("-"), "logged in");
        true
    }

    /// Invalidate the session server-side (best effort), then clear it locally
    /// and send the user to the login page. Local state is always cleared.
    pub async fn logout(&self) {
        let response: ApiResponse<Value> = self.client.post(LOGOUT_ENDPOINT, &json!({})).await;
        if response.has_error {
            tracing::info!(code = response.error_code, "server-side logout failed; clearing local session anyway");
        }
        self.session().clear_tokens();
        self.client.navigator().redirect(Route::Login);
    }

    pub async fn forgot_password(&self, email: &str) -> bool {
        let request = ForgotPasswordRequest { email: email.to_owned() };
        let response: ApiResponse<Value> = self.client.post_public(FORGOT_PASSWORD_ENDPOINT, &request).await;
        !response.has_error
    }

    pub async fn set_password(&self, request: &SetPasswordRequest) -> bool {
        let response: ApiResponse<Value> = self.client.post_public(SET_PASSWORD_ENDPOINT, request).await;
        !response.has_error
    }

    /// Create an account. The caller's own session is left untouched.
    pub async fn create_user(&self, request: &CreateUserRequest) -> bool {
        let response: ApiResponse<Value> = self.client.post(USERS_ENDPOINT, request).await;
        !response.has_error
    }

    // =========================================================================
    // CROSS-TAB
    // =========================================================================

    /// Follow storage writes made by other tabs until this tab's session is
    /// dropped or the storage channel closes.
    pub fn spawn_storage_listener(&self) -> JoinHandle<()> {
        let mut events = self.session().storage().subscribe();
        let weak_session = Arc::downgrade(self.session());
        let navigator = Arc::clone(self.client.navigator());

        tokio::spawn(async move {
            loop {
                let event = events.recv().await;
                let Some(session) = Weak::upgrade(&weak_session) else { break };
                match event {
                    Ok(event) => handle_storage_event(&session, navigator.as_ref(), &event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "storage events lagged; reloading session");
                        session.reload();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("storage listener stopped");
        })
    }
}

/// Apply one storage event from another tab to this tab's session.
pub(crate) fn handle_storage_event(session: &SessionStore, navigator: &dyn Navigator, event: &StorageEvent) {
    if event.origin == session.tab_id() {
        return;
    }
    match event.key.as_str() {
        ACCESS_TOKEN_KEY if event.new_value.is_none() => {
            tracing::info!(origin = %event.origin, "signed out in another tab");
            session.reload();
            navigator.redirect(Route::Login);
        }
        ACCESS_TOKEN_KEY | REFRESH_TOKEN_KEY | ROLE_KEY => {
            tracing::debug!(key = %event.key, origin = %event.origin, "session changed in another tab");
            session.reload();
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

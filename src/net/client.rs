//! Envelope-returning API client with transparent token refresh.
//!
//! ARCHITECTURE
//! ============
//! Every call resolves to an [`ApiResponse`]; nothing escapes as an error.
//!
//! ```text
//! attempt ──200/4xx──▶ decode envelope (notify on hasError)
//!    │
//!    ├──401 + allow_retry──▶ refresh ──ok──▶ attempt once more (no retry)
//!    │                          └──fail──▶ redirect /login, 401 envelope
//!    │
//!    └──transport error──▶ notify, 500 envelope
//!          └─ connect failure + allow_retry ─▶ refresh ──ok──▶ attempt once more
//!                                                 └──fail──▶ redirect /login
//! ```

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use super::refresh::RefreshCoordinator;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use super::types::{ApiResponse, AUTH_ERROR_CODE, NETWORK_ERROR_CODE};
use crate::config::join_url;
use crate::routes::Route;
use crate::state::session::SessionStore;
use crate::ui::{Navigator, Notice, Notifier};

const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

enum Attempt {
    Response(HttpResponse),
    Unauthorized(HttpResponse),
    Failed(TransportError),
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    refresh: RefreshCoordinator,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    #[must_use]
    pub fn new(
        api_base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let refresh = RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(&session), api_base_url);
        Self { base_url: api_base_url.trim_end_matches('/').to_owned(), transport, session, refresh, notifier, navigator }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    #[must_use]
    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    // =========================================================================
    // REQUEST
    // =========================================================================

    /// Issue a request and decode the envelope.
    ///
    /// With `allow_retry`, a 401 (or a connection failure) triggers one token
    /// refresh and, if it succeeds, exactly one re-issue of the same request.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        allow_retry: bool,
    ) -> ApiResponse<T> {
        let span = tracing::debug_span!("api_request", %method, endpoint);
        self.request_inner(endpoint, method, body, allow_retry)
            .instrument(span)
            .await
    }

    async fn request_inner<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        allow_retry: bool,
    ) -> ApiResponse<T> {
        match self.attempt(endpoint, &method, body.as_ref()).await {
            Attempt::Response(response) => self.decode(&response),
            Attempt::Unauthorized(response) => {
                if !allow_retry {
                    return self.decode(&response);
                }
                if self.refresh.refresh().await {
                    tracing::debug!("retrying after token refresh");
                    return self.retry(endpoint, &method, body.as_ref()).await;
                }
                self.navigator.redirect(Route::Login);
                ApiResponse::error(AUTH_ERROR_CODE, AUTH_FAILED_MESSAGE)
            }
            Attempt::Failed(error) => {
                let message = self.report_failure(&error);
                if allow_retry && error.is_likely_auth_failure() {
                    if self.refresh.refresh().await {
                        tracing::debug!("retrying after token refresh");
                        return self.retry(endpoint, &method, body.as_ref()).await;
                    }
                    self.navigator.redirect(Route::Login);
                }
                ApiResponse::error(NETWORK_ERROR_CODE, message)
            }
        }
    }

    /// Second and final attempt after a successful refresh.
    async fn retry<T: DeserializeOwned>(&self, endpoint: &str, method: &Method, body: Option<&Value>) -> ApiResponse<T> {
        match self.attempt(endpoint, method, body).await {
            Attempt::Response(response) | Attempt::Unauthorized(response) => self.decode(&response),
            Attempt::Failed(error) => {
                let message = self.report_failure(&error);
                ApiResponse::error(NETWORK_ERROR_CODE, message)
            }
        }
    }

    async fn attempt(&self, endpoint: &str, method: &Method, body: Option<&Value>) -> Attempt {
        let request = HttpRequest::new(method.clone(), join_url(&self.base_url, endpoint))
            .with_bearer(self.session.access_token())
            .with_body(body.cloned());

        match self.transport.send(request).await {
            Ok(response) if response.is_unauthorized() => Attempt::Unauthorized(response),
            Ok(response) => Attempt::Response(response),
            Err(error) => Attempt::Failed(error),
        }
    }

    fn report_failure(&self, error: &TransportError) -> String {
        tracing::warn!(%error, "request failed");
        let message = error.to_string();
        self.notifier.notify(Notice::error(message.clone()));
        message
    }

    fn decode<T: DeserializeOwned>(&self, response: &HttpResponse) -> ApiResponse<T> {
        match serde_json::from_str::<ApiResponse<T>>(&response.body) {
            Ok(envelope) => {
                if envelope.has_error {
                    tracing::debug!(code = envelope.error_code, status = response.status, "server reported error");
                    if let Some(message) = envelope.error_message.as_deref().filter(|m| !m.is_empty()) {
                        self.notifier.notify(Notice::error(message));
                    }
                }
                envelope
            }
            Err(e) => {
                tracing::warn!(error = %e, status = response.status, "response body is not a valid envelope");
                let code = if response.is_success() { NETWORK_ERROR_CODE } else { i32::from(response.status) };
                let message = format!("invalid response from server: {e}");
                self.notifier.notify(Notice::error(message.clone()));
                ApiResponse::error(code, message)
            }
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<T> {
        self.request(endpoint, Method::GET, None, true).await
    }

    pub async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &impl Serialize) -> ApiResponse<T> {
        match encode_body(body) {
            Ok(body) => self.request(endpoint, Method::POST, Some(body), true).await,
            Err(envelope) => envelope,
        }
    }

    pub async fn put<T: DeserializeOwned>(&self, endpoint: &str, body: &impl Serialize) -> ApiResponse<T> {
        match encode_body(body) {
            Ok(body) => self.request(endpoint, Method::PUT, Some(body), true).await,
            Err(envelope) => envelope,
        }
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<T> {
        self.request(endpoint, Method::DELETE, None, true).await
    }

    /// `POST` to an endpoint that does not need a session. A 401 here is an
    /// answer (bad credentials, expired link), not a reason to refresh.
    pub async fn post_public<T: DeserializeOwned>(&self, endpoint: &str, body: &impl Serialize) -> ApiResponse<T> {
        match encode_body(body) {
            Ok(body) => self.request(endpoint, Method::POST, Some(body), false).await,
            Err(envelope) => envelope,
        }
    }
}

fn encode_body<T>(body: &impl Serialize) -> Result<Value, ApiResponse<T>> {
    serde_json::to_value(body).map_err(|e| {
        tracing::error!(error = %e, "failed to encode request body");
        ApiResponse::error(NETWORK_ERROR_CODE, format!("failed to encode request: {e}"))
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

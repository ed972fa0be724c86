//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! A mutex guards one nullable slot holding the in-flight refresh as a
//! `Shared` future. The first caller that finds the slot empty starts the
//! refresh and publishes it; everyone else awaits a clone of the same future.
//! The future clears the slot itself when it resolves, so the next 401 after
//! completion starts a fresh cycle even if the original caller was dropped.
//!
//! The mutex is only held to read or swap the slot, never across an await.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Method;
use tracing::Instrument;

use super::REFRESH_TOKEN_ENDPOINT;
use super::transport::{HttpRequest, Transport};
use super::types::{ApiResponse, LoginResponse, RefreshTokenRequest};
use crate::config::join_url;
use crate::state::session::SessionStore;

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    refresh_url: String,
    pending: Mutex<Option<PendingRefresh>>,
    /// Refresh calls that reached the network.
    calls: AtomicU64,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>, api_base_url: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                refresh_url: join_url(api_base_url.trim_end_matches('/'), REFRESH_TOKEN_ENDPOINT),
                pending: Mutex::new(None),
                calls: AtomicU64::new(0),
            }),
        }
    }

    /// Obtain a new token pair, joining an in-flight refresh when one exists.
    ///
    /// Returns `true` when the session now holds fresh tokens. On `false`
    /// the session has been cleared.
    pub async fn refresh(&self) -> bool {
        let pending = {
            let mut slot = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pending) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                pending.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let pending = async move {
                    let refreshed = inner.refresh_once().await;
                    inner.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
                    refreshed
                }
                .instrument(tracing::info_span!("token_refresh"))
                .boxed()
                .shared();
                *slot = Some(pending.clone());
                pending
            }
        };
        pending.await
    }

    /// Whether a refresh is currently outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Number of refresh calls sent to the server since construction.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.calls.load(Ordering::Relaxed)
    }
}

impl Inner {
    async fn refresh_once(&self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            tracing::info!("no refresh token available; clearing session");
            self.session.clear_tokens();
            return false;
        };

        let body = serde_json::to_value(RefreshTokenRequest { refresh_token }).ok();
        let request = HttpRequest::new(Method::POST, &self.refresh_url).with_body(body);
        self.calls.fetch_add(1, Ordering::Relaxed);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh request failed");
                self.session.clear_tokens();
                return false;
            }
        };

        if response.is_unauthorized() {
            tracing::info!("refresh token rejected");
            self.session.clear_tokens();
            return false;
        }

        let tokens = match serde_json::from_str::<ApiResponse<LoginResponse>>(&response.body) {
            Ok(envelope) => envelope.into_result(),
            Err(e) => {
                tracing::warn!(error = %e, status = response.status, "token refresh response undecodable");
                None
            }
        };

        match tokens {
            Some(tokens) => {
                self.session
                    .set_tokens(&tokens.access_token, &tokens.refresh_token, tokens.role.as_deref());
                tracing::info!("access token refreshed");
                true
            }
            None => {
                tracing::info!(status = response.status, "token refresh returned no tokens");
                self.session.clear_tokens();
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;

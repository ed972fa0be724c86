//! Raw HTTP exchange behind a trait seam.
//!
//! DESIGN
//! ======
//! `ApiClient` and the refresh coordinator only see [`Transport`], so the
//! retry and single-flight logic can be driven by scripted transports in
//! tests. [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::config::Timeouts;

// =============================================================================
// ERROR
// =============================================================================

/// Failures below the HTTP status level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached at all.
    #[error("failed to connect: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending or reading the response.
    #[error("request failed: {0}")]
    Request(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl TransportError {
    /// Connection-level failures are what a rejected or expired credential
    /// looks like when the server drops the request before answering, so the
    /// client treats them as possible auth failures worth one refresh.
    #[must_use]
    pub fn is_likely_auth_failure(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// One outbound request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Bearer token for the `Authorization` header, if any.
    pub bearer: Option<String>,
    /// JSON body. Never set for `GET`.
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), bearer: None, body: None }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Attach a JSON body. Ignored for `GET`.
    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = if self.method == Method::GET { None } else { body };
        self
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Performs a single HTTP exchange. Implementations never retry.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the status and body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the TLS backend fails to initialize.
    pub fn new(timeouts: Timeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http.request(request.method, &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

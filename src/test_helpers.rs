//! Shared fixtures for unit tests: scripted transport, recording notifier,
//! and a one-call tab builder.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};

use crate::net::client::ApiClient;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::state::session::SessionStore;
use crate::state::storage::{DurableStorage, MemoryStorage};
use crate::ui::{Notice, Notifier, RecordingNavigator};

pub const BASE_URL: &str = "http://api.test/api/v1";

// =============================================================================
// MockTransport
// =============================================================================

pub enum MockReply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Wait before producing the inner reply.
    Delayed(Duration, Box<MockReply>),
}

type Handler = Box<dyn Fn(&HttpRequest) -> MockReply + Send + Sync>;

/// Transport driven by a closure. Every request is recorded.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> MockReply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of requests whose URL ends with `suffix`.
    pub fn count(&self, suffix: &str) -> usize {
        self.requests().iter().filter(|r| r.url.ends_with(suffix)).count()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut reply = (self.handler)(&request);
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        loop {
            match reply {
                MockReply::Respond(response) => return Ok(response),
                MockReply::Fail(error) => return Err(error),
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

/// `200` with a success envelope around `result`.
pub fn ok(result: Value) -> MockReply {
    MockReply::Respond(HttpResponse::new(
        200,
        json!({ "result": result, "hasError": false, "errorCode": 0, "errorMessage": null }).to_string(),
    ))
}

/// `status` with an error envelope.
pub fn error_envelope(status: u16, code: i32, message: &str) -> MockReply {
    MockReply::Respond(HttpResponse::new(
        status,
        json!({ "result": null, "hasError": true, "errorCode": code, "errorMessage": message }).to_string(),
    ))
}

pub fn unauthorized() -> MockReply {
    MockReply::Respond(HttpResponse::new(401, ""))
}

pub fn token_pair(access: &str, refresh: &str, role: &str) -> Value {
    json!({ "accessToken": access, "refreshToken": refresh, "role": role })
}

// =============================================================================
// RecordingNotifier
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}

// =============================================================================
// Tab
// =============================================================================

/// One client stack over a (possibly shared) storage backend.
pub struct Tab {
    pub session: Arc<SessionStore>,
    pub client: ApiClient,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn tab(storage: Arc<dyn DurableStorage>, transport: Arc<MockTransport>) -> Tab {
    let session = Arc::new(SessionStore::new(storage));
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(BASE_URL, transport, Arc::clone(&session), notifier.clone(), navigator.clone());
    Tab { session, client, notifier, navigator }
}

/// Tab over fresh in-memory storage.
pub fn solo_tab(transport: Arc<MockTransport>) -> Tab {
    tab(Arc::new(MemoryStorage::new()), transport)
}

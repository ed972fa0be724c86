//! Session store: the access/refresh token pair and role for one tab.
//!
//! ARCHITECTURE
//! ============
//! The in-memory cache is a `watch` channel so the auth service and route
//! guard are notified on every change. The cache starts as `None` (not yet
//! hydrated) and is filled from durable storage on first use.
//!
//! Writes go to durable storage first, then to the cache. A failed storage
//! write is logged and the cache is still updated, so the running tab keeps
//! working even when persistence is unavailable.

use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use super::storage::{ACCESS_TOKEN_KEY, DurableStorage, REFRESH_TOKEN_KEY, ROLE_KEY, StorageWrite, TabId};

/// Snapshot of the current credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<String>,
}

impl Session {
    /// Both tokens present. They are always set and cleared together.
    #[must_use]
    pub fn has_tokens(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Role of a logged-in session. `None` without an access token.
    #[must_use]
    pub fn authenticated_role(&self) -> Option<&str> {
        self.access_token.as_ref().and(self.role.as_deref())
    }
}

pub struct SessionStore {
    tab_id: TabId,
    storage: Arc<dyn DurableStorage>,
    cache: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create a store for a new tab. Nothing is read until first use.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let (cache, _) = watch::channel(None);
        Self { tab_id: Uuid::new_v4(), storage, cache }
    }

    #[must_use]
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn DurableStorage> {
        &self.storage
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Current session, hydrating from durable storage on first use.
    pub fn snapshot(&self) -> Session {
        if let Some(session) = self.cache.borrow().as_ref() {
            return session.clone();
        }
        let loaded = load(self.storage.as_ref());
        self.cache.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(loaded);
                true
            } else {
                false
            }
        });
        self.cache.borrow().clone().unwrap_or_default()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_token
    }

    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.snapshot().role
    }

    /// Store a new token pair. A `None` role keeps the previously stored role.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str, role: Option<&str>) {
        let mut writes = vec![
            StorageWrite::set(ACCESS_TOKEN_KEY, access_token),
            StorageWrite::set(REFRESH_TOKEN_KEY, refresh_token),
        ];
        if let Some(role) = role {
            writes.push(StorageWrite::set(ROLE_KEY, role));
        }
        if let Err(e) = self.storage.apply(&writes, self.tab_id) {
            tracing::warn!(error = %e, "failed to persist session tokens");
        }

        let role = role.map(ToOwned::to_owned).or_else(|| self.snapshot().role);
        self.cache.send_replace(Some(Session {
            access_token: Some(access_token.to_owned()),
            refresh_token: Some(refresh_token.to_owned()),
            role,
        }));
        tracing::debug!(tab = %self.tab_id, "session tokens stored");
    }

    /// Remove the token pair and role from storage and cache.
    pub fn clear_tokens(&self) {
        let writes = [
            StorageWrite::remove(ACCESS_TOKEN_KEY),
            StorageWrite::remove(REFRESH_TOKEN_KEY),
            StorageWrite::remove(ROLE_KEY),
        ];
        if let Err(e) = self.storage.apply(&writes, self.tab_id) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.cache.send_replace(Some(Session::default()));
        tracing::debug!(tab = %self.tab_id, "session cleared");
    }

    /// Re-read durable storage, replacing the cache. Used when another tab
    /// changed the shared entries.
    pub fn reload(&self) -> Session {
        let loaded = load(self.storage.as_ref());
        self.cache.send_replace(Some(loaded.clone()));
        loaded
    }

    /// Observe cache changes. `None` means not yet hydrated.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.cache.subscribe()
    }
}

fn load(storage: &dyn DurableStorage) -> Session {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, key, "failed to read session entry");
            None
        }
    };

    let access_token = read(ACCESS_TOKEN_KEY);
    let refresh_token = read(REFRESH_TOKEN_KEY);
    let role = read(ROLE_KEY);

    if access_token.is_some() != refresh_token.is_some() {
        tracing::warn!("stored session has only one token; ignoring both");
        return Session { access_token: None, refresh_token: None, role };
    }

    Session { access_token, refresh_token, role }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use super::*;
use crate::state::session::SessionStore;
use crate::state::storage::MemoryStorage;

// =============================================================
// AuthState
// =============================================================

#[test]
fn auth_state_default_no_role() {
    let state = AuthState::default();
    assert!(state.role.is_none());
    assert!(!state.loading);
    assert!(!state.is_authenticated());
}

#[test]
fn unhydrated_cache_is_loading() {
    let state = AuthState::from_cache(None);
    assert!(state.loading);
    assert!(!state.is_authenticated());
}

#[test]
fn role_without_access_token_is_not_authenticated() {
    let session = Session { access_token: None, refresh_token: None, role: Some("Admin".into()) };
    let state = AuthState::from_cache(Some(&session));
    assert!(!state.loading);
    assert!(state.role.is_none());
}

#[test]
fn logged_in_session_exposes_role() {
    let session = Session {
        access_token: Some("a".into()),
        refresh_token: Some("r".into()),
        role: Some("SuperAdmin".into()),
    };
    let state = AuthState::from_cache(Some(&session));
    assert_eq!(state.role.as_deref(), Some("SuperAdmin"));
    assert!(state.is_authenticated());
}

// =============================================================
// AuthWatch
// =============================================================

#[tokio::test]
async fn watch_follows_session_changes() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));
    let mut watch = AuthWatch::new(store.subscribe());
    assert!(watch.current().loading);

    store.set_tokens("a", "r", Some("Admin"));
    let state = watch.changed().await.unwrap();
    assert_eq!(state.role.as_deref(), Some("Admin"));

    store.clear_tokens();
    let state = watch.changed().await.unwrap();
    assert!(!state.is_authenticated());
    assert!(!state.loading);
}

#[tokio::test]
async fn watch_ends_when_store_dropped() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));
    let mut watch = AuthWatch::new(store.subscribe());
    drop(store);
    assert!(watch.changed().await.is_none());
}

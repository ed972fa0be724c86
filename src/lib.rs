//! # catalog-admin
//!
//! Headless admin client for the product catalog API.
//!
//! This crate contains the session/token core (durable storage, session
//! cache, HTTP client with single-flight token refresh), the auth and catalog
//! services, the route guard, and form validation. The `catalog-admin` binary
//! drives them from the command line.
//!
//! SYSTEM CONTEXT
//! ==============
//! One "tab" is a [`SessionStore`](state::session::SessionStore), an
//! [`ApiClient`](net::client::ApiClient) and the services built on it.
//! Tabs sharing a [`DurableStorage`](state::storage::DurableStorage) backend
//! stay consistent through its change events.

pub mod config;
pub mod forms;
pub mod net;
pub mod roles;
pub mod routes;
pub mod services;
pub mod state;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Domain services used by the CLI commands.
//!
//! ARCHITECTURE
//! ============
//! Services own the API calls and their session side effects so command
//! handlers stay focused on argument parsing and output. Each service wraps
//! a cloned [`ApiClient`](crate::net::client::ApiClient); clones share the
//! session and the refresh coordinator.

pub mod auth;
pub mod catalog;

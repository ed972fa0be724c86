//! Route guard: decides whether the current path may be shown.
//!
//! DESIGN
//! ======
//! [`evaluate`] is a pure function of the auth state, the path and the
//! route's allowed roles. [`RouteGuard::run`] re-evaluates it whenever the
//! auth state or the path changes and issues a redirect each time the
//! decision turns into a new redirect.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Route, is_public_path};
use crate::state::auth::{AuthState, AuthWatch};
use crate::ui::Navigator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not read yet. Show a neutral placeholder, never redirect.
    Loading,
    Render,
    Redirect(Route),
}

/// Apply the guard rules in order:
///
/// 1. loading → [`GuardDecision::Loading`]
/// 2. signed out on a protected path → `/login`
/// 3. signed in on a public entry point → `/products`
/// 4. signed in with a role outside `allowed_roles` → `/unauthorized`
/// 5. otherwise render
#[must_use]
pub fn evaluate(state: &AuthState, path: &str, allowed_roles: Option<&[&str]>) -> GuardDecision {
    if state.loading {
        return GuardDecision::Loading;
    }
    let public = is_public_path(path);
    let Some(role) = state.role.as_deref() else {
        return if public { GuardDecision::Render } else { GuardDecision::Redirect(Route::Login) };
    };
    if public {
        return GuardDecision::Redirect(Route::Products);
    }
    match allowed_roles {
        Some(allowed) if !allowed.contains(&role) => GuardDecision::Redirect(Route::Unauthorized),
        _ => GuardDecision::Render,
    }
}

/// [`evaluate`] with the allowed roles looked up from the path's route.
#[must_use]
pub fn check(state: &AuthState, path: &str) -> GuardDecision {
    let allowed = Route::parse(path).and_then(|route| route.allowed_roles());
    evaluate(state, path, allowed)
}

// =============================================================================
// WATCHER
// =============================================================================

pub struct RouteGuard {
    auth: AuthWatch,
    path: watch::Receiver<String>,
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(auth: AuthWatch, path: watch::Receiver<String>, navigator: Arc<dyn Navigator>) -> Self {
        Self { auth, path, navigator }
    }

    /// Decision for the current auth state and path.
    #[must_use]
    pub fn decide(&self) -> GuardDecision {
        let path = self.path.borrow().clone();
        check(&self.auth.current(), &path)
    }

    /// Re-evaluate on every auth or path change until both sources close.
    /// Returns the last decision.
    pub async fn run(mut self) -> GuardDecision {
        let mut last: Option<GuardDecision> = None;
        let mut auth_open = true;
        let mut path_open = true;

        loop {
            let decision = self.decide();
            if last.as_ref() != Some(&decision) {
                tracing::debug!(?decision, path = %self.path.borrow().as_str(), "route guard");
                if let GuardDecision::Redirect(route) = &decision {
                    self.navigator.redirect(route.clone());
                }
                last = Some(decision.clone());
            }
            if !auth_open && !path_open {
                return decision;
            }

            tokio::select! {
                changed = self.auth.changed(), if auth_open => {
                    auth_open = changed.is_some();
                }
                changed = self.path.changed(), if path_open => {
                    path_open = changed.is_ok();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

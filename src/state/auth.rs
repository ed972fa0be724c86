use tokio::sync::watch;

use super::session::Session;

/// Authentication state: the current user's role and whether the session
/// has been read from storage yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub role: Option<String>,
    pub loading: bool,
}

impl AuthState {
    /// Derive from the session cache. An unhydrated cache is still loading.
    #[must_use]
    pub fn from_cache(cache: Option<&Session>) -> Self {
        match cache {
            None => Self { role: None, loading: true },
            Some(session) => Self { role: session.authenticated_role().map(ToOwned::to_owned), loading: false },
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }
}

/// Follows a tab's session cache as [`AuthState`] values.
#[derive(Clone, Debug)]
pub struct AuthWatch {
    rx: watch::Receiver<Option<Session>>,
}

impl AuthWatch {
    #[must_use]
    pub fn new(rx: watch::Receiver<Option<Session>>) -> Self {
        Self { rx }
    }

    #[must_use]
    pub fn current(&self) -> AuthState {
        AuthState::from_cache(self.rx.borrow().as_ref())
    }

    /// Wait for the next cache change. `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(AuthState::from_cache(self.rx.borrow_and_update().as_ref()))
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

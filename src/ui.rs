//! Presentation collaborators: user notifications and navigation.
//!
//! The core never renders anything itself. It reports through [`Notifier`]
//! (the toast channel) and moves the user with [`Navigator`].

use std::sync::{Mutex, PoisonError};

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    #[must_use]
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), severity }
    }

    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(Severity::Error, "Error", description)
    }

    #[must_use]
    pub fn success(description: impl Into<String>) -> Self {
        Self::new(Severity::Success, "Success", description)
    }

    #[must_use]
    pub fn warning(description: impl Into<String>) -> Self {
        Self::new(Severity::Warning, "Warning", description)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

// =============================================================================
// CONSOLE NOTIFIER
// =============================================================================

/// Writes notices to stderr, one line each.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(severity = ?notice.severity, title = %notice.title, "notice");
        eprintln!("{}: {}", notice.title, notice.description);
    }
}

// =============================================================================
// RECORDING NAVIGATOR
// =============================================================================

/// Keeps the redirect history instead of acting on it. The CLI inspects it
/// after each command to tell the user where they were sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        tracing::debug!(path = %route.path(), "redirect");
        self.history.lock().unwrap_or_else(PoisonError::into_inner).push(route);
    }
}

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

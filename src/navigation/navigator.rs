use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;

/// Capability to send the user somewhere else, e.g. to the login view after a 401.
///
/// Contexts without an interactive UI plug in [`NoopNavigator`].
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn redirect_to(&self, path: &str);
}

/// Ignores every redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

#[async_trait]
impl Navigator for NoopNavigator {
    async fn redirect_to(&self, _path: &str) {}
}

/// Reports redirects through `tracing`, for command-line use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

#[async_trait]
impl Navigator for TracingNavigator {
    async fn redirect_to(&self, path: &str) {
        info!(
            event_name = "navigation.redirect",
            target_path = path,
            "redirect requested"
        );
    }
}

/// Keeps every requested path so callers can inspect what happened.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn redirect_to(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

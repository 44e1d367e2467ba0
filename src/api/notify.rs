//! User-facing failure notifications.
//!
//! Failures surface at most once per propagation, gated on the
//! classification verdict, the benign-401 suppression rules, and a keyed
//! dedup window so repeated identical failures do not stack.

use crate::api::classify::classify;
use crate::api::policy;
use crate::error::ApiError;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sink for transient user-facing failure messages.
///
/// The library ships a logging sink; an embedding UI provides its own
/// implementation (toast, status bar, ...).
pub trait Notifier: Send + Sync {
    /// Surface one failure. `key` identifies the failure source
    /// (`err-{status}-{path}`) for display-level dedup.
    fn notify(&self, key: &str, message: &str);
}

/// Default sink: one structured log line per surfaced failure.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, key: &str, message: &str) {
        tracing::info!(%key, "{message}");
    }
}

/// Decides whether a propagated failure reaches the notifier.
pub(crate) struct NotificationGate {
    notifier: Arc<dyn Notifier>,
    dedup_window: Duration,
    recent: Mutex<HashMap<String, Instant>>,
}

impl NotificationGate {
    pub(crate) fn new(notifier: Arc<dyn Notifier>, dedup_window: Duration) -> Self {
        Self {
            notifier,
            dedup_window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Apply the suppression rules and emit when they pass.
    ///
    /// Returns whether a notification fired (tests assert on this).
    pub(crate) fn notify_failure(&self, error: &ApiError, method: &Method, path: &str) -> bool {
        if matches!(error, ApiError::Cancelled) {
            return false;
        }

        let classification = classify(error);
        if !classification.should_notify {
            return false;
        }
        // Benign 401 sources: the signed-out probe and notification polling
        // fire on every page load and would spam the user.
        if classification.status == Some(401)
            && (policy::is_current_user_probe(method, path) || policy::is_notifications_path(path))
        {
            return false;
        }

        let status_key = match classification.status {
            Some(code) => code.to_string(),
            None => "none".to_string(),
        };
        let key = format!("err-{status_key}-{}", policy::normalize_path(path));

        {
            let mut recent = match self.recent.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            recent.retain(|_, shown| shown.elapsed() < self.dedup_window);
            if recent.contains_key(&key) {
                return false;
            }
            recent.insert(key.clone(), Instant::now());
        }

        self.notifier.notify(&key, &classification.user_message);
        true
    }
}

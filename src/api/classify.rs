//! Failure classification for the API client.
//!
//! Every failed exchange maps to exactly one [`Classification`]: a closed
//! taxonomy plus retry, logging, and notification verdicts. Classification is
//! a pure function of the failure signal; the retry and notification layers
//! consume the verdict without re-inspecting the wire error.

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Server,
    Client,
    Validation,
    Authentication,
    Authorization,
    RateLimit,
    Unknown,
}

/// What the failed exchange looked like on the wire, before classification.
///
/// Keeping this a tagged union (rather than branching on an optional status
/// in classifier code) makes the mapping exhaustive under `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSignal {
    /// No HTTP response was received.
    NoResponse(NoResponseReason),
    /// A response arrived with a non-success status code.
    Status(u16),
}

/// Why no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResponseReason {
    /// Connection-level failure.
    Network,
    /// The request exceeded its deadline.
    Timeout,
    /// Cancelled, malformed request, or another local failure.
    Other,
}

/// Structured verdict for one failed exchange.
#[derive(Debug, Clone)]
pub struct Classification {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub retryable: bool,
    /// Base delay before the first retry; backoff scales it per attempt.
    pub retry_delay: Option<Duration>,
    pub user_message: String,
    pub recovery_suggestion: Option<&'static str>,
    pub should_log: bool,
    pub should_notify: bool,
}

/// Derive the wire-level failure signal from an [`ApiError`].
pub fn failure_signal(error: &ApiError) -> FailureSignal {
    match error {
        ApiError::Http(e) if e.is_timeout() => FailureSignal::NoResponse(NoResponseReason::Timeout),
        ApiError::Http(e) if e.is_connect() => FailureSignal::NoResponse(NoResponseReason::Network),
        ApiError::Http(_) | ApiError::Cancelled | ApiError::InvalidResponse(_) => {
            FailureSignal::NoResponse(NoResponseReason::Other)
        }
        ApiError::Status { code, .. } => FailureSignal::Status(*code),
    }
}

/// Classify a failed exchange.
///
/// The server's own `message` wins over the canned text when present.
pub fn classify(error: &ApiError) -> Classification {
    classify_signal(failure_signal(error), error.server_message())
}

/// Pure mapping from failure signal to verdict.
pub fn classify_signal(signal: FailureSignal, server_message: Option<&str>) -> Classification {
    let message = |fallback: &str| {
        server_message
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    };

    match signal {
        FailureSignal::NoResponse(NoResponseReason::Network) => Classification {
            kind: ErrorKind::Network,
            status: None,
            retryable: true,
            retry_delay: Some(Duration::from_millis(1000)),
            user_message: "Cannot reach the server. Check your network connection.".into(),
            recovery_suggestion: Some("Check your internet connection and try again."),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::NoResponse(NoResponseReason::Timeout) => Classification {
            kind: ErrorKind::Timeout,
            status: None,
            retryable: true,
            retry_delay: Some(Duration::from_millis(2000)),
            user_message: "The request timed out. Please try again.".into(),
            recovery_suggestion: Some("Try again in a few seconds or check your connection."),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::NoResponse(NoResponseReason::Other) => Classification {
            kind: ErrorKind::Unknown,
            status: None,
            retryable: false,
            retry_delay: Some(Duration::from_millis(3000)),
            user_message: message("Something went wrong."),
            recovery_suggestion: None,
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(400) => Classification {
            kind: ErrorKind::Client,
            status: Some(400),
            retryable: false,
            retry_delay: None,
            user_message: message("The request was invalid."),
            recovery_suggestion: None,
            should_log: true,
            should_notify: true,
        },
        // Expected during the initial auth probe; kept out of logs and toasts.
        FailureSignal::Status(401) => Classification {
            kind: ErrorKind::Authentication,
            status: Some(401),
            retryable: false,
            retry_delay: None,
            user_message: message("Your session has expired. Please sign in again."),
            recovery_suggestion: Some("Sign in again to continue."),
            should_log: false,
            should_notify: false,
        },
        FailureSignal::Status(403) => Classification {
            kind: ErrorKind::Authorization,
            status: Some(403),
            retryable: false,
            retry_delay: None,
            user_message: message("You do not have permission to access this resource."),
            recovery_suggestion: Some("Contact an administrator if you need access."),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(404) => Classification {
            kind: ErrorKind::Client,
            status: Some(404),
            retryable: false,
            retry_delay: None,
            user_message: message("The requested resource was not found."),
            recovery_suggestion: None,
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(422) => Classification {
            kind: ErrorKind::Validation,
            status: Some(422),
            retryable: false,
            retry_delay: None,
            user_message: message("The submitted data is invalid."),
            recovery_suggestion: Some("Check the entered information and try again."),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(429) => Classification {
            kind: ErrorKind::RateLimit,
            status: Some(429),
            retryable: true,
            retry_delay: Some(Duration::from_millis(5000)),
            user_message: "Too many requests. Please try again shortly.".into(),
            recovery_suggestion: Some("Wait a moment before trying again."),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(code @ (500 | 502 | 503 | 504)) => Classification {
            kind: ErrorKind::Server,
            status: Some(code),
            retryable: true,
            // 503 usually means maintenance; back off harder.
            retry_delay: Some(Duration::from_millis(if code == 503 { 10000 } else { 3000 })),
            user_message: message("A server error occurred. Please try again later."),
            recovery_suggestion: Some(
                "Try again in a few minutes. Contact support if the problem persists.",
            ),
            should_log: true,
            should_notify: true,
        },
        FailureSignal::Status(code) => Classification {
            kind: ErrorKind::Unknown,
            status: Some(code),
            retryable: code >= 500,
            retry_delay: Some(Duration::from_millis(3000)),
            user_message: message("Something went wrong."),
            recovery_suggestion: None,
            should_log: true,
            should_notify: true,
        },
    }
}

/// Extract field-level validation errors from a 422 response.
///
/// The backend sends `{errors: {field: ["msg", ...] | "msg"}}`; the first
/// message per field is kept. Malformed shapes yield `None` rather than an
/// error.
pub fn validation_errors(error: &ApiError) -> Option<BTreeMap<String, String>> {
    let ApiError::Status { code: 422, body, .. } = error else {
        return None;
    };
    let errors = body.errors.as_ref()?;

    let mut out = BTreeMap::new();
    for (field, value) in errors {
        let message = match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => items.first().and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
            _ => None,
        };
        if let Some(message) = message {
            out.insert(field.clone(), message);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// User-facing message for a failure.
pub fn user_message(error: &ApiError) -> String {
    classify(error).user_message
}

/// Log a classified failure at the level its verdict calls for.
pub fn log_failure(error: &ApiError, method: &str, path: &str) {
    let classification = classify(error);
    if !classification.should_log {
        return;
    }
    match classification.kind {
        ErrorKind::Server => {
            tracing::error!(%method, %path, status = ?classification.status, "server error: {error}");
        }
        ErrorKind::Network | ErrorKind::Timeout => {
            tracing::warn!(%method, %path, "transport error: {error}");
        }
        _ => {
            tracing::error!(%method, %path, status = ?classification.status, "request failed: {error}");
        }
    }
}

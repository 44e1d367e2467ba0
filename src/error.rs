//! Unified error types for the storefront client.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ErrorBody
// ---------------------------------------------------------------------------

/// Decoded error envelope returned by the backend (`{message, errors?}`).
///
/// Shapes that don't match degrade to an empty body rather than failing the
/// decode; the raw status is always preserved on [`ApiError`].
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ErrorBody {
    /// Human-readable message from the server, when present.
    pub message: Option<String>,
    /// Field-level validation errors (422): field name to message or
    /// message list.
    pub errors: Option<serde_json::Map<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error (no response was received).
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: ErrorBody,
        /// `Retry-After` header in whole seconds, when the server sent one.
        retry_after_secs: Option<u64>,
    },
    /// The caller cancelled the request before it resolved.
    Cancelled,
    /// The response decoded but did not match the expected shape.
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error from its parts.
    pub fn status(code: u16, body: ErrorBody, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(_) | Self::Cancelled | Self::InvalidResponse(_) => None,
        }
    }

    /// Server-provided message, when a response carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.message.as_deref(),
            _ => None,
        }
    }

    /// `Retry-After` value in seconds, when present.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => match &body.message {
                Some(msg) => write!(f, "status {code}: {msg}"),
                None => write!(f, "status {code}"),
            },
            Self::Cancelled => write!(f, "request cancelled"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn status_error_display_includes_server_message() {
        let body = ErrorBody {
            message: Some("insufficient balance".into()),
            errors: None,
        };
        let e = ApiError::status(400, body, None);
        assert_eq!(e.to_string(), "status 400: insufficient balance");
        assert_eq!(e.status_code(), Some(400));
        assert_eq!(e.server_message(), Some("insufficient balance"));
    }

    #[test]
    fn status_error_display_without_message() {
        let e = ApiError::status(503, ErrorBody::default(), Some(12));
        assert_eq!(e.to_string(), "status 503");
        assert_eq!(e.retry_after_secs(), Some(12));
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(ApiError::Cancelled.to_string(), "request cancelled");
        assert_eq!(ApiError::Cancelled.status_code(), None);
    }

    #[test]
    fn error_body_decodes_partial_shapes() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"nope"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("nope"));
        assert!(body.errors.is_none());

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.message.is_none());
    }
}

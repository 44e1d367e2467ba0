//! HTTP transport: client construction, single-request dispatch, and
//! response decoding.

use crate::error::{ApiError, ErrorBody};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Build the shared HTTP client: timeout, cookie jar, and the standing
/// headers the backend expects from a browser-style client.
pub(super) fn build_http_client(timeout: Duration, jar: Arc<Jar>) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .cookie_provider(jar)
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Dispatch one request and decode the response.
///
/// Success bodies decode to JSON (`Null` for empty bodies); non-2xx statuses
/// become [`ApiError::Status`] with the error envelope decoded best-effort.
pub(super) async fn dispatch_request(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
    csrf_header: Option<(&str, &str)>,
) -> Result<Value, ApiError> {
    let mut request = http.request(method.clone(), url);
    if let Some(body) = body {
        request = request.json(body);
    }
    if let Some((name, token)) = csrf_header {
        request = request.header(name, token);
    }

    tracing::debug!(%method, %url, "dispatching request");
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        // Non-JSON error bodies (proxy HTML, empty) degrade to an empty
        // envelope; the status code still drives classification.
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        return Err(ApiError::status(status.as_u16(), body, retry_after));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {e}")))
}

/// Parse a `Retry-After` header into whole seconds.
///
/// Accepts both delta-seconds and HTTP-date forms.
pub(super) fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(seconds);
    }
    let at = httpdate::parse_http_date(raw).ok()?;
    match at.duration_since(SystemTime::now()) {
        Ok(remaining) => Some(remaining.as_secs()),
        // A date in the past means "retry now".
        Err(_) => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_parses_delta_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(30));
    }

    #[test]
    fn retry_after_parses_http_date() {
        let future = SystemTime::now() + Duration::from_secs(120);
        let formatted = httpdate::fmt_http_date(future);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(&formatted).unwrap());
        let seconds = parse_retry_after(&headers).unwrap();
        assert!((118..=120).contains(&seconds), "got {seconds}");
    }

    #[test]
    fn retry_after_past_date_means_now() {
        let past = SystemTime::now() - Duration::from_secs(60);
        let formatted = httpdate::fmt_http_date(past);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(&formatted).unwrap());
        assert_eq!(parse_retry_after(&headers), Some(0));
    }

    #[test]
    fn retry_after_absent_or_garbage_is_none() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}

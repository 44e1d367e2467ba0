//! API client orchestration.
//!
//! The client facade intentionally remains small:
//! - CSRF cookie bootstrap is delegated to `csrf`.
//! - single-request dispatch is delegated to `transport`.
//! - retry policy logic is delegated to `retry`.
//!
//! Orchestration here covers the retry loop (with cancellation), the
//! one-shot session/CSRF expiry recovery, and surfacing the final failure to
//! the notification gate.

mod csrf;
mod retry;
mod transport;

use crate::api::classify::{classify, log_failure, Classification, ErrorKind};
use crate::api::notify::{LogNotifier, NotificationGate, Notifier};
use crate::api::policy;
use crate::config::Config;
use crate::error::ApiError;
use csrf::CsrfBootstrap;
use reqwest::cookie::Jar;
use reqwest::Method;
use retry::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;

/// Per-request overrides for retry behavior and cancellation.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub max_retries: Option<u32>,
    pub retryable_statuses: Option<Vec<u16>>,
    pub retryable_kinds: Option<Vec<ErrorKind>>,
    /// Invoked before each backoff sleep with the verdict and the retry
    /// number about to run (1-based).
    pub on_retry: Option<Arc<dyn Fn(&Classification, u32) + Send + Sync>>,
    /// Cancellation signal; a `true` value short-circuits the retry loop.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl RequestOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

/// Immutable per-request attempt descriptor threaded through the retry loop.
#[derive(Clone, Copy, Debug, Default)]
struct Attempt {
    /// Retries already taken (0 on the initial request).
    retries: u32,
    /// Whether the one-shot CSRF refresh has been spent.
    csrf_refreshed: bool,
}

impl Attempt {
    fn next_retry(self) -> Self {
        Self {
            retries: self.retries.saturating_add(1),
            ..self
        }
    }

    fn with_csrf_refreshed(self) -> Self {
        Self {
            retries: 0,
            csrf_refreshed: true,
        }
    }
}

/// Resilient client for the storefront REST API.
///
/// Wraps outbound calls with CSRF bootstrap-and-attach, failure
/// classification, bounded retry with exponential backoff, and gated user
/// notification.
pub struct ApiClient {
    http: reqwest::Client,
    api_base_url: String,
    csrf: CsrfBootstrap,
    retry_policy: RetryPolicy,
    gate: NotificationGate,
}

impl ApiClient {
    /// Build a client from resolved configuration with the logging notifier.
    pub fn new(config: &Config) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Build a client with a caller-provided notification sink.
    pub fn with_notifier(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let jar = Arc::new(Jar::default());
        let http = transport::build_http_client(config.api.timeout, jar.clone());
        let csrf = CsrfBootstrap::new(jar, config.api.root_url(), config.api.csrf.clone());
        let retry_policy = RetryPolicy {
            max_retries: config.retry.max_retries,
            retryable_statuses: config.retry.retryable_statuses.clone(),
            ..RetryPolicy::default()
        };
        Self {
            http,
            api_base_url: config.api.api_base_url(),
            csrf,
            retry_policy,
            gate: NotificationGate::new(notifier, config.notify.dedup_window),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Dispatch a request with default options.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.request_with_options(method, path, body, RequestOptions::default())
            .await
    }

    /// Dispatch a request with per-request retry overrides.
    ///
    /// Retryable failures are retried up to the configured ceiling and only
    /// surface after exhaustion; non-retryable failures propagate
    /// immediately. The final failure is logged and offered to the
    /// notification gate exactly once.
    pub async fn request_with_options(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let result = self.dispatch_logical(&method, path, body, &options).await;
        if let Err(err) = &result {
            log_failure(err, method.as_str(), path);
            self.gate.notify_failure(err, &method, path);
        }
        result
    }

    /// Pre-fetch the CSRF cookie, as the login flow does before submitting
    /// credentials. Failures are swallowed here like any bootstrap failure.
    pub async fn prime_csrf(&self) {
        let _ = self.csrf.ensure(&self.http, false).await;
    }

    async fn dispatch_logical(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.api_base_url, policy::normalize_path(path));
        let attempt = Attempt::default();
        let result = self
            .dispatch_with_retries(method, &url, path, body, attempt, options)
            .await;

        // One-shot recovery for session/CSRF expiry: re-bootstrap the cookie
        // and resubmit, once. The login call itself is exempt so a bad
        // password fails straight through.
        let expired = matches!(
            result.as_ref().err().and_then(ApiError::status_code),
            Some(401 | 419)
        );
        if expired && !attempt.csrf_refreshed && !policy::is_login_path(path) {
            tracing::debug!(%path, "session expired; re-bootstrapping csrf and resubmitting");
            let _ = self.csrf.ensure(&self.http, true).await;
            return self
                .dispatch_with_retries(
                    method,
                    &url,
                    path,
                    body,
                    attempt.with_csrf_refreshed(),
                    options,
                )
                .await;
        }

        result
    }

    async fn dispatch_with_retries(
        &self,
        method: &Method,
        url: &str,
        path: &str,
        body: Option<&Value>,
        mut attempt: Attempt,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let retry_policy = self.merged_policy(options);
        loop {
            if options.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            let token = if policy::is_mutation(method) {
                self.csrf.ensure(&self.http, false).await
            } else {
                None
            };
            let csrf_header = token
                .as_deref()
                .map(|token| (self.csrf.header_name(), token));

            let result =
                transport::dispatch_request(&self.http, method.clone(), url, body, csrf_header)
                    .await;
            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let classification = classify(&err);
            if !retry_policy.should_retry(&classification, attempt.retries) {
                return Err(err);
            }
            // Cancellation is re-checked before any backoff is scheduled.
            if options.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            let delay =
                retry_policy.retry_delay_for(&classification, attempt.retries, err.retry_after_secs());
            attempt = attempt.next_retry();
            tracing::debug!(
                %path,
                retry = attempt.retries,
                delay_ms = delay.as_millis() as u64,
                kind = ?classification.kind,
                "retrying after transient failure"
            );
            if let Some(on_retry) = &options.on_retry {
                on_retry(&classification, attempt.retries);
            }

            match options.cancel.clone() {
                Some(mut rx) => {
                    tokio::select! {
                        () = sleep(delay) => {}
                        () = wait_cancelled(&mut rx) => return Err(ApiError::Cancelled),
                    }
                }
                None => sleep(delay).await,
            }
        }
    }

    fn merged_policy(&self, options: &RequestOptions) -> RetryPolicy {
        let mut merged = self.retry_policy.clone();
        if let Some(max) = options.max_retries {
            merged.max_retries = max;
        }
        if let Some(statuses) = &options.retryable_statuses {
            merged.retryable_statuses = statuses.clone();
        }
        if let Some(kinds) = &options.retryable_kinds {
            merged.retryable_kinds = kinds.clone();
        }
        merged
    }
}

/// Resolve once the cancellation signal flips to `true`; never resolves when
/// the sender is gone.
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

//! Resilient HTTP client for the storefront backend.
//!
//! The API layer is split into cohesive modules:
//! - `classify`: failure classification into the closed taxonomy
//! - `notify`: the user-notification gate and sink trait
//! - `policy`: request-path and method rules
//! - `client`: CSRF bootstrap, retry, and dispatch orchestration

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub mod classify;
mod client;
pub mod notify;
pub(crate) mod policy;

pub use client::{ApiClient, RequestOptions};

/// Minimal dispatch interface used by the service wrappers.
///
/// This trait lets tests provide canned responses without network calls
/// while the production path uses [`ApiClient`].
#[async_trait]
pub trait Api: Send + Sync {
    /// Dispatch one request against the versioned API.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError>;

    /// Fetch the CSRF cookie ahead of a credentialed call. No-op by default.
    async fn prime_csrf(&self) {}
}

#[async_trait]
impl Api for ApiClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        ApiClient::request(self, method, path, body).await
    }

    async fn prime_csrf(&self) {
        ApiClient::prime_csrf(self).await;
    }
}

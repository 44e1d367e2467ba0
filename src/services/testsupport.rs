//! Shared mock API for service tests.

use crate::api::Api;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Records dispatched calls and returns one canned response.
pub struct MockApi {
    response: Value,
    calls: Mutex<Vec<(Method, String, Option<Value>)>>,
    csrf_primed: AtomicBool,
}

impl MockApi {
    pub fn returning(response: Value) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
            csrf_primed: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn csrf_primed(&self) -> bool {
        self.csrf_primed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Api for MockApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, path.to_string(), body.cloned()));
        Ok(self.response.clone())
    }

    async fn prime_csrf(&self) {
        self.csrf_primed.store(true, Ordering::SeqCst);
    }
}

//! CSRF cookie bootstrap.
//!
//! The backend issues the CSRF token as a cookie from an endpoint on the API
//! root (not the versioned path). Mutating requests echo the decoded value
//! back in a header. At most one bootstrap call is in flight per client:
//! concurrent mutating requests wait on the same fetch instead of racing
//! their own.

use crate::config::CsrfConfig;
use percent_encoding::percent_decode_str;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Single-flight guard around the cookie-issuing endpoint.
///
/// Owned by the client instance, not module-global, so multiple clients in
/// one process keep independent bootstrap state.
pub(super) struct CsrfBootstrap {
    jar: Arc<Jar>,
    /// API root origin the cookie endpoint and jar lookups resolve against.
    root_url: String,
    config: CsrfConfig,
    inflight: Mutex<()>,
}

impl CsrfBootstrap {
    pub(super) fn new(jar: Arc<Jar>, root_url: String, config: CsrfConfig) -> Self {
        Self {
            jar,
            root_url,
            config,
            inflight: Mutex::new(()),
        }
    }

    /// Current decoded token, when the cookie is already in the jar.
    pub(super) fn token(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.root_url).ok()?;
        let header = self.jar.cookies(&url)?;
        let raw = header.to_str().ok()?;
        let encoded = cookie_value(raw, &self.config.cookie_name)?;
        // Laravel URL-encodes the cookie value; the header wants it decoded.
        percent_decode_str(encoded)
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
    }

    /// Ensure the CSRF cookie exists, fetching it at most once concurrently.
    ///
    /// With `force`, the cookie is re-fetched even when present (session/CSRF
    /// expiry recovery). Bootstrap failures are logged and swallowed: the
    /// request proceeds without a token and the server's rejection stands.
    pub(super) async fn ensure(&self, http: &reqwest::Client, force: bool) -> Option<String> {
        if !force {
            if let Some(token) = self.token() {
                return Some(token);
            }
        }

        let _guard = self.inflight.lock().await;
        if !force {
            // The holder we waited on may have completed the bootstrap.
            if let Some(token) = self.token() {
                return Some(token);
            }
        }

        let url = format!("{}{}", self.root_url, self.config.cookie_endpoint);
        tracing::debug!(%url, "bootstrapping csrf cookie");
        match http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "csrf bootstrap rejected");
            }
            Err(err) => {
                tracing::warn!("csrf bootstrap failed: {err}");
            }
        }
        self.token()
    }

    pub(super) fn header_name(&self) -> &str {
        &self.config.header_name
    }
}

/// Extract one cookie's value from a `name=value; name2=value2` header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "session=abc; XSRF-TOKEN=tok123; other=x";
        assert_eq!(cookie_value(header, "XSRF-TOKEN"), Some("tok123"));
        assert_eq!(cookie_value(header, "session"), Some("abc"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_rejects_prefix_collisions() {
        let header = "XSRF-TOKEN-ALT=wrong; XSRF-TOKEN=right";
        assert_eq!(cookie_value(header, "XSRF-TOKEN"), Some("right"));
    }

    #[test]
    fn token_reads_and_decodes_jar_cookie() {
        let jar = Arc::new(Jar::default());
        let url = reqwest::Url::parse("http://localhost:8000").unwrap();
        jar.add_cookie_str("XSRF-TOKEN=abc%3D123; Path=/", &url);

        let bootstrap = CsrfBootstrap::new(
            jar,
            "http://localhost:8000".into(),
            CsrfConfig::default(),
        );
        assert_eq!(bootstrap.token().as_deref(), Some("abc=123"));
    }

    #[test]
    fn token_is_none_without_cookie() {
        let bootstrap = CsrfBootstrap::new(
            Arc::new(Jar::default()),
            "http://localhost:8000".into(),
            CsrfConfig::default(),
        );
        assert!(bootstrap.token().is_none());
    }
}

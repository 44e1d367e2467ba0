//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`STOREFRONT_BASE_URL`, `STOREFRONT_TIMEOUT_SECS`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./storefront.toml in the current directory
//! 4. $XDG_CONFIG_HOME/storefront/storefront.toml
//!    (or ~/.config/storefront/storefront.toml)
//! 5. Built-in defaults

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];
const DEFAULT_NOTIFY_DEDUP_MS: u64 = 3000;

const CSRF_COOKIE_ENDPOINT: &str = "/sanctum/csrf-cookie";
const CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
const CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Resolved runtime configuration for the API client.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

/// API connection settings used by the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin as configured, without the versioned API suffix.
    pub base_url: String,
    pub timeout: Duration,
    pub csrf: CsrfConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            csrf: CsrfConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Versioned API base: the configured origin with `/api/v1` appended.
    ///
    /// A configured URL already ending in `/api` only gains `/v1`, so both
    /// `https://api.example.com` and `https://api.example.com/api` resolve to
    /// the same prefix.
    pub fn api_base_url(&self) -> String {
        let origin = self.base_url.trim_end_matches('/');
        if origin.ends_with("/api") {
            format!("{origin}/v1")
        } else {
            format!("{origin}/api/v1")
        }
    }

    /// API root used for the CSRF cookie endpoint: the versioned suffix
    /// stripped back off.
    pub fn root_url(&self) -> String {
        let base = self.api_base_url();
        base.trim_end_matches("/api/v1")
            .trim_end_matches("/v1")
            .trim_end_matches("/api")
            .trim_end_matches('/')
            .to_string()
    }
}

/// CSRF cookie/header naming and the bootstrap endpoint.
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Cookie-issuing endpoint, resolved against the API root.
    pub cookie_endpoint: String,
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_endpoint: CSRF_COOKIE_ENDPOINT.into(),
            cookie_name: CSRF_COOKIE_NAME.into(),
            header_name: CSRF_HEADER_NAME.into(),
        }
    }
}

/// Default retry limits; callers can override per request.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

/// Notification dedup behavior.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Window within which a repeated `err-{status}-{path}` key is dropped.
    pub dedup_window: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_millis(DEFAULT_NOTIFY_DEDUP_MS),
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFile,
    retry: RetryFile,
    notify: NotifyFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    csrf_cookie_endpoint: Option<String>,
    csrf_cookie_name: Option<String>,
    csrf_header_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RetryFile {
    max_retries: Option<u32>,
    retryable_statuses: Option<Vec<u16>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NotifyFile {
    dedup_window_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration, applying file values then environment overrides.
pub fn load_config(explicit_path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(path) = resolve_config_path(explicit_path)? {
        let text = std::fs::read_to_string(&path)?;
        let file: ConfigFile = toml::from_str(&text)?;
        apply_file(&mut config, file);
    }

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

fn resolve_config_path(explicit_path: Option<&str>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let local = PathBuf::from("storefront.toml");
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("storefront").join("storefront.toml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

fn apply_file(config: &mut Config, file: ConfigFile) {
    if let Some(url) = file.api.base_url {
        config.api.base_url = url;
    }
    if let Some(secs) = file.api.timeout_secs {
        config.api.timeout = Duration::from_secs(secs);
    }
    if let Some(endpoint) = file.api.csrf_cookie_endpoint {
        config.api.csrf.cookie_endpoint = endpoint;
    }
    if let Some(name) = file.api.csrf_cookie_name {
        config.api.csrf.cookie_name = name;
    }
    if let Some(name) = file.api.csrf_header_name {
        config.api.csrf.header_name = name;
    }
    if let Some(max) = file.retry.max_retries {
        config.retry.max_retries = max;
    }
    if let Some(statuses) = file.retry.retryable_statuses {
        config.retry.retryable_statuses = statuses;
    }
    if let Some(ms) = file.notify.dedup_window_ms {
        config.notify.dedup_window = Duration::from_millis(ms);
    }
}

fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Ok(url) = std::env::var("STOREFRONT_BASE_URL") {
        if !url.trim().is_empty() {
            config.api.base_url = url.trim().to_string();
        }
    }
    if let Ok(secs) = std::env::var("STOREFRONT_TIMEOUT_SECS") {
        let secs: u64 = secs.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("STOREFRONT_TIMEOUT_SECS is not a number: {secs}"))
        })?;
        config.api.timeout = Duration::from_secs(secs);
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url is empty".into()));
    }
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        return Err(ConfigError::Invalid(format!(
            "api.base_url must be http(s): {}",
            config.api.base_url
        )));
    }
    Ok(())
}

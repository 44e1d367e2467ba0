//! Storefront — resilient client for the storefront REST API.
//!
//! This crate wraps outbound HTTP calls with CSRF token bootstrap-and-attach,
//! failure classification into a fixed taxonomy, bounded retry with
//! exponential backoff, and gated user notification. Thin service wrappers
//! cover the auth and catalog endpoints.
//!
//! # Quick start
//!
//! ```no_run
//! use storefront::api::ApiClient;
//! use storefront::config::load_config;
//! use storefront::services::products;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let client = ApiClient::new(&config);
//! for product in products::list(&client).await.unwrap() {
//!     println!("{} {}", product.id, product.name);
//! }
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

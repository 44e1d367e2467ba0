//! Thin endpoint wrappers over the resilient API client.
//!
//! Services stay declarative: build the path and body, dispatch through the
//! [`crate::api::Api`] seam, decode the envelope. Resilience concerns all
//! live in the client.

pub mod auth;
pub mod products;
#[cfg(test)]
pub(crate) mod testsupport;

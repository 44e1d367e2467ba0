//! Request-path and method rules shared by the client layers.
//!
//! The benign-401 predicates deliberately match the exact path shapes the
//! backend exposes today (`GET .../me`, `.../notifications...`); widening the
//! matched set needs confirming against the backend's routes first.

use reqwest::Method;

/// Normalize a caller-supplied path to a single segment list under the
/// versioned API base: leading slashes and a duplicate `v1/` prefix are
/// stripped.
pub(crate) fn normalize_path(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    path.strip_prefix("v1/").unwrap_or(path)
}

/// True for methods that mutate state and therefore need a CSRF token.
pub(crate) fn is_mutation(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// True for the login call, which must fail straight through on 401 rather
/// than taking the one-shot CSRF recovery path.
pub(crate) fn is_login_path(path: &str) -> bool {
    let path = normalize_path(path);
    path == "login" || path.ends_with("/login")
}

/// The initial current-user probe: a GET whose path ends in `/me` (or is
/// exactly `me`). 401 here is the normal signed-out case.
pub(crate) fn is_current_user_probe(method: &Method, path: &str) -> bool {
    if *method != Method::GET {
        return false;
    }
    let path = normalize_path(path);
    path == "me" || path.ends_with("/me")
}

/// Notification polling; 401 here fires on every page load when signed out.
pub(crate) fn is_notifications_path(path: &str) -> bool {
    normalize_path(path).contains("notifications")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_slash_and_duplicate_version() {
        assert_eq!(normalize_path("/products"), "products");
        assert_eq!(normalize_path("v1/products"), "products");
        assert_eq!(normalize_path("/v1/products"), "products");
        assert_eq!(normalize_path("products/3"), "products/3");
    }

    #[test]
    fn mutation_detection_by_method() {
        assert!(is_mutation(&Method::POST));
        assert!(is_mutation(&Method::DELETE));
        assert!(!is_mutation(&Method::GET));
        assert!(!is_mutation(&Method::HEAD));
    }

    #[test]
    fn login_path_matches_exact_segment() {
        assert!(is_login_path("login"));
        assert!(is_login_path("/login"));
        assert!(is_login_path("auth/login"));
        assert!(!is_login_path("login-history"));
    }

    #[test]
    fn current_user_probe_requires_get() {
        assert!(is_current_user_probe(&Method::GET, "/me"));
        assert!(is_current_user_probe(&Method::GET, "me"));
        assert!(!is_current_user_probe(&Method::POST, "/me"));
        assert!(!is_current_user_probe(&Method::GET, "/media"));
    }

    #[test]
    fn notifications_path_is_substring_match() {
        assert!(is_notifications_path("/notifications"));
        assert!(is_notifications_path("notifications/unread-count"));
        assert!(!is_notifications_path("/orders"));
    }
}

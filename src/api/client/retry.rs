//! Retry policy for API requests.

use crate::api::classify::{Classification, ErrorKind};
use std::time::Duration;

/// Delay ceiling for exponential backoff.
const MAX_BACKOFF: Duration = Duration::from_millis(30000);
/// Base delay when a classification carries none.
const FALLBACK_BASE_DELAY: Duration = Duration::from_millis(1000);

pub(crate) const DEFAULT_RETRYABLE_KINDS: [ErrorKind; 4] = [
    ErrorKind::Network,
    ErrorKind::Timeout,
    ErrorKind::Server,
    ErrorKind::RateLimit,
];

/// Bounded retry policy used by `ApiClient`.
#[derive(Clone, Debug)]
pub(crate) struct RetryPolicy {
    /// Upper bound on retries after the initial request.
    pub(crate) max_retries: u32,
    /// Kinds eligible for retry; auth kinds are refused regardless.
    pub(crate) retryable_kinds: Vec<ErrorKind>,
    /// Status codes eligible for retry when the failure carries one.
    pub(crate) retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retryable_kinds: DEFAULT_RETRYABLE_KINDS.to_vec(),
            retryable_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Decide whether another attempt should be scheduled.
    ///
    /// `retries` counts retries already taken for this logical request.
    pub(crate) fn should_retry(&self, classification: &Classification, retries: u32) -> bool {
        if retries >= self.max_retries {
            return false;
        }
        if !classification.retryable {
            return false;
        }
        // Auth failures never retry, even when a caller's custom kind set
        // includes them.
        if matches!(
            classification.kind,
            ErrorKind::Authentication | ErrorKind::Authorization
        ) {
            return false;
        }
        if !self.retryable_kinds.contains(&classification.kind) {
            return false;
        }
        if let Some(status) = classification.status {
            if !self.retryable_statuses.contains(&status) {
                return false;
            }
        }
        true
    }

    /// Compute the backoff delay for the next attempt.
    ///
    /// A server-provided `Retry-After` wins over the computed backoff;
    /// otherwise the classification's base delay doubles per retry, capped at
    /// 30 seconds.
    pub(crate) fn retry_delay_for(
        &self,
        classification: &Classification,
        retries: u32,
        retry_after_secs: Option<u64>,
    ) -> Duration {
        if let Some(seconds) = retry_after_secs {
            return Duration::from_secs(seconds.clamp(1, 300));
        }
        let base = classification.retry_delay.unwrap_or(FALLBACK_BASE_DELAY);
        let pow = 2u32.saturating_pow(retries);
        let millis = base
            .as_millis()
            .saturating_mul(pow as u128)
            .min(MAX_BACKOFF.as_millis());
        Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::classify::{classify_signal, FailureSignal, NoResponseReason};

    fn classification_for_status(code: u16) -> Classification {
        classify_signal(FailureSignal::Status(code), None)
    }

    #[test]
    fn retries_stop_at_configured_max() {
        let policy = RetryPolicy::default();
        let c = classification_for_status(503);
        assert!(policy.should_retry(&c, 0));
        assert!(policy.should_retry(&c, 2));
        assert!(!policy.should_retry(&c, 3));
        assert!(!policy.should_retry(&c, 10));
    }

    #[test]
    fn non_retryable_classifications_are_refused() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&classification_for_status(404), 0));
        assert!(!policy.should_retry(&classification_for_status(422), 0));
    }

    #[test]
    fn auth_failures_never_retry_even_when_opted_in() {
        let policy = RetryPolicy {
            retryable_kinds: vec![ErrorKind::Authentication, ErrorKind::Authorization],
            retryable_statuses: vec![401, 403],
            ..RetryPolicy::default()
        };
        assert!(!policy.should_retry(&classification_for_status(401), 0));
        assert!(!policy.should_retry(&classification_for_status(403), 0));
    }

    #[test]
    fn status_must_be_in_the_retryable_set() {
        let policy = RetryPolicy::default();
        // 429 is a retryable kind but its status is not opted in by default.
        assert!(!policy.should_retry(&classification_for_status(429), 0));

        let opted_in = RetryPolicy {
            retryable_statuses: vec![429, 500, 502, 503, 504],
            ..RetryPolicy::default()
        };
        assert!(opted_in.should_retry(&classification_for_status(429), 0));
    }

    #[test]
    fn no_response_failures_retry_without_a_status_check() {
        let policy = RetryPolicy::default();
        let network = classify_signal(FailureSignal::NoResponse(NoResponseReason::Network), None);
        let timeout = classify_signal(FailureSignal::NoResponse(NoResponseReason::Timeout), None);
        assert!(policy.should_retry(&network, 0));
        assert!(policy.should_retry(&timeout, 0));
    }

    #[test]
    fn backoff_doubles_and_caps_at_thirty_seconds() {
        let policy = RetryPolicy::default();
        let c = classification_for_status(500); // base 3000ms
        assert_eq!(
            policy.retry_delay_for(&c, 0, None),
            Duration::from_millis(3000)
        );
        assert_eq!(
            policy.retry_delay_for(&c, 1, None),
            Duration::from_millis(6000)
        );
        assert_eq!(
            policy.retry_delay_for(&c, 5, None),
            Duration::from_millis(30000)
        );
    }

    #[test]
    fn retry_after_wins_over_backoff_and_is_clamped() {
        let policy = RetryPolicy::default();
        let c = classification_for_status(503);
        assert_eq!(
            policy.retry_delay_for(&c, 0, Some(7)),
            Duration::from_secs(7)
        );
        assert_eq!(
            policy.retry_delay_for(&c, 0, Some(0)),
            Duration::from_secs(1)
        );
        assert_eq!(
            policy.retry_delay_for(&c, 0, Some(86400)),
            Duration::from_secs(300)
        );
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn backoff_is_monotonic_and_bounded(
                code in proptest::sample::select(vec![500u16, 502, 503, 504]),
                retries in 0u32..16
            ) {
                let policy = RetryPolicy::default();
                let c = classification_for_status(code);
                let current = policy.retry_delay_for(&c, retries, None);
                let next = policy.retry_delay_for(&c, retries + 1, None);
                prop_assert!(next >= current);
                prop_assert!(next <= MAX_BACKOFF);
            }
        }
    }
}

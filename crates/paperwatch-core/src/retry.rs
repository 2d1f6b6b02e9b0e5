//! Retry with exponential backoff for source requests

use std::time::Duration;

use crate::http::http_config;
use crate::source::SourceError;

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible request with exponential backoff.
///
/// On retryable errors, logs the failure, sleeps, and retries up to
/// `max_retries` (from the global [`HttpConfig`](crate::HttpConfig)).
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    attempt_fn: impl FnMut() -> Result<T, SourceError>,
) -> Result<T, SourceError> {
    retry_with_policy(label, http_config().max_retries, backoff_duration, attempt_fn)
}

/// Same as [`retry_with_backoff`] with explicit retry budget and delay schedule.
pub fn retry_with_policy<T>(
    label: &str,
    max_retries: u32,
    delay: impl Fn(u32) -> Duration,
    mut attempt_fn: impl FnMut() -> Result<T, SourceError>,
) -> Result<T, SourceError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let wait = delay(attempt);
                log::warn!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying in {wait:?}");
                std::thread::sleep(wait);
            }
            Err(e) => {
                log::error!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> SourceError {
        SourceError::Http {
            status: Some(status),
            message: "test".into(),
        }
    }

    #[test]
    fn backoff_exponential() {
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
        assert_eq!(backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = retry_with_policy("test", 3, |_| Duration::ZERO, || {
            calls += 1;
            if calls < 3 { Err(http_err(503)) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_budget() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_policy("test", 2, |_| Duration::ZERO, || {
            calls += 1;
            Err(http_err(500))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn non_retryable_fails_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_policy("test", 5, |_| Duration::ZERO, || {
            calls += 1;
            Err(http_err(400))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}

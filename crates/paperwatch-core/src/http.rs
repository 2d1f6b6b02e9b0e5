//! Shared HTTP client and runtime.
//!
//! Uses async reqwest internally but presents a blocking interface, so the
//! single-threaded pipeline can call sources without being async itself.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use crate::source::SourceError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide HTTP settings (config file defaults, CLI overrides).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Whole-request timeout; a stalled response fails with a retryable error.
    pub read_timeout: Duration,
    /// Maximum retry attempts for transient failures.
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the HTTP settings. Only the first call wins; later calls are
/// ignored with a debug log.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring {config:?}");
    }
}

/// Current HTTP settings (defaults if never set).
pub fn http_config() -> HttpConfig {
    HTTP_CONFIG.get().copied().unwrap_or_default()
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(http_config().read_timeout)
        .user_agent(concat!("paperwatch/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Blocking GET returning the response body as text.
///
/// Non-2xx statuses become [`SourceError::Http`] carrying the status code.
pub fn get_text(url: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = http_client()
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SourceError::from_reqwest(&e))?;
        response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(&e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_config() {
        let config = HttpConfig::default();
        assert_eq!(config.read_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
    }
}

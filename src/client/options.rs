use serde::Deserialize;
use std::time::Duration;

/// Connection, proxy, timeout and retry settings for the crawl client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Extra attempts after a failed one
    pub retries: u32,

    /// Proxy URL, empty for none
    pub proxy: String,

    /// Per-request timeout in seconds (0 disables it)
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,

    /// First backoff delay between attempts (milliseconds)
    #[serde(rename = "retry-wait-min")]
    pub retry_wait_min_ms: u64,

    /// Upper bound for the backoff delay (milliseconds)
    #[serde(rename = "retry-wait-max")]
    pub retry_wait_max_ms: u64,
}

impl ClientOptions {
    /// Returns the request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retries: 1,
            proxy: String::new(),
            timeout_secs: 10,
            retry_wait_min_ms: 1_000,
            retry_wait_max_ms: 30_000,
        }
    }
}

//! Retry classification and backoff
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Connect / timeout / request error | Retry |
//! | HTTP 5xx except 501 | Retry |
//! | Anything else | Return as-is |

use reqwest::StatusCode;
use std::time::Duration;

/// Returns true if a response status is worth another attempt
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED
}

/// Returns true if a transport error is worth another attempt
pub(crate) fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Delay before retry number `attempt` (1-based): `min * 2^(attempt-1)`, capped at `max`
pub(crate) fn backoff(attempt: u32, min_ms: u64, max_ms: u64) -> Duration {
    let factor = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(min_ms.saturating_mul(factor).min(max_ms))
}

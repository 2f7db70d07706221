//! Steering endpoint error helpers.

use std::time::Duration;

use repe_turn::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Classify a non-success response; the 429 hint comes from `Retry-After`.
pub(crate) fn map_http_status(
    status: reqwest::StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> ProviderError {
    ProviderError::from_status(status.as_u16(), retry_after_header(headers), body)
}

/// `Retry-After` in whole seconds. HTTP-date values yield `None`.
fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Transport failures. A timeout reports the configured bound.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Option<Duration>) -> ProviderError {
    match timeout {
        Some(limit) if err.is_timeout() => ProviderError::Timeout(limit),
        _ => ProviderError::Network(Box::new(err)),
    }
}

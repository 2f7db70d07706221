//! Completions API error helpers.

use std::time::Duration;

use repe_turn::ProviderError;

const RETRY_PHRASE: &str = "retry after ";

/// Classify a non-success response; the 429 hint is read from the error
/// message text, e.g. "Please retry after 20 seconds".
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    ProviderError::from_status(status.as_u16(), retry_after_in_message(body), body)
}

fn retry_after_in_message(body: &str) -> Option<Duration> {
    let lowered = body.to_ascii_lowercase();
    let tail = &lowered[lowered.find(RETRY_PHRASE)? + RETRY_PHRASE.len()..];
    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    tail[..digits].parse().ok().map(Duration::from_secs)
}

/// Transport failures. A timeout reports the configured bound.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Option<Duration>) -> ProviderError {
    match timeout {
        Some(limit) if err.is_timeout() => ProviderError::Timeout(limit),
        _ => ProviderError::Network(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn rate_limit_hint_from_message() {
        let body = r#"{"error":{"message":"Rate limit reached. Please Retry After 60 seconds."}}"#;
        assert!(matches!(
            map_http_status(StatusCode::TOO_MANY_REQUESTS, body),
            ProviderError::RateLimit { retry_after: Some(d) } if d == Duration::from_secs(60)
        ));
    }

    #[test]
    fn rate_limit_without_hint() {
        for body in ["", "slow down", "retry after a while"] {
            assert!(matches!(
                map_http_status(StatusCode::TOO_MANY_REQUESTS, body),
                ProviderError::RateLimit { retry_after: None }
            ));
        }
    }

    #[test]
    fn body_is_kept_for_terminal_errors() {
        assert!(matches!(
            map_http_status(StatusCode::UNAUTHORIZED, "Incorrect API key provided"),
            ProviderError::Authentication(m) if m.starts_with("Incorrect")
        ));
    }
}

//! HTTP plumbing shared by the provider clients.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use parley_types::llm::LlmError;

/// Build a reqwest client with the per-call timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })
}

/// Map a transport-level failure (connect, timeout, body read).
pub(crate) fn transport_error(err: reqwest::Error) -> LlmError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("HTTP request failed: {err}")
    };
    LlmError::Provider { message }
}

/// Turn a non-success response into an [`LlmError`], consuming its body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after_ms = retry_after_ms(response.headers());
    let body = response.text().await.unwrap_or_default();
    error_for_status(status, retry_after_ms, &body)
}

/// `Retry-After` in delay-seconds form, as milliseconds.
///
/// Values that overflow once scaled are treated as absent.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .and_then(|secs| secs.checked_mul(1000))
}

/// Status mapping: 401/403 auth, 429 rate limit, 503/529 overload, rest provider.
pub(crate) fn error_for_status(
    status: StatusCode,
    retry_after_ms: Option<u64>,
    body: &str,
) -> LlmError {
    let message = error_message(body);
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        503 | 529 => LlmError::Overloaded(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// `error.message` from a JSON error envelope, or the raw body.
///
/// Gemini and OpenAI-style APIs both nest the message this way.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                error_for_status(status, None, ""),
                LlmError::AuthenticationFailed
            ));
        }
    }

    #[test]
    fn test_rate_limit_keeps_retry_after() {
        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, Some(30_000), "");
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(30_000)
            }
        ));
    }

    #[test]
    fn test_retry_after_seconds_scaled_to_ms() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, " 30 ".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), Some(30_000));
    }

    #[test]
    fn test_retry_after_overflow_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "18446744073709551615".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), None);

        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, retry_after_ms(&headers), "");
        assert!(matches!(err, LlmError::RateLimited { retry_after_ms: None }));
    }

    #[test]
    fn test_retry_after_http_date_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), None);
        assert_eq!(retry_after_ms(&HeaderMap::new()), None);
    }

    #[test]
    fn test_overloaded() {
        let err = error_for_status(StatusCode::SERVICE_UNAVAILABLE, None, "busy");
        assert_eq!(err.to_string(), "provider overloaded: busy");
    }

    #[test]
    fn test_other_status_extracts_envelope_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let err = error_for_status(StatusCode::BAD_REQUEST, None, body);
        assert_eq!(
            err.to_string(),
            "provider error: HTTP 400 Bad Request: API key not valid."
        );
    }

    #[test]
    fn test_non_json_body_used_verbatim() {
        let err = error_for_status(StatusCode::BAD_GATEWAY, None, " upstream down \n");
        assert_eq!(
            err.to_string(),
            "provider error: HTTP 502 Bad Gateway: upstream down"
        );
    }
}

// crates/attestguard-clients/src/http_support.rs
// ============================================================================
// Module: HTTP Client Support
// Description: Shared client construction, host policy, and transient retry for C2 adapters.
// Purpose: Give every HTTP-based attestation client the same fail-closed posture.
// Dependencies: reqwest, url
// Grounded on: decision-gate-broker::source::http::HttpSource (redirect/host policy),
//              decision-gate-providers::http::HttpProvider (timeout/client construction)
// ============================================================================

//! ## Overview
//! Every HTTP-based adapter (app-info, system-info, NVIDIA, analytics sync,
//! CT log) builds its client the same way: redirects disabled, an explicit
//! per-call timeout inherited from the enclosing task deadline, and up to 2
//! retries with a fixed 200ms backoff on connector-level errors only — a
//! non-2xx response fails closed immediately and is never retried.

use std::thread;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::ClientError;

/// Maximum transient-failure retries before an adapter gives up.
pub const MAX_TRANSIENT_RETRIES: u32 = 2;
/// Fixed backoff between transient retries.
pub const TRANSIENT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Builds a blocking HTTP client with redirects disabled and the given timeout.
///
/// # Errors
///
/// Returns [`ClientError::InvalidRequest`] when the client cannot be built.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .redirect(Policy::none())
        .build()
        .map_err(|err| ClientError::InvalidRequest(format!("http client build failed: {err}")))
}

/// Parses and validates a URL scheme is `https` (or `http` when `allow_http`).
///
/// # Errors
///
/// Returns [`ClientError::InvalidRequest`] when the URL is malformed or the
/// scheme is not permitted.
pub fn parse_url(raw: &str, allow_http: bool) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if allow_http => Ok(url),
        other => Err(ClientError::InvalidRequest(format!("unsupported url scheme: {other}"))),
    }
}

/// Runs `attempt` up to [`MAX_TRANSIENT_RETRIES`] additional times, retrying
/// only connector-level failures (`reqwest::Error::is_connect` / `is_timeout`)
/// with a fixed backoff. Non-2xx responses are the caller's concern and are
/// never retried here.
pub fn with_transient_retry<T>(
    mut attempt: impl FnMut() -> Result<T, reqwest::Error>,
) -> Result<T, ClientError> {
    let mut last_error = None;
    for attempt_index in 0..=MAX_TRANSIENT_RETRIES {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) => {
                let transient = err.is_connect() || err.is_timeout();
                last_error = Some(err);
                if !transient || attempt_index == MAX_TRANSIENT_RETRIES {
                    break;
                }
                thread::sleep(TRANSIENT_RETRY_BACKOFF);
            }
        }
    }
    Err(ClientError::Upstream(
        last_error.map(|err| err.to_string()).unwrap_or_else(|| "request failed".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::parse_url;
    use super::with_transient_retry;
    use crate::error::ClientError;

    #[test]
    fn parse_url_rejects_http_by_default() {
        let result = parse_url("http://example.com", false);
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn parse_url_accepts_https() {
        assert!(parse_url("https://example.com/prpc/Info", false).is_ok());
    }

    #[test]
    fn with_transient_retry_returns_ok_without_retrying() {
        let mut calls = 0;
        let result = with_transient_retry(|| {
            calls += 1;
            Ok::<_, reqwest::Error>(42)
        });
        assert_eq!(result.expect("ok"), 42);
        assert_eq!(calls, 1);
    }
}

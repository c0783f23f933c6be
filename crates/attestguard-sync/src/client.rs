// crates/attestguard-sync/src/client.rs
// ============================================================================
// Module: Analytics HTTP Client
// Description: POSTs to the analytics catalog endpoints and decodes the JSON
//              array response (spec.md §6 "Outbound upstream catalog").
// Purpose: Give the sync engine one fetch-and-parse call per cron tick.
// Dependencies: attestguard-clients, reqwest, serde
// Grounded on: attestguard-clients::system_info::HttpSystemInfoClient (the
//              build_client -> parse_url -> with_transient_retry shape).
// ============================================================================

use std::time::Duration;

use attestguard_clients::build_client;
use attestguard_clients::parse_url;
use attestguard_clients::with_transient_retry;
use serde::de::DeserializeOwned;

use crate::error::SyncError;

/// User agent sent on analytics requests.
const USER_AGENT: &str = "attestguard-sync/0.1";

/// Fetches the analytics catalog at `url`, authenticating with `api_key` via
/// the `X-API-KEY` header, and decodes the response body as `T` (spec.md §6:
/// `POST` with empty body; response is a JSON array).
///
/// # Errors
///
/// Returns [`SyncError::Fetch`] on a transport failure or non-2xx response,
/// and [`SyncError::InvalidPayload`] when the body does not decode as `T`.
pub fn fetch_catalog<T: DeserializeOwned>(
    url: &str,
    api_key: &str,
    timeout_ms: u64,
) -> Result<T, SyncError> {
    let parsed_url = parse_url(url, false)?;
    let client = build_client(Duration::from_millis(timeout_ms), USER_AGENT)?;
    let response = with_transient_retry(|| client.post(parsed_url.clone()).header("X-API-KEY", api_key).send())?;
    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::InvalidPayload(format!("analytics endpoint returned {status}")));
    }
    response.json::<T>().map_err(|err| SyncError::InvalidPayload(err.to_string()))
}

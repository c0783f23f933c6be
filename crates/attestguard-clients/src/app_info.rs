// crates/attestguard-clients/src/app_info.rs
// ============================================================================
// Module: App Info Client
// Description: Adapter to the target application's own `/prpc/Info` endpoint.
// Purpose: Retrieve the app's live quote, event log, compose hash, and cert.
// Dependencies: reqwest, serde_json
// Grounded on: crate::http_support (client construction, transient retry)
// ============================================================================

//! ## Overview
//! `AppInfo` is fetched directly from the application's own TEE over HTTPS
//! (spec.md §6 "App info endpoint"). Responses carry the raw quote bytes
//! hex-encoded, the runtime event log, the raw compose file the app was
//! built from, a device identifier, the TLS certificate presented by the
//! app's gateway-facing endpoint, and the endpoint URL itself. The
//! source-code check hashes `compose_file` itself rather than trusting a
//! self-reported hash, so the quote's RTMR3 event log is the only other
//! party attesting to it.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;
use crate::http_support::build_client;
use crate::http_support::parse_url;
use crate::http_support::with_transient_retry;

/// A single runtime event log entry as reported by the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppEventLogEntry {
    /// Index of the measurement register this event extends.
    pub imr: u8,
    /// Hex-encoded event digest.
    pub digest: String,
    /// Free-form event type, when provided.
    #[serde(default)]
    pub event: Option<String>,
}

/// Attestation evidence reported by the application's own `/prpc/Info` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppInfo {
    /// Hex-encoded raw TDX quote.
    pub quote: String,
    /// Runtime event log entries, in emission order.
    pub event_log: Vec<AppEventLogEntry>,
    /// Raw compose-file contents the running image was built from.
    pub compose_file: String,
    /// Device identifier reported by the TEE.
    pub device_id: String,
    /// PEM-encoded TLS certificate presented by the app's public endpoint.
    pub certificate: String,
    /// The endpoint URL this info was retrieved from.
    pub endpoint: String,
}

/// Narrow capability for retrieving an application's own attestation info.
pub trait AppInfoClient {
    /// Fetches `AppInfo` from the application's info endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the response cannot be parsed.
    fn get_app_info(&self, base_url: &str) -> Result<AppInfo, ClientError>;
}

/// [`AppInfoClient`] backed by an HTTPS GET of `/prpc/Info`.
pub struct HttpAppInfoClient {
    client: reqwest::blocking::Client,
}

impl HttpAppInfoClient {
    /// Builds a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout, "attestguard/0.1")?,
        })
    }
}

impl AppInfoClient for HttpAppInfoClient {
    fn get_app_info(&self, base_url: &str) -> Result<AppInfo, ClientError> {
        let mut url = parse_url(base_url, false)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidRequest("app info base url cannot be a base".to_string()))?;
            segments.pop_if_empty().push("prpc").push("Info");
        }
        let response = with_transient_retry(|| self.client.get(url.clone()).send())?;
        if !response.status().is_success() {
            return Err(ClientError::Upstream(format!("app info status {}", response.status())));
        }
        response
            .json()
            .map_err(|err| ClientError::InvalidResponse(format!("app info body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfoClient;
    use super::HttpAppInfoClient;
    use std::time::Duration;

    #[test]
    fn get_app_info_rejects_non_https_base() {
        let client = HttpAppInfoClient::new(Duration::from_secs(5)).expect("client");
        let result = client.get_app_info("http://app.example.com");
        assert!(result.is_err());
    }
}

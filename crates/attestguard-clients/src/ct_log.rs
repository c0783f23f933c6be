// crates/attestguard-clients/src/ct_log.rs
// ============================================================================
// Module: Certificate Transparency Log Client
// Description: Adapter to a CT-log index (crt.sh or equivalent).
// Purpose: Confirm the live certificate's fingerprint and issuer history for a domain.
// Dependencies: reqwest, serde_json
// Grounded on: crate::http_support (client construction, transient retry)
// ============================================================================

//! ## Overview
//! `verifyCTLog` (spec.md §4.6) requires the live certificate's fingerprint
//! to appear in a CT log, and no unexpected issuer to appear historically
//! for the domain within a configured retention window. This adapter
//! queries `https://crt.sh/?q=<domain>&output=json` (spec.md §9).

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;
use crate::http_support::build_client;
use crate::http_support::with_transient_retry;

/// Default CT-log index query endpoint.
pub const DEFAULT_CT_LOG_URL: &str = "https://crt.sh/";

/// A single certificate entry returned by the CT-log index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CtLogEntry {
    /// Issuer common name, as recorded by the CT log.
    pub issuer_name: String,
    /// SHA-256 fingerprint of the certificate, hex-encoded.
    #[serde(default)]
    pub sha256_fingerprint: Option<String>,
    /// ISO-8601 issuance timestamp, as recorded by the CT log.
    pub not_before: String,
}

/// Narrow capability for querying Certificate Transparency history.
pub trait CtLogClient {
    /// Returns the known CT-log certificate entries for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the response cannot be parsed.
    fn query(&self, domain: &str) -> Result<Vec<CtLogEntry>, ClientError>;
}

/// [`CtLogClient`] backed by an HTTPS GET against a `crt.sh`-shaped index.
pub struct HttpCtLogClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpCtLogClient {
    /// Builds a client against `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout, "attestguard/0.1")?,
            base_url: base_url.into(),
        })
    }
}

impl CtLogClient for HttpCtLogClient {
    fn query(&self, domain: &str) -> Result<Vec<CtLogEntry>, ClientError> {
        let response = with_transient_retry(|| {
            self.client
                .get(&self.base_url)
                .query(&[("q", domain), ("output", "json")])
                .send()
        })?;
        if !response.status().is_success() {
            return Err(ClientError::Upstream(format!("ct log status {}", response.status())));
        }
        response
            .json()
            .map_err(|err| ClientError::InvalidResponse(format!("ct log body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_CT_LOG_URL;

    #[test]
    fn default_url_is_https() {
        assert!(DEFAULT_CT_LOG_URL.starts_with("https://"));
    }
}

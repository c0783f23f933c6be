// crates/attestguard-clients/src/system_info.rs
// ============================================================================
// Module: System Info Client
// Description: Adapter to the gateway's model/domain-derived system-info endpoint.
// Purpose: Discover KMS contract, chain id, and gateway identity before chain-building.
// Dependencies: reqwest, serde_json
// Grounded on: crate::http_support (client construction, transient retry)
// ============================================================================

//! ## Overview
//! `getSystemInfo(contractAddress, model|domain)` (spec.md §4.4) is a
//! class-level discovery call on the app-family verifiers, driving C4's
//! chain construction before any verifier runs. It never performs
//! verification itself; a failure here is the one case that aborts a
//! whole run with `ConfigInvalid` (spec.md §9 "Propagation policy"),
//! because without it no verifier chain can be built at all.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;
use crate::http_support::build_client;
use crate::http_support::parse_url;
use crate::http_support::with_transient_retry;

/// KMS identity and chain parameters discovered from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KmsInfo {
    /// Address of the DstackApp contract governing this deployment.
    pub contract_address: String,
    /// EVM chain id the contract is deployed on.
    pub chain_id: u64,
    /// Application id of the gateway itself.
    pub gateway_app_id: String,
    /// Base URL of the gateway's own endpoint.
    pub gateway_app_url: String,
    /// On-chain registry shape selector: `"legacy"` or a current version string.
    pub version: String,
}

impl KmsInfo {
    /// True when `version` selects the legacy on-chain registry shape.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.version == "legacy"
    }
}

/// Discovery payload returned by the gateway's system-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemInfo {
    /// KMS identity and chain discovery parameters.
    pub kms_info: KmsInfo,
}

/// Narrow capability for discovering system info ahead of chain construction.
pub trait SystemInfoClient {
    /// Fetches `SystemInfo` for a deployment identified by `contract_address`
    /// and a model name or domain.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the response cannot be parsed.
    fn get_system_info(&self, contract_address: &str, target: &str) -> Result<SystemInfo, ClientError>;
}

/// [`SystemInfoClient`] backed by an HTTPS GET of a model/domain-derived URL.
pub struct HttpSystemInfoClient {
    client: reqwest::blocking::Client,
    /// URL template with `{target}` substituted for the model name or domain.
    url_template: String,
}

impl HttpSystemInfoClient {
    /// Builds a client against a URL template (e.g.
    /// `"https://gateway.example.com/system-info/{target}"`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be constructed.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout, "attestguard/0.1")?,
            url_template: url_template.into(),
        })
    }
}

impl SystemInfoClient for HttpSystemInfoClient {
    fn get_system_info(&self, contract_address: &str, target: &str) -> Result<SystemInfo, ClientError> {
        let raw = self.url_template.replace("{target}", target);
        let mut url = parse_url(&raw, false)?;
        url.query_pairs_mut().append_pair("contractAddress", contract_address);
        let response = with_transient_retry(|| self.client.get(url.clone()).send())?;
        if !response.status().is_success() {
            return Err(ClientError::Upstream(format!("system info status {}", response.status())));
        }
        response
            .json()
            .map_err(|err| ClientError::InvalidResponse(format!("system info body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::KmsInfo;

    #[test]
    fn is_legacy_matches_version_string_exactly() {
        let legacy = KmsInfo {
            contract_address: "0xabc".to_string(),
            chain_id: 8453,
            gateway_app_id: "app-gateway".to_string(),
            gateway_app_url: "https://gateway.example.com".to_string(),
            version: "legacy".to_string(),
        };
        assert!(legacy.is_legacy());

        let current = KmsInfo {
            version: "1.0".to_string(),
            ..legacy
        };
        assert!(!current.is_legacy());
    }
}

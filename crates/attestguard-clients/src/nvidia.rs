// crates/attestguard-clients/src/nvidia.rs
// ============================================================================
// Module: NVIDIA Attestation Client
// Description: Adapter for the vendor GPU-attestation remote service.
// Purpose: POST evidence for GPU-exposing apps and return a verdict.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! The NVIDIA adapter posts `{nonce, evidence_list, arch}` to the vendor
//! attestation URL (spec.md §6) and returns a pass/fail verdict used to
//! register the `app-gpu`/`app-gpu-quote` data objects.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;
use crate::http_support::build_client;
use crate::http_support::with_transient_retry;

/// Default NVIDIA remote attestation service URL.
pub const DEFAULT_NRAS_URL: &str = "https://nras.attestation.nvidia.com/v3/attest/gpu";

/// Request body for the NVIDIA remote attestation service.
#[derive(Debug, Clone, Serialize)]
pub struct NvidiaAttestRequest {
    /// Nonce supplied to the GPU to bind the evidence.
    pub nonce: String,
    /// Evidence list collected from the GPU.
    pub evidence_list: Vec<serde_json::Value>,
    /// GPU architecture identifier.
    pub arch: String,
}

/// Verdict returned by the NVIDIA remote attestation service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NvidiaAttestVerdict {
    /// True when every submitted evidence entry is trustworthy.
    #[serde(default)]
    pub overall_result: bool,
    /// Raw verdict payload, retained for the `app-gpu-quote` data object.
    #[serde(flatten)]
    pub raw: serde_json::Value,
}

/// Narrow capability for submitting GPU attestation evidence.
pub trait GpuAttestor {
    /// Submits GPU evidence and returns the vendor's verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the response cannot be parsed.
    fn attest(&self, request: &NvidiaAttestRequest) -> Result<NvidiaAttestVerdict, ClientError>;
}

/// [`GpuAttestor`] backed by the NVIDIA remote attestation HTTPS endpoint.
pub struct NvidiaAttestationClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl NvidiaAttestationClient {
    /// Builds a client against `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout, "attestguard/0.1")?,
            url: url.into(),
        })
    }
}

impl GpuAttestor for NvidiaAttestationClient {
    fn attest(&self, request: &NvidiaAttestRequest) -> Result<NvidiaAttestVerdict, ClientError> {
        let response = with_transient_retry(|| self.client.post(&self.url).json(request).send())?;
        if !response.status().is_success() {
            return Err(ClientError::Upstream(format!(
                "nvidia attestation status {}",
                response.status()
            )));
        }
        response
            .json()
            .map_err(|err| ClientError::InvalidResponse(format!("nvidia attestation body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_NRAS_URL;

    #[test]
    fn default_url_is_https() {
        assert!(DEFAULT_NRAS_URL.starts_with("https://"));
    }
}

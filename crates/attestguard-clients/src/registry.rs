// crates/attestguard-clients/src/registry.rs
// ============================================================================
// Module: On-Chain Registry Client
// Description: Read-only JSON-RPC `eth_call` adapter for the DstackApp contract.
// Purpose: Check compose-hash allowlisting and KMS identity on-chain.
// Dependencies: reqwest, serde_json, crate::keccak
// Grounded on: decision-gate-providers::http::HttpProvider (JSON-RPC-style request/response),
//              crate::http_support (client construction, transient retry)
// ============================================================================

//! ## Overview
//! The DstackApp smart contract exposes `allowedComposeHashes(bytes32) ->
//! bool` and `allowedKmsId() -> bytes32` on its current shape (spec.md §6,
//! §9 "On-chain RPC"). An older deployment shape exposes the KMS identity
//! through a plain `kmsAddress()` getter instead; [`ChainRegistryShape`]
//! selects between the two, driven by `SystemInfo.kms_info.version`
//! (spec.md §9 "Legacy KMS shape"). Both shapes are reached through the
//! same read-only `eth_call`, keyed per chain id by a configured RPC
//! endpoint.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;

use crate::error::ClientError;
use crate::http_support::build_client;
use crate::http_support::parse_url;
use crate::http_support::with_transient_retry;
use crate::keccak::function_selector;

/// Selects which on-chain shape a deployment's KMS identity getter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRegistryShape {
    /// Current shape: `allowedKmsId() -> bytes32`.
    Current,
    /// Legacy shape: `kmsAddress() -> address`, right-padded to 32 bytes in the ABI word.
    Legacy,
}

/// Narrow capability for reading the DstackApp contract's registry state.
pub trait ChainRegistry {
    /// Returns true when `compose_hash` is present in the contract's allowlist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the RPC call fails or the response is malformed.
    fn is_compose_hash_allowed(
        &self,
        chain_id: u64,
        contract_address: &str,
        compose_hash: &[u8; 32],
    ) -> Result<bool, ClientError>;

    /// Returns the on-chain KMS identity for `contract_address`, resolved
    /// according to `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the RPC call fails or the response is malformed.
    fn allowed_kms_id(
        &self,
        chain_id: u64,
        contract_address: &str,
        shape: ChainRegistryShape,
    ) -> Result<[u8; 32], ClientError>;
}

/// [`ChainRegistry`] backed by a plain JSON-RPC `eth_call`, one endpoint per chain id.
pub struct EthJsonRpcChainRegistry {
    client: reqwest::blocking::Client,
    rpc_urls: BTreeMap<u64, String>,
}

impl EthJsonRpcChainRegistry {
    /// Builds a registry client keyed by `rpc_urls` (chain id -> HTTPS endpoint).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the HTTP client cannot be constructed.
    pub fn new(rpc_urls: BTreeMap<u64, String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout, "attestguard/0.1")?,
            rpc_urls,
        })
    }

    fn endpoint_for(&self, chain_id: u64) -> Result<&str, ClientError> {
        self.rpc_urls
            .get(&chain_id)
            .map(String::as_str)
            .ok_or_else(|| ClientError::InvalidRequest(format!("no rpc endpoint configured for chain id {chain_id}")))
    }

    fn eth_call(&self, chain_id: u64, contract_address: &str, calldata: &[u8]) -> Result<[u8; 32], ClientError> {
        let endpoint = self.endpoint_for(chain_id)?;
        let url = parse_url(endpoint, false)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": contract_address,
                    "data": format!("0x{}", hex::encode(calldata)),
                },
                "latest",
            ],
        });
        let response = with_transient_retry(|| self.client.post(url.clone()).json(&body).send())?;
        if !response.status().is_success() {
            return Err(ClientError::Upstream(format!("eth_call status {}", response.status())));
        }
        let parsed: serde_json::Value = response
            .json()
            .map_err(|err| ClientError::InvalidResponse(format!("eth_call body: {err}")))?;
        if let Some(error) = parsed.get("error") {
            return Err(ClientError::Upstream(format!("eth_call rpc error: {error}")));
        }
        let result = parsed
            .get("result")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ClientError::InvalidResponse("eth_call response missing result".to_string()))?;
        decode_word(result)
    }
}

fn decode_word(hex_result: &str) -> Result<[u8; 32], ClientError> {
    let trimmed = hex_result.strip_prefix("0x").unwrap_or(hex_result);
    let bytes = hex::decode(trimmed)
        .map_err(|err| ClientError::InvalidResponse(format!("eth_call result not hex: {err}")))?;
    if bytes.len() < 32 {
        return Err(ClientError::InvalidResponse("eth_call result shorter than one abi word".to_string()));
    }
    let mut word = [0_u8; 32];
    word.copy_from_slice(&bytes[..32]);
    Ok(word)
}

impl ChainRegistry for EthJsonRpcChainRegistry {
    fn is_compose_hash_allowed(
        &self,
        chain_id: u64,
        contract_address: &str,
        compose_hash: &[u8; 32],
    ) -> Result<bool, ClientError> {
        let mut calldata = function_selector("allowedComposeHashes(bytes32)").to_vec();
        calldata.extend_from_slice(compose_hash);
        let word = self.eth_call(chain_id, contract_address, &calldata)?;
        Ok(word[31] != 0)
    }

    fn allowed_kms_id(
        &self,
        chain_id: u64,
        contract_address: &str,
        shape: ChainRegistryShape,
    ) -> Result<[u8; 32], ClientError> {
        let selector = match shape {
            ChainRegistryShape::Current => function_selector("allowedKmsId()"),
            ChainRegistryShape::Legacy => function_selector("kmsAddress()"),
        };
        self.eth_call(chain_id, contract_address, &selector)
    }
}

#[cfg(test)]
mod tests {
    use super::decode_word;

    #[test]
    fn decode_word_reads_bool_from_last_byte() {
        let word = decode_word("0x0000000000000000000000000000000000000000000000000000000000000001")
            .expect("decode");
        assert_eq!(word[31], 1);
    }

    #[test]
    fn decode_word_rejects_short_payload() {
        assert!(decode_word("0x00").is_err());
    }
}

// crates/attestguard-cli/src/wiring.rs
// ============================================================================
// Module: Deployment Wiring
// Description: Builds C6/C8/C2/C7/C9 from one loaded `AttestguardConfig`.
// Purpose: Give every subcommand the same store/blob/clients/queue/sync
//          construction instead of repeating it per command.
// Dependencies: attestguard-blob, attestguard-clients, attestguard-config,
//              attestguard-queue, attestguard-store, attestguard-sync,
//              attestguard-verifiers
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use attestguard_blob::S3BlobStore;
use attestguard_clients::DEFAULT_CT_LOG_URL;
use attestguard_clients::DEFAULT_NRAS_URL;
use attestguard_clients::EthJsonRpcChainRegistry;
use attestguard_clients::HttpAppInfoClient;
use attestguard_clients::HttpCtLogClient;
use attestguard_clients::HttpSystemInfoClient;
use attestguard_clients::NvidiaAttestationClient;
use attestguard_clients::RustlsCertificateFetcher;
use attestguard_clients::SystemDnsCaaResolver;
use attestguard_clients::TdxQuoteTool;
use attestguard_config::AttestguardConfig;
use attestguard_queue::TaskQueue;
use attestguard_store::PostgresStore;
use attestguard_sync::SyncEngine;
use attestguard_verifiers::VerifierClients;

use crate::error::CliError;

/// Ethereum mainnet chain id, keying `ETHEREUM_RPC_URL`.
const ETHEREUM_CHAIN_ID: u64 = 1;
/// Base mainnet chain id, keying `BASE_RPC_URL`.
const BASE_CHAIN_ID: u64 = 8453;

/// Every durable/adapter handle a subcommand might need, built once from
/// `config`.
pub struct Deployment {
    /// Durable task/app/profile store (C6).
    pub store: Arc<PostgresStore>,
    /// Blob store for uploaded reports (C8).
    pub blob: Arc<S3BlobStore>,
    /// Bundle of C2 adapters shared by every verifier chain.
    pub clients: VerifierClients,
    /// Worker-pool handle (C7).
    pub queue: Arc<TaskQueue>,
    /// Analytics-sync engine (C9).
    pub sync: Arc<SyncEngine>,
}

impl Deployment {
    /// Builds every durable/adapter handle from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Unavailable`] when the store or blob connection
    /// cannot be established.
    pub fn build(config: &AttestguardConfig) -> Result<Self, CliError> {
        let store = Arc::new(PostgresStore::new(&config.database)?);
        let blob = Arc::new(S3BlobStore::new(&config.blob)?);
        let clients = build_verifier_clients(config)?;
        let queue = Arc::new(TaskQueue::new(
            Arc::clone(&store),
            Arc::clone(&blob),
            clients.clone(),
            config.queue.clone(),
        ));
        let sync = Arc::new(SyncEngine::new(
            Arc::clone(&store),
            config.sync.clone(),
            Some(Arc::clone(&queue)),
        ));
        Ok(Self {
            store,
            blob,
            clients,
            queue,
            sync,
        })
    }
}

/// Builds the C2 adapter bundle from `config`'s RPC and adapter settings.
fn build_verifier_clients(config: &AttestguardConfig) -> Result<VerifierClients, CliError> {
    let timeout = Duration::from_millis(config.adapters.timeout_ms);

    let mut rpc_urls = BTreeMap::new();
    if let Some(url) = &config.rpc.ethereum_rpc_url {
        rpc_urls.insert(ETHEREUM_CHAIN_ID, url.clone());
    }
    if let Some(url) = &config.rpc.base_rpc_url {
        rpc_urls.insert(BASE_CHAIN_ID, url.clone());
    }

    Ok(VerifierClients {
        quote_decoder: Arc::new(TdxQuoteTool::new(config.adapters.quote_tool_path.clone())),
        app_info: Arc::new(
            HttpAppInfoClient::new(timeout).map_err(|err| CliError::Unavailable(err.to_string()))?,
        ),
        registry: Arc::new(
            EthJsonRpcChainRegistry::new(rpc_urls, timeout)
                .map_err(|err| CliError::Unavailable(err.to_string()))?,
        ),
        gpu: Arc::new(
            NvidiaAttestationClient::new(DEFAULT_NRAS_URL, timeout)
                .map_err(|err| CliError::Unavailable(err.to_string()))?,
        ),
        dns_caa: Arc::new(SystemDnsCaaResolver::new().map_err(|err| CliError::Unavailable(err.to_string()))?),
        ct_log: Arc::new(
            HttpCtLogClient::new(DEFAULT_CT_LOG_URL, timeout)
                .map_err(|err| CliError::Unavailable(err.to_string()))?,
        ),
        system_info: Arc::new(
            HttpSystemInfoClient::new(config.adapters.system_info_url_template.clone(), timeout)
                .map_err(|err| CliError::Unavailable(err.to_string()))?,
        ),
        live_cert: Arc::new(RustlsCertificateFetcher::new().map_err(|err| CliError::Unavailable(err.to_string()))?),
    })
}

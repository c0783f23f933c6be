// crates/attestguard-verifiers/src/clients.rs
// ============================================================================
// Module: Verifier Client Bundle
// Description: Shared, cloneable handle to every C2 adapter a verifier needs.
// Purpose: Let C4 construct one chain's verifiers from one set of adapters.
// Dependencies: attestguard-clients
// ============================================================================

//! ## Overview
//! A verifier is "stateless between calls aside from a small result cache"
//! (spec.md §4.3); the adapters it calls through are owned outside the
//! verifier and shared by reference-counted handle so the chain factory can
//! hand every verifier in a chain the same underlying HTTP/DNS/RPC clients.

use std::sync::Arc;

use attestguard_clients::AppInfoClient;
use attestguard_clients::ChainRegistry;
use attestguard_clients::CtLogClient;
use attestguard_clients::DnsCaaResolver;
use attestguard_clients::GpuAttestor;
use attestguard_clients::LiveCertificateFetcher;
use attestguard_clients::QuoteDecoder;
use attestguard_clients::SystemInfoClient;

/// Bundle of C2 adapters shared by every verifier in one chain.
#[derive(Clone)]
pub struct VerifierClients {
    /// TDX quote decode/verify adapter.
    pub quote_decoder: Arc<dyn QuoteDecoder + Send + Sync>,
    /// Application info endpoint adapter.
    pub app_info: Arc<dyn AppInfoClient + Send + Sync>,
    /// On-chain registry adapter.
    pub registry: Arc<dyn ChainRegistry + Send + Sync>,
    /// NVIDIA GPU attestation adapter.
    pub gpu: Arc<dyn GpuAttestor + Send + Sync>,
    /// DNS CAA resolver.
    pub dns_caa: Arc<dyn DnsCaaResolver + Send + Sync>,
    /// Certificate Transparency log adapter.
    pub ct_log: Arc<dyn CtLogClient + Send + Sync>,
    /// Gateway system-info discovery adapter.
    pub system_info: Arc<dyn SystemInfoClient + Send + Sync>,
    /// Live TLS certificate fetcher for the guarded domain.
    pub live_cert: Arc<dyn LiveCertificateFetcher + Send + Sync>,
}

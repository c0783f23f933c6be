// crates/attestguard-clients/src/lib.rs
// ============================================================================
// Crate: attestguard-clients
// Description: Pure I/O adapters to vendor attestation services, on-chain
//              registries, DNS/CT log lookups, and the target app's info endpoint.
// ============================================================================

//! ## Overview
//! This crate is C2 of the verification pipeline: narrow, stateless
//! capability traits over outside-world I/O (HTTPS, JSON-RPC, DNS, a local
//! subprocess). Every adapter fails closed — no adapter here interprets
//! results; verifiers in `attestguard-verifiers` own that judgment.

pub mod app_info;
pub mod ct_log;
pub mod dns_caa;
pub mod error;
mod http_support;
mod keccak;
pub mod live_cert;
pub mod nvidia;
pub mod quote;
pub mod registry;
pub mod system_info;

pub use app_info::AppEventLogEntry;
pub use app_info::AppInfo;
pub use app_info::AppInfoClient;
pub use app_info::HttpAppInfoClient;
pub use ct_log::CtLogClient;
pub use ct_log::CtLogEntry;
pub use ct_log::HttpCtLogClient;
pub use ct_log::DEFAULT_CT_LOG_URL;
pub use dns_caa::CaaRecord;
pub use dns_caa::DnsCaaResolver;
pub use dns_caa::SystemDnsCaaResolver;
pub use error::ClientError;
pub use http_support::MAX_TRANSIENT_RETRIES;
pub use http_support::TRANSIENT_RETRY_BACKOFF;
pub use http_support::build_client;
pub use http_support::parse_url;
pub use http_support::with_transient_retry;
pub use live_cert::LiveCertificate;
pub use live_cert::LiveCertificateFetcher;
pub use live_cert::RustlsCertificateFetcher;
pub use nvidia::GpuAttestor;
pub use nvidia::NvidiaAttestRequest;
pub use nvidia::NvidiaAttestVerdict;
pub use nvidia::NvidiaAttestationClient;
pub use nvidia::DEFAULT_NRAS_URL;
pub use quote::DecodedQuote;
pub use quote::QuoteDecoder;
pub use quote::QuoteVerification;
pub use quote::TdxQuoteTool;
pub use registry::ChainRegistry;
pub use registry::ChainRegistryShape;
pub use registry::EthJsonRpcChainRegistry;
pub use system_info::HttpSystemInfoClient;
pub use system_info::KmsInfo;
pub use system_info::SystemInfo;
pub use system_info::SystemInfoClient;

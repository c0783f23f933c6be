// crates/attestguard-service/tests/verify_success.rs
// ============================================================================
// Integration test: a full redpill verification run against fake C2 adapters.
// ============================================================================

use std::sync::Arc;

use attestguard_clients::AppEventLogEntry;
use attestguard_clients::AppInfo;
use attestguard_clients::AppInfoClient;
use attestguard_clients::CaaRecord;
use attestguard_clients::ChainRegistry;
use attestguard_clients::ChainRegistryShape;
use attestguard_clients::ClientError;
use attestguard_clients::CtLogClient;
use attestguard_clients::CtLogEntry;
use attestguard_clients::DecodedQuote;
use attestguard_clients::DnsCaaResolver;
use attestguard_clients::GpuAttestor;
use attestguard_clients::KmsInfo;
use attestguard_clients::LiveCertificate;
use attestguard_clients::LiveCertificateFetcher;
use attestguard_clients::NvidiaAttestRequest;
use attestguard_clients::NvidiaAttestVerdict;
use attestguard_clients::QuoteDecoder;
use attestguard_clients::QuoteVerification;
use attestguard_clients::SystemInfo;
use attestguard_clients::SystemInfoClient;
use attestguard_core::VerificationFlags;
use attestguard_core::hashing::EventLogEntry;
use attestguard_core::hashing::replay_rtmr;
use attestguard_core::hashing::sha256_hex;
use attestguard_verifiers::AppConfig;
use attestguard_verifiers::VerifierClients;

const CERT: &str = "tee-cert-pem";
const COMPOSE_FILE: &str = "services:\n  app:\n    image: attestguard-demo:latest\n";
const ZERO_RTMR: &str = "000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

fn compose_hash_hex() -> String {
    sha256_hex(COMPOSE_FILE.as_bytes())
}

/// The RTMR3 value a quote must claim for a compose-hash event log entry to
/// replay to it, computed with the same primitive the source-code check uses.
fn rtmr3_for_compose_event() -> String {
    let digest = hex::decode(compose_hash_hex()).expect("compose hash is hex");
    replay_rtmr(3, &[EventLogEntry { imr: 3, digest }])
}

struct FakeAppInfo;
impl AppInfoClient for FakeAppInfo {
    fn get_app_info(&self, _base_url: &str) -> Result<AppInfo, ClientError> {
        Ok(AppInfo {
            quote: "00".to_string(),
            event_log: vec![AppEventLogEntry {
                imr: 3,
                digest: compose_hash_hex(),
                event: Some("compose-hash".to_string()),
            }],
            compose_file: COMPOSE_FILE.to_string(),
            device_id: "device-1".to_string(),
            certificate: CERT.to_string(),
            endpoint: "https://app.example.test".to_string(),
        })
    }
}

struct FakeQuoteDecoder {
    report_data: String,
}
impl QuoteDecoder for FakeQuoteDecoder {
    fn decode(&self, _quote: &[u8], _hex_encoded: bool, _want_fmspc: bool) -> Result<DecodedQuote, ClientError> {
        Ok(DecodedQuote {
            mrtd: "mrtd-0".to_string(),
            rtmr: [ZERO_RTMR.to_string(), ZERO_RTMR.to_string(), ZERO_RTMR.to_string(), rtmr3_for_compose_event()],
            report_data: self.report_data.clone(),
            fmspc: None,
        })
    }

    fn verify(&self, _quote: &[u8], _hex_encoded: bool) -> Result<QuoteVerification, ClientError> {
        Ok(QuoteVerification { signature_valid: true })
    }
}

struct FakeRegistry;
impl ChainRegistry for FakeRegistry {
    fn is_compose_hash_allowed(
        &self,
        _chain_id: u64,
        _contract_address: &str,
        _compose_hash: &[u8; 32],
    ) -> Result<bool, ClientError> {
        Ok(true)
    }

    fn allowed_kms_id(
        &self,
        _chain_id: u64,
        _contract_address: &str,
        _shape: ChainRegistryShape,
    ) -> Result<[u8; 32], ClientError> {
        Ok([0_u8; 32])
    }
}

struct RejectingRegistry;
impl ChainRegistry for RejectingRegistry {
    fn is_compose_hash_allowed(
        &self,
        _chain_id: u64,
        _contract_address: &str,
        _compose_hash: &[u8; 32],
    ) -> Result<bool, ClientError> {
        Ok(false)
    }

    fn allowed_kms_id(
        &self,
        _chain_id: u64,
        _contract_address: &str,
        _shape: ChainRegistryShape,
    ) -> Result<[u8; 32], ClientError> {
        Ok([0_u8; 32])
    }
}

struct FakeGpu;
impl GpuAttestor for FakeGpu {
    fn attest(&self, _request: &NvidiaAttestRequest) -> Result<NvidiaAttestVerdict, ClientError> {
        Ok(NvidiaAttestVerdict { overall_result: true })
    }
}

struct UnusedDnsCaa;
impl DnsCaaResolver for UnusedDnsCaa {
    fn resolve_caa(&self, _domain: &str) -> Result<Vec<CaaRecord>, ClientError> {
        Err(ClientError::Upstream("not configured for this test".to_string()))
    }
}

struct UnusedCtLog;
impl CtLogClient for UnusedCtLog {
    fn query(&self, _domain: &str) -> Result<Vec<CtLogEntry>, ClientError> {
        Err(ClientError::Upstream("not configured for this test".to_string()))
    }
}

struct UnusedLiveCert;
impl LiveCertificateFetcher for UnusedLiveCert {
    fn fetch(&self, _domain: &str) -> Result<LiveCertificate, ClientError> {
        Err(ClientError::Upstream("not configured for this test".to_string()))
    }
}

struct FakeSystemInfo;
impl SystemInfoClient for FakeSystemInfo {
    fn get_system_info(&self, contract_address: &str, _target: &str) -> Result<SystemInfo, ClientError> {
        Ok(SystemInfo {
            kms_info: KmsInfo {
                contract_address: contract_address.to_string(),
                chain_id: 8453,
                gateway_app_id: "app-gateway".to_string(),
                gateway_app_url: "https://gateway.example.test".to_string(),
                version: "1.0".to_string(),
            },
        })
    }
}

fn clients(registry: Arc<dyn ChainRegistry + Send + Sync>) -> VerifierClients {
    let report_data = sha256_hex(CERT.as_bytes());
    VerifierClients {
        quote_decoder: Arc::new(FakeQuoteDecoder { report_data }),
        app_info: Arc::new(FakeAppInfo),
        registry,
        gpu: Arc::new(FakeGpu),
        dns_caa: Arc::new(UnusedDnsCaa),
        ct_log: Arc::new(UnusedCtLog),
        system_info: Arc::new(FakeSystemInfo),
        live_cert: Arc::new(UnusedLiveCert),
    }
}

fn redpill_config() -> AppConfig {
    AppConfig::Redpill {
        contract_address: "0xabc".to_string(),
        model: "demo-model".to_string(),
        metadata: serde_json::json!({}),
        kms_info_url: None,
    }
}

fn flags() -> VerificationFlags {
    VerificationFlags {
        hardware: true,
        os: true,
        source_code: true,
        tee_controlled_key: true,
        certificate_key: false,
        dns_caa: false,
        ct_log: false,
    }
}

#[test]
fn full_redpill_chain_succeeds_and_produces_a_closed_graph() {
    let clients = clients(Arc::new(FakeRegistry));
    let report = attestguard_service::verify(&clients, redpill_config(), Some(flags()));

    assert!(report.success, "expected success, got errors: {:?}", report.errors);
    assert!(!report.data_objects.is_empty());

    let mut collector = attestguard_core::DataObjectCollector::new();
    for object in report.data_objects {
        collector.register(object);
    }
    assert!(collector.is_closed_graph());
}

#[test]
fn registry_rejection_surfaces_as_a_source_code_error_without_stopping_the_chain() {
    let clients = clients(Arc::new(RejectingRegistry));
    let report = attestguard_service::verify(&clients, redpill_config(), Some(flags()));

    assert!(!report.success);
    assert!(report.errors.iter().any(|err| err.kind == attestguard_core::VerifyErrorKind::RegistryMismatch));
    // Hardware and OS checks still ran for every unit despite the source-code failures.
    assert!(report.data_objects.iter().any(|object| object.name == "kms-quote"));
    assert!(report.data_objects.iter().any(|object| object.name == "app-os"));
}

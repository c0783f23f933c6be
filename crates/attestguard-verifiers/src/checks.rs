// crates/attestguard-verifiers/src/checks.rs
// ============================================================================
// Module: Shared Verification Steps
// Description: Hardware/OS/source-code checks shared by every verifier variant.
// Purpose: Avoid re-deriving identical KMS/gateway/app logic per variant.
// Dependencies: attestguard-clients, attestguard-core, sha2, hex
// ============================================================================

//! ## Overview
//! KMS, gateway, and app verifiers all run the same three steps (spec.md
//! §4.3 "Hardware check", "OS check", "Source-code check"); only the
//! [`attestguard_core::DataObjectKind`] prefix and the subject's endpoint
//! differ. These functions are shared to keep the three variants thin.

use attestguard_clients::AppInfo;
use attestguard_clients::ChainRegistryShape;
use attestguard_core::Calculation;
use attestguard_core::CalculationFunction;
use attestguard_core::DataObject;
use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectField;
use attestguard_core::DataObjectId;
use attestguard_core::DataObjectKind;
use attestguard_core::FieldValue;
use attestguard_core::VerifyError;
use attestguard_core::VerifyErrorKind;
use attestguard_core::hashing;
use sha2::Digest;
use sha2::Sha256;

use crate::clients::VerifierClients;

/// Everything a shared check needs to know about the KMS/gateway/app
/// instance it is running against.
#[derive(Debug, Clone)]
pub struct Subject {
    /// Data-object kind prefix (`kms`, `gateway`, or `app`).
    pub kind: DataObjectKind,
    /// Base URL of the subject's own `/prpc/Info`-shaped endpoint.
    pub info_url: String,
    /// Smart-contract address governing this deployment.
    pub contract_address: String,
    /// EVM chain id the contract is deployed on.
    pub chain_id: u64,
    /// On-chain registry shape (legacy vs current), from `SystemInfo.kms_info.version`.
    pub registry_shape: ChainRegistryShape,
    /// True for app variants that expose a GPU.
    pub has_gpu: bool,
}

fn object_id(kind: DataObjectKind, field: DataObjectField) -> Result<DataObjectId, VerifyError> {
    DataObjectId::new(kind, field).map_err(|err| VerifyError::new(VerifyErrorKind::Internal, err.to_string()))
}

fn upstream(message: impl Into<String>) -> VerifyError {
    VerifyError::new(VerifyErrorKind::UpstreamUnavailable, message.into())
}

fn fetch_app_info(clients: &VerifierClients, subject: &Subject) -> Result<AppInfo, VerifyError> {
    clients
        .app_info
        .get_app_info(&subject.info_url)
        .map_err(|err| upstream(err.to_string()))
}

/// Runs the hardware check for `subject`, registering `*-quote` and `*-cpu`
/// (and, for GPU-exposing subjects, `app-gpu`/`app-gpu-quote`).
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `HardwareInvalid` or `UpstreamUnavailable`.
pub fn run_hardware_check(
    clients: &VerifierClients,
    subject: &Subject,
    collector: &mut DataObjectCollector,
) -> Result<(), VerifyError> {
    let info = fetch_app_info(clients, subject)?;
    let quote_bytes = hex::decode(&info.quote)
        .map_err(|err| VerifyError::new(VerifyErrorKind::HardwareInvalid, format!("quote not hex: {err}")))?;

    let verdict = clients
        .quote_decoder
        .verify(&quote_bytes, false)
        .map_err(|err| upstream(err.to_string()))?;
    if !verdict.signature_valid {
        return Err(VerifyError::new(
            VerifyErrorKind::HardwareInvalid,
            "quote signature verification failed".to_string(),
        ));
    }

    let decoded = clients
        .quote_decoder
        .decode(&quote_bytes, false, true)
        .map_err(|err| upstream(err.to_string()))?;

    // The quote must embed a report-data value binding it to the published
    // certificate (spec.md §4.3 hardware step 5); the same primitive as the
    // gateway's tee-controlled-key check (spec.md §4.3 "Gateway-only checks").
    let cert_fingerprint = hashing::sha256_hex(info.certificate.as_bytes());
    if !decoded.report_data.eq_ignore_ascii_case(&cert_fingerprint) {
        return Err(VerifyError::new(
            VerifyErrorKind::HardwareInvalid,
            "quote report data does not match the application's certificate fingerprint".to_string(),
        ));
    }

    let quote_id = object_id(subject.kind, DataObjectField::Quote)?;
    collector.register(
        DataObject::new(quote_id, format!("{}-quote", subject.kind.prefix()), "Decoded attestation quote")
            .with_field("mrtd", FieldValue::Hex(decoded.mrtd.clone()))
            .with_field("rtmr0", FieldValue::Hex(decoded.rtmr[0].clone()))
            .with_field("rtmr1", FieldValue::Hex(decoded.rtmr[1].clone()))
            .with_field("rtmr2", FieldValue::Hex(decoded.rtmr[2].clone()))
            .with_field("rtmr3", FieldValue::Hex(decoded.rtmr[3].clone()))
            .with_field("report_data", FieldValue::Hex(decoded.report_data.clone()))
            .with_field("signature_valid", FieldValue::Json(serde_json::Value::Bool(true))),
    );

    let cpu_id = object_id(subject.kind, DataObjectField::Cpu)?;
    collector.register(
        DataObject::new(cpu_id, format!("{}-cpu", subject.kind.prefix()), "Hardware description")
            .with_field("manufacturer", FieldValue::Text("Intel".to_string()))
            .with_field("fmspc", decoded.fmspc.clone().map_or(FieldValue::Text(String::new()), FieldValue::Hex)),
    );

    // The certificate presented by this subject's own endpoint is the
    // identity the gateway-only checks and the fixed cross-verifier
    // relationships (spec.md §4.5) reason about; it is registered here
    // because this is the one place the subject's `AppInfo` is already in
    // hand, not because it is itself part of the hardware check.
    let main_id = object_id(subject.kind, DataObjectField::Main)?;
    collector.register(
        DataObject::new(main_id, format!("{}-main", subject.kind.prefix()), "Subject identity")
            .with_field("cert_pubkey", FieldValue::Text(info.certificate.clone()))
            .with_field("endpoint", FieldValue::Url(info.endpoint.clone())),
    );

    if subject.has_gpu {
        let nonce = decoded.report_data.clone();
        let verdict = clients
            .gpu
            .attest(&attestguard_clients::NvidiaAttestRequest {
                nonce,
                evidence_list: Vec::new(),
                arch: "hopper".to_string(),
            })
            .map_err(|err| upstream(err.to_string()))?;

        let gpu_quote_id = object_id(DataObjectKind::App, DataObjectField::GpuQuote)?;
        collector.register(
            DataObject::new(gpu_quote_id, "app-gpu-quote", "GPU attestation verdict")
                .with_field("overall_result", FieldValue::Json(serde_json::Value::Bool(verdict.overall_result))),
        );
        let gpu_id = object_id(DataObjectKind::App, DataObjectField::Gpu)?;
        collector.register(DataObject::new(gpu_id, "app-gpu", "GPU description"));
    }

    Ok(())
}

/// Runs the OS check for `subject`: reproduces MRTD/RTMR0..3 from the event
/// log and compares against the decoded quote.
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `OsMismatch` or `UpstreamUnavailable`.
pub fn run_os_check(
    clients: &VerifierClients,
    subject: &Subject,
    collector: &mut DataObjectCollector,
) -> Result<(), VerifyError> {
    let info = fetch_app_info(clients, subject)?;
    let quote_bytes = hex::decode(&info.quote)
        .map_err(|err| VerifyError::new(VerifyErrorKind::OsMismatch, format!("quote not hex: {err}")))?;
    let decoded = clients
        .quote_decoder
        .decode(&quote_bytes, false, false)
        .map_err(|err| upstream(err.to_string()))?;

    let events: Vec<hashing::EventLogEntry> = info
        .event_log
        .iter()
        .filter_map(|entry| hex::decode(&entry.digest).ok().map(|digest| hashing::EventLogEntry { imr: entry.imr, digest }))
        .collect();

    let os_id = object_id(subject.kind, DataObjectField::Os)?;
    let mut os_object = DataObject::new(os_id, format!("{}-os", subject.kind.prefix()), "Operating-system measurement");

    for index in 0_u8..=3 {
        let replayed = hashing::replay_rtmr(index, &events);
        let claimed = decoded.rtmr[index as usize].trim_start_matches("0x");
        if !replayed.eq_ignore_ascii_case(claimed) {
            return Err(VerifyError::new(
                VerifyErrorKind::OsMismatch,
                format!("rtmr{index} replay mismatch: computed {replayed}, quote claims {claimed}"),
            ));
        }
        os_object = os_object.with_field(format!("rtmr{index}"), FieldValue::Hex(replayed));
    }
    os_object = os_object.with_calculation(Calculation {
        inputs: vec!["event_log".to_string()],
        function: CalculationFunction::ReplayRtmr,
        outputs: vec!["rtmr0".to_string(), "rtmr1".to_string(), "rtmr2".to_string(), "rtmr3".to_string()],
    });
    collector.register(os_object);

    let os_code_id = object_id(subject.kind, DataObjectField::OsCode)?;
    collector.register(
        DataObject::new(os_code_id, format!("{}-os-code", subject.kind.prefix()), "Reproducible build linkage")
            .with_calculation(Calculation {
                inputs: vec!["source".to_string()],
                function: CalculationFunction::ReproducibleBuild,
                outputs: vec!["artifact".to_string()],
            }),
    );

    Ok(())
}

/// Runs the source-code check for `subject`: hashes the compose file,
/// confirms the hash is the one the quote's RTMR3 event log attests to, and
/// checks on-chain allowlisting.
///
/// # Errors
///
/// Returns [`VerifyError`] of kind `OsMismatch` (compose hash absent from the
/// RTMR3 event log), `RegistryMismatch`, or `UpstreamUnavailable`.
pub fn run_source_code_check(
    clients: &VerifierClients,
    subject: &Subject,
    collector: &mut DataObjectCollector,
) -> Result<(), VerifyError> {
    let info = fetch_app_info(clients, subject)?;
    let compose_hash = Sha256::digest(info.compose_file.as_bytes());
    let compose_hash_hex = hex::encode(compose_hash);

    // spec.md §4.3 source-code step 2: the locally computed compose hash
    // must equal the value captured in the quote's RTMR3 event log, not
    // merely a value the app self-reports.
    let recorded_on_rtmr3 = info
        .event_log
        .iter()
        .any(|entry| entry.imr == 3 && entry.digest.eq_ignore_ascii_case(&compose_hash_hex));
    if !recorded_on_rtmr3 {
        return Err(VerifyError::new(
            VerifyErrorKind::OsMismatch,
            format!("compose hash {compose_hash_hex} not found in quote's rtmr3 event log"),
        ));
    }

    let code_id = object_id(subject.kind, DataObjectField::Code)?;
    collector.register(
        DataObject::new(code_id, format!("{}-code", subject.kind.prefix()), "Source-code descriptor")
            .with_field("compose_hash", FieldValue::Hex(compose_hash_hex.clone()))
            .with_field("device_id", FieldValue::Text(info.device_id.clone()))
            .with_calculation(Calculation {
                inputs: vec!["compose_file".to_string()],
                function: CalculationFunction::Sha256,
                outputs: vec!["compose_hash".to_string()],
            }),
    );

    let mut hash_bytes = [0_u8; 32];
    hash_bytes.copy_from_slice(&compose_hash);
    let allowed = clients
        .registry
        .is_compose_hash_allowed(subject.chain_id, &subject.contract_address, &hash_bytes)
        .map_err(|err| upstream(err.to_string()))?;
    if !allowed {
        return Err(VerifyError::new(
            VerifyErrorKind::RegistryMismatch,
            format!("compose hash {compose_hash_hex} not present in on-chain allowlist"),
        ));
    }

    clients
        .registry
        .allowed_kms_id(subject.chain_id, &subject.contract_address, subject.registry_shape)
        .map_err(|err| upstream(err.to_string()))?;

    Ok(())
}

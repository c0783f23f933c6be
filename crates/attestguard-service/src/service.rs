// crates/attestguard-service/src/service.rs
// ============================================================================
// Module: Verification Service
// Description: C5 — runs a built verifier chain to completion and assembles
//              the final report.
// Purpose: Orchestrate discovery, chain execution, and cross-verifier wiring.
// Dependencies: attestguard-clients, attestguard-core, attestguard-verifiers
// ============================================================================

//! ## Overview
//! `verify` (spec.md §4.5) is the one entry point C7's workers call per
//! task: it discovers `SystemInfo`, builds the ordered verifier chain (C4),
//! runs every step of every unit against one [`DataObjectCollector`], wires
//! the fixed KMS -> Gateway -> App relationships, and assembles the final
//! [`VerificationResponse`]. Only a `SystemInfo` discovery failure aborts
//! the whole run before any chain exists; every other step failure is
//! collected and the run continues (spec.md §9 "Propagation policy").

use attestguard_clients::SystemInfo;
use attestguard_core::DataObjectCollector;
use attestguard_core::VerificationFlags;
use attestguard_core::VerificationResponse;
use attestguard_core::VerifyError;
use attestguard_verifiers::AppConfig;
use attestguard_verifiers::GatewayCapabilities;
use attestguard_verifiers::PhalaCloudVerifier;
use attestguard_verifiers::RedpillVerifier;
use attestguard_verifiers::Verifier;
use attestguard_verifiers::VerifierClients;
use attestguard_verifiers::build_chain;

use crate::relationships::wire_cross_verifier_relationships;

fn discover_system_info(clients: &VerifierClients, config: &AppConfig) -> Result<SystemInfo, VerifyError> {
    match config {
        AppConfig::Redpill { contract_address, model, .. } => {
            RedpillVerifier::get_system_info(clients, contract_address, model)
        }
        AppConfig::PhalaCloud { contract_address, domain, .. } => {
            PhalaCloudVerifier::get_system_info(clients, contract_address, domain)
        }
    }
}

/// Runs a full verification against `config`, merging `flags` (or the
/// default all-enabled profile when `None`) over the step defaults.
///
/// A discovery failure produces a single-error report with no data
/// objects; every other step failure is collected and does not stop the
/// chain from continuing to run its remaining steps (spec.md §9
/// "Propagation policy").
#[must_use]
pub fn verify(clients: &VerifierClients, config: AppConfig, flags: Option<VerificationFlags>) -> VerificationResponse {
    let flags = flags.unwrap_or_default().merged_with_defaults(VerificationFlags::default());

    let system_info = match discover_system_info(clients, &config) {
        Ok(info) => info,
        Err(err) => return VerificationResponse::new(Vec::new(), vec![err.with_step("discovery")]),
    };

    let mut collector = DataObjectCollector::new();
    let mut chain = build_chain(clients, &config, &system_info);
    let mut errors = Vec::new();

    for unit in &mut chain {
        let label = unit.label();

        if let Err(err) = unit.verify_hardware(&mut collector, &flags) {
            errors.push(err.with_step(format!("{label}.hardware")));
        }
        if let Err(err) = unit.verify_operating_system(&mut collector, &flags) {
            errors.push(err.with_step(format!("{label}.os")));
        }
        if let Err(err) = unit.verify_source_code(&mut collector, &flags) {
            errors.push(err.with_step(format!("{label}.source_code")));
        }

        if let Some(gateway) = unit.as_gateway_capabilities_mut() {
            run_gateway_checks(gateway, &mut collector, &flags, label, &mut errors);
        }
    }

    wire_cross_verifier_relationships(&mut collector, system_info.kms_info.is_legacy());
    VerificationResponse::new(collector.snapshot(), errors)
}

fn run_gateway_checks(
    gateway: &mut dyn GatewayCapabilities,
    collector: &mut DataObjectCollector,
    flags: &VerificationFlags,
    label: &str,
    errors: &mut Vec<VerifyError>,
) {
    if flags.tee_controlled_key {
        if let Err(err) = gateway.verify_tee_controlled_key(collector) {
            errors.push(err.with_step(format!("{label}.tee_controlled_key")));
        }
    }
    if flags.certificate_key {
        if let Err(err) = gateway.verify_certificate_key(collector) {
            errors.push(err.with_step(format!("{label}.certificate_key")));
        }
    }
    if flags.dns_caa {
        if let Err(err) = gateway.verify_dns_caa(collector) {
            errors.push(err.with_step(format!("{label}.dns_caa")));
        }
    }
    if flags.ct_log {
        if let Err(err) = gateway.verify_ct_log(collector) {
            errors.push(err.with_step(format!("{label}.ct_log")));
        }
    }
}

// crates/attestguard-verifiers/src/gateway.rs
// ============================================================================
// Module: Gateway Verifier
// Description: Verifies the gateway's attestation chain plus domain-trust checks.
// Purpose: Base {hardware, os, source} capability set plus TEE-key/cert/CAA/CT-log checks.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! `GatewayVerifier` (spec.md §4.3) adds `{verifyTeeControlledKey,
//! verifyCertificateKey, verifyDnsCAA, verifyCTLog}` on top of the base
//! capability set; only this variant implements [`GatewayCapabilities`], and
//! C4 downcasts to it explicitly when wiring domain checks (spec.md §9
//! "Chain polymorphism").

use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectKind;
use attestguard_core::VerificationFlags;
use attestguard_core::VerifyError;

use crate::capability::GatewayCapabilities;
use crate::capability::Verifier;
use crate::checks::Subject;
use crate::checks::run_hardware_check;
use crate::checks::run_os_check;
use crate::checks::run_source_code_check;
use crate::clients::VerifierClients;
use crate::gateway_checks;

/// Domain-trust configuration for one gateway instance.
#[derive(Debug, Clone)]
pub struct GatewayDomainConfig {
    /// The domain the gateway guards with a TEE-bound TLS certificate.
    pub domain: String,
    /// CAA issuer expected to be authorized for `domain`.
    pub expected_caa_issuer: String,
    /// CAA account URI expected to be authorized for `domain`.
    pub expected_caa_account: String,
    /// Issuers considered trusted for CT-log history on `domain`.
    pub trusted_ct_issuers: Vec<String>,
}

/// Verifies the gateway's own attestation chain and the domains it guards.
pub struct GatewayVerifier {
    clients: VerifierClients,
    subject: Subject,
    metadata: serde_json::Value,
    domain_config: GatewayDomainConfig,
}

impl GatewayVerifier {
    /// Builds a gateway verifier for `subject`, guarding `domain_config.domain`.
    #[must_use]
    pub fn new(
        clients: VerifierClients,
        subject: Subject,
        metadata: serde_json::Value,
        domain_config: GatewayDomainConfig,
    ) -> Self {
        debug_assert_eq!(subject.kind, DataObjectKind::Gateway);
        Self { clients, subject, metadata, domain_config }
    }
}

impl Verifier for GatewayVerifier {
    fn contract_address(&self) -> &str {
        &self.subject.contract_address
    }

    fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    fn verify_hardware(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        if !flags.hardware {
            return Ok(());
        }
        run_hardware_check(&self.clients, &self.subject, collector)
    }

    fn verify_operating_system(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        if !flags.os {
            return Ok(());
        }
        run_os_check(&self.clients, &self.subject, collector)
    }

    fn verify_source_code(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        if !flags.source_code {
            return Ok(());
        }
        run_source_code_check(&self.clients, &self.subject, collector)
    }
}

impl GatewayCapabilities for GatewayVerifier {
    fn verify_tee_controlled_key(
        &mut self,
        collector: &mut DataObjectCollector,
    ) -> Result<(), VerifyError> {
        gateway_checks::verify_tee_controlled_key(collector)
    }

    fn verify_certificate_key(
        &mut self,
        collector: &mut DataObjectCollector,
    ) -> Result<(), VerifyError> {
        gateway_checks::verify_certificate_key(&self.clients, collector, &self.domain_config.domain)
    }

    fn verify_dns_caa(&mut self, _collector: &mut DataObjectCollector) -> Result<(), VerifyError> {
        gateway_checks::verify_dns_caa(
            &self.clients,
            &self.domain_config.domain,
            &self.domain_config.expected_caa_issuer,
            &self.domain_config.expected_caa_account,
        )
    }

    fn verify_ct_log(&mut self, _collector: &mut DataObjectCollector) -> Result<(), VerifyError> {
        let trusted: Vec<&str> = self.domain_config.trusted_ct_issuers.iter().map(String::as_str).collect();
        gateway_checks::verify_ct_log(&self.clients, &self.domain_config.domain, &trusted)
    }
}

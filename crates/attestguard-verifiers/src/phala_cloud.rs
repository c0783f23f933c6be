// crates/attestguard-verifiers/src/phala_cloud.rs
// ============================================================================
// Module: Phala Cloud Verifier
// Description: App variant parameterised by domain.
// Purpose: Base {hardware, os, source} capability set for a phala-cloud-hosted app.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! `PhalaCloudVerifier` (spec.md §4.3) mirrors [`crate::redpill::RedpillVerifier`]
//! but is keyed by domain rather than model name.

use attestguard_clients::SystemInfo;
use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectKind;
use attestguard_core::VerificationFlags;
use attestguard_core::VerifyError;
use attestguard_core::VerifyErrorKind;

use crate::capability::Verifier;
use crate::checks::Subject;
use crate::checks::run_hardware_check;
use crate::checks::run_os_check;
use crate::checks::run_source_code_check;
use crate::clients::VerifierClients;

/// Verifies a phala-cloud-hosted application, parameterised by `domain`.
pub struct PhalaCloudVerifier {
    clients: VerifierClients,
    subject: Subject,
    metadata: serde_json::Value,
    domain: String,
}

impl PhalaCloudVerifier {
    /// Builds a phala-cloud app verifier for `subject`, serving `domain`.
    #[must_use]
    pub fn new(clients: VerifierClients, subject: Subject, metadata: serde_json::Value, domain: String) -> Self {
        debug_assert_eq!(subject.kind, DataObjectKind::App);
        Self { clients, subject, metadata, domain }
    }

    /// The domain this verifier was constructed for.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Class-level discovery: fetches `SystemInfo` for `contract_address`
    /// and `domain` without running any verification (spec.md §4.3 "Static
    /// discovery"). Drives C4.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `ConfigInvalid` or `UpstreamUnavailable`.
    pub fn get_system_info(
        clients: &VerifierClients,
        contract_address: &str,
        domain: &str,
    ) -> Result<SystemInfo, VerifyError> {
        clients
            .system_info
            .get_system_info(contract_address, domain)
            .map_err(|err| VerifyError::new(VerifyErrorKind::ConfigInvalid, err.to_string()))
    }
}

impl Verifier for PhalaCloudVerifier {
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

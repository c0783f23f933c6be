// crates/attestguard-verifiers/src/redpill.rs
// ============================================================================
// Module: Redpill Verifier
// Description: App variant parameterised by model name.
// Purpose: Base {hardware, os, source} capability set for a redpill-hosted app.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! `RedpillVerifier` (spec.md §4.3) is an app variant keyed by model name
//! rather than domain; its static `getSystemInfo` (spec.md §4.3 "Static
//! discovery") drives C4's chain construction before any verifier runs.

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

/// Verifies a redpill-hosted application, parameterised by `model`.
pub struct RedpillVerifier {
    clients: VerifierClients,
    subject: Subject,
    metadata: serde_json::Value,
    model: String,
}

impl RedpillVerifier {
    /// Builds a redpill app verifier for `subject`, serving `model`.
    #[must_use]
    pub fn new(clients: VerifierClients, subject: Subject, metadata: serde_json::Value, model: String) -> Self {
        debug_assert_eq!(subject.kind, DataObjectKind::App);
        Self { clients, subject, metadata, model }
    }

    /// The model name this verifier was constructed for.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Class-level discovery: fetches `SystemInfo` for `contract_address`
    /// and `model` without running any verification (spec.md §4.3 "Static
    /// discovery"). Drives C4.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `ConfigInvalid` or `UpstreamUnavailable`.
    pub fn get_system_info(
        clients: &VerifierClients,
        contract_address: &str,
        model: &str,
    ) -> Result<SystemInfo, VerifyError> {
        clients
            .system_info
            .get_system_info(contract_address, model)
            .map_err(|err| VerifyError::new(VerifyErrorKind::ConfigInvalid, err.to_string()))
    }
}

impl Verifier for RedpillVerifier {
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

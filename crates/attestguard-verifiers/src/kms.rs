// crates/attestguard-verifiers/src/kms.rs
// ============================================================================
// Module: KMS Verifier
// Description: Verifies the key-management service's own attestation chain.
// Purpose: KMS-in-production variant of the base {hardware, os, source} capability set.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! `KmsVerifier` (spec.md §4.3) has two sub-variants distinguished only by
//! on-chain registry shape (legacy vs current); the verification steps
//! themselves are identical (spec.md §9 "Legacy KMS shape"), so the shape is
//! carried as data on [`crate::checks::Subject`] rather than as a second type.

use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectKind;
use attestguard_core::VerificationFlags;
use attestguard_core::VerifyError;

use crate::capability::Verifier;
use crate::checks::Subject;
use crate::checks::run_hardware_check;
use crate::checks::run_os_check;
use crate::checks::run_source_code_check;
use crate::clients::VerifierClients;

/// Verifies the KMS's own hardware, OS, and source-code posture.
pub struct KmsVerifier {
    clients: VerifierClients,
    subject: Subject,
    metadata: serde_json::Value,
}

impl KmsVerifier {
    /// Builds a KMS verifier for `subject`, carrying opaque `metadata` from
    /// system-info discovery.
    #[must_use]
    pub fn new(clients: VerifierClients, subject: Subject, metadata: serde_json::Value) -> Self {
        debug_assert_eq!(subject.kind, DataObjectKind::Kms);
        Self { clients, subject, metadata }
    }
}

impl Verifier for KmsVerifier {
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

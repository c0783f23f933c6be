// crates/attestguard-verifiers/src/capability.rs
// ============================================================================
// Module: Verifier Capability Traits
// Description: The polymorphic capability set every verifier variant satisfies.
// Purpose: Give C5 a uniform interface over a closed set of verifier variants.
// Dependencies: attestguard-core
// ============================================================================

//! ## Overview
//! Every verifier variant is polymorphic over `{verifyHardware,
//! verifyOperatingSystem, verifySourceCode, getMetadata}` (spec.md §4.3).
//! The gateway variant additionally satisfies [`GatewayCapabilities`]. The
//! variant set itself is closed and encoded as tagged enum variants rather
//! than a base class (spec.md §9 "Chain polymorphism"); the chain factory
//! downcasts to [`GatewayCapabilities`] only when wiring domain checks.

use attestguard_core::DataObjectCollector;
use attestguard_core::VerificationFlags;
use attestguard_core::VerifyError;

/// The base capability set every verifier variant implements.
pub trait Verifier {
    /// Smart-contract address this verifier was constructed against.
    fn contract_address(&self) -> &str;

    /// Opaque runtime metadata captured from system-info discovery.
    fn metadata(&self) -> &serde_json::Value;

    /// Verifies the quote signature and hardware description, registering
    /// `*-quote` and `*-cpu` data objects (and `app-gpu`/`app-gpu-quote` for
    /// GPU-exposing app variants).
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `HardwareInvalid` or `UpstreamUnavailable`.
    fn verify_hardware(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError>;

    /// Reproduces MRTD/RTMR0..3 from the event log and compares against the quote.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `OsMismatch` or `UpstreamUnavailable`.
    fn verify_operating_system(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError>;

    /// Computes the compose hash and checks it against the on-chain registry.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `RegistryMismatch` or `UpstreamUnavailable`.
    fn verify_source_code(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError>;
}

/// Gateway-only capabilities, narrower than [`Verifier`] (spec.md §4.3
/// "Gateway-only checks"). Only the `GatewayVerifier` variant implements this.
pub trait GatewayCapabilities {
    /// Asserts the gateway's certificate signing key is bound into its TEE quote.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `DomainUntrusted`.
    fn verify_tee_controlled_key(
        &mut self,
        collector: &mut DataObjectCollector,
    ) -> Result<(), VerifyError>;

    /// Asserts the live TLS certificate's public key matches the TEE-bound key.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `DomainUntrusted`.
    fn verify_certificate_key(
        &mut self,
        collector: &mut DataObjectCollector,
    ) -> Result<(), VerifyError>;

    /// Resolves CAA records and asserts issuance is restricted to the gateway's account.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `DomainUntrusted`.
    fn verify_dns_caa(&mut self, collector: &mut DataObjectCollector) -> Result<(), VerifyError>;

    /// Asserts the live certificate's fingerprint appears in a CT log with no
    /// unexpected historical issuers.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] of kind `DomainUntrusted`.
    fn verify_ct_log(&mut self, collector: &mut DataObjectCollector) -> Result<(), VerifyError>;
}

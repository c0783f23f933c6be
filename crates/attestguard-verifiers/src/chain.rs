// crates/attestguard-verifiers/src/chain.rs
// ============================================================================
// Module: Verifier Chain Unit
// Description: Closed, tagged enum over the four verifier variants.
// Purpose: Let C5 run a chain without matching on concrete verifier types.
// Dependencies: attestguard-core
// ============================================================================

//! ## Overview
//! The verifier variant set is closed: `KmsVerifier`, `GatewayVerifier`,
//! `RedpillVerifier`, `PhalaCloudVerifier`. [`VerifierUnit`] encodes that as
//! tagged enum variants dispatching to [`Verifier`], rather than a base
//! class (spec.md §9 "Chain polymorphism"). Only the `Gateway` variant
//! exposes [`GatewayCapabilities`]; [`VerifierUnit::as_gateway_capabilities_mut`]
//! is the one place the chain factory "downcasts" to it.

use attestguard_core::DataObjectCollector;
use attestguard_core::VerificationFlags;
use attestguard_core::VerifyError;

use crate::capability::GatewayCapabilities;
use crate::capability::Verifier;
use crate::gateway::GatewayVerifier;
use crate::kms::KmsVerifier;
use crate::phala_cloud::PhalaCloudVerifier;
use crate::redpill::RedpillVerifier;

/// One verifier in an ordered chain (spec.md §4.3, §4.4).
pub enum VerifierUnit {
    /// KMS-in-production variant.
    Kms(KmsVerifier),
    /// Gateway variant, the only one with domain-trust capabilities.
    Gateway(GatewayVerifier),
    /// Redpill app variant, parameterised by model.
    Redpill(RedpillVerifier),
    /// Phala Cloud app variant, parameterised by domain.
    PhalaCloud(PhalaCloudVerifier),
}

impl VerifierUnit {
    /// Returns a short, stable name for logging and error attribution.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Kms(_) => "kms",
            Self::Gateway(_) => "gateway",
            Self::Redpill(_) => "app.redpill",
            Self::PhalaCloud(_) => "app.phala_cloud",
        }
    }

    /// Returns this unit as `&mut dyn GatewayCapabilities` when it is the
    /// gateway variant, `None` otherwise.
    pub fn as_gateway_capabilities_mut(&mut self) -> Option<&mut dyn GatewayCapabilities> {
        match self {
            Self::Gateway(verifier) => Some(verifier),
            Self::Kms(_) | Self::Redpill(_) | Self::PhalaCloud(_) => None,
        }
    }
}

impl Verifier for VerifierUnit {
    fn contract_address(&self) -> &str {
        match self {
            Self::Kms(verifier) => verifier.contract_address(),
            Self::Gateway(verifier) => verifier.contract_address(),
            Self::Redpill(verifier) => verifier.contract_address(),
            Self::PhalaCloud(verifier) => verifier.contract_address(),
        }
    }

    fn metadata(&self) -> &serde_json::Value {
        match self {
            Self::Kms(verifier) => verifier.metadata(),
            Self::Gateway(verifier) => verifier.metadata(),
            Self::Redpill(verifier) => verifier.metadata(),
            Self::PhalaCloud(verifier) => verifier.metadata(),
        }
    }

    fn verify_hardware(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        match self {
            Self::Kms(verifier) => verifier.verify_hardware(collector, flags),
            Self::Gateway(verifier) => verifier.verify_hardware(collector, flags),
            Self::Redpill(verifier) => verifier.verify_hardware(collector, flags),
            Self::PhalaCloud(verifier) => verifier.verify_hardware(collector, flags),
        }
    }

    fn verify_operating_system(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        match self {
            Self::Kms(verifier) => verifier.verify_operating_system(collector, flags),
            Self::Gateway(verifier) => verifier.verify_operating_system(collector, flags),
            Self::Redpill(verifier) => verifier.verify_operating_system(collector, flags),
            Self::PhalaCloud(verifier) => verifier.verify_operating_system(collector, flags),
        }
    }

    fn verify_source_code(
        &mut self,
        collector: &mut DataObjectCollector,
        flags: &VerificationFlags,
    ) -> Result<(), VerifyError> {
        match self {
            Self::Kms(verifier) => verifier.verify_source_code(collector, flags),
            Self::Gateway(verifier) => verifier.verify_source_code(collector, flags),
            Self::Redpill(verifier) => verifier.verify_source_code(collector, flags),
            Self::PhalaCloud(verifier) => verifier.verify_source_code(collector, flags),
        }
    }
}

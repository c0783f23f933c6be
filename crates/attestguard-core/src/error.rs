// crates/attestguard-core/src/error.rs
// ============================================================================
// Module: Attestguard Error Kinds
// Description: Closed enumeration of verification error kinds shared across crates.
// Purpose: Give every verifier, client, and service a single vocabulary of failure.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! `VerifyErrorKind` is the closed set of error kinds from the propagation
//! policy: a failed verifier step raises one of these, the verification
//! service collects them into the report's error list, and only
//! [`VerifyErrorKind::ConfigInvalid`] raised during system-info discovery
//! aborts the whole run.

use thiserror::Error;

/// Stable error kind raised by a verifier step or an attestation client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerifyErrorKind {
    /// Caller supplied an impossible combination (e.g. unknown app id).
    ConfigInvalid,
    /// An attestation client returned a transport error or non-2xx response.
    UpstreamUnavailable,
    /// Quote signature check failed or report-data mismatch.
    HardwareInvalid,
    /// Register replay disagreed with the quote.
    OsMismatch,
    /// The on-chain registry did not acknowledge a compose hash or KMS id.
    RegistryMismatch,
    /// TEE-key, certificate-key, CAA, or CT-log check failed.
    DomainUntrusted,
    /// The task deadline elapsed.
    DeadlineExceeded,
    /// Unexpected condition; implementation bug.
    Internal,
}

impl VerifyErrorKind {
    /// Returns the stable short code used in persisted reports and logs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigInvalid => "config_invalid",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::HardwareInvalid => "hardware_invalid",
            Self::OsMismatch => "os_mismatch",
            Self::RegistryMismatch => "registry_mismatch",
            Self::DomainUntrusted => "domain_untrusted",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for VerifyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single verification-step failure, carried in [`crate::report::VerificationResponse::errors`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{kind}: {message}")]
pub struct VerifyError {
    /// Stable error kind.
    pub kind: VerifyErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Name of the verifier step that raised this error, when applicable.
    pub step: Option<String>,
}

impl VerifyError {
    /// Builds a new verify error.
    #[must_use]
    pub fn new(kind: VerifyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            step: None,
        }
    }

    /// Attaches the step name that produced this error.
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::VerifyError;
    use super::VerifyErrorKind;

    #[test]
    fn code_round_trips_through_display() {
        for kind in [
            VerifyErrorKind::ConfigInvalid,
            VerifyErrorKind::UpstreamUnavailable,
            VerifyErrorKind::HardwareInvalid,
            VerifyErrorKind::OsMismatch,
            VerifyErrorKind::RegistryMismatch,
            VerifyErrorKind::DomainUntrusted,
            VerifyErrorKind::DeadlineExceeded,
            VerifyErrorKind::Internal,
        ] {
            assert_eq!(kind.to_string(), kind.code());
        }
    }

    #[test]
    fn with_step_attaches_name() {
        let err = VerifyError::new(VerifyErrorKind::OsMismatch, "rtmr0 mismatch")
            .with_step("gateway.os");
        assert_eq!(err.step.as_deref(), Some("gateway.os"));
    }
}

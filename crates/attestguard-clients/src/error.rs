// crates/attestguard-clients/src/error.rs
// ============================================================================
// Module: Attestation Client Errors
// Description: The typed error kind every C2 adapter fails with.
// Purpose: Let verifiers map a client failure onto a VerifyErrorKind uniformly.
// Dependencies: attestguard-core, thiserror
// ============================================================================

//! ## Overview
//! Every adapter in this crate returns [`ClientError`] so verifiers can treat
//! all attestation I/O the same way: a transport-level failure is always
//! [`attestguard_core::VerifyErrorKind::UpstreamUnavailable`] once mapped.

use attestguard_core::VerifyErrorKind;
use thiserror::Error;

/// Error raised by an attestation client adapter.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote endpoint returned a transport error or non-2xx response.
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    /// The response could not be parsed into the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The caller supplied an invalid request (bad URL, missing config).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Maps this client error onto the shared verifier error-kind vocabulary.
    #[must_use]
    pub const fn kind(&self) -> VerifyErrorKind {
        match self {
            Self::Upstream(_) => VerifyErrorKind::UpstreamUnavailable,
            Self::InvalidResponse(_) | Self::InvalidRequest(_) => VerifyErrorKind::ConfigInvalid,
        }
    }
}

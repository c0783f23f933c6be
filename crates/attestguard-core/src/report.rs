// crates/attestguard-core/src/report.rs
// ============================================================================
// Module: Verification Response
// Description: The final report emitted by the verification service (C5).
// Purpose: Bundle the measurement graph, errors, and pass/fail outcome.
// Dependencies: serde, crate::{data_object, error, time}
// ============================================================================

//! ## Overview
//! `VerificationResponse` is `{dataObjects, completedAt, errors, success}`
//! per spec.md §4.5. A report with `success = true` carries no errors; one
//! with `success = false` carries at least one error and may still carry
//! partial data objects from steps that ran before the failure.

use serde::Deserialize;
use serde::Serialize;

use crate::data_object::DataObject;
use crate::error::VerifyError;
use crate::time::Timestamp;

/// The measurement-graph report produced by one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    /// All data objects registered during the run, in insertion order.
    pub data_objects: Vec<DataObject>,
    /// Time the report was assembled.
    pub completed_at: Timestamp,
    /// Errors raised by verifier steps during the run.
    pub errors: Vec<VerifyError>,
    /// True when `errors` is empty.
    pub success: bool,
}

impl VerificationResponse {
    /// Builds a report from its parts, deriving `success` from `errors`.
    #[must_use]
    pub fn new(data_objects: Vec<DataObject>, errors: Vec<VerifyError>) -> Self {
        let success = errors.is_empty();
        Self {
            data_objects,
            completed_at: Timestamp::now(),
            errors,
            success,
        }
    }

    /// Returns the closed-enumeration ids of every data object in the report.
    #[must_use]
    pub fn data_object_ids(&self) -> Vec<String> {
        self.data_objects.iter().map(|object| object.id.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::VerificationResponse;
    use crate::error::VerifyError;
    use crate::error::VerifyErrorKind;

    #[test]
    fn success_reflects_empty_errors() {
        let report = VerificationResponse::new(Vec::new(), Vec::new());
        assert!(report.success);
        let failed = VerificationResponse::new(
            Vec::new(),
            vec![VerifyError::new(VerifyErrorKind::OsMismatch, "rtmr0 mismatch")],
        );
        assert!(!failed.success);
    }
}

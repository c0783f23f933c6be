// crates/attestguard-core/src/app.rs
// ============================================================================
// Module: Application Record
// Description: The synced application row (spec.md §3 "Application").
// Purpose: Hold the upstream-mirrored metadata that anchors a verification task.
// Dependencies: serde, crate::{identifiers, time}
// ============================================================================

//! ## Overview
//! An [`Application`] is created or updated by the sync engine (C9) and
//! soft-deleted (never hard-deleted) when absent upstream. Verification never
//! mutates an application row.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::AppId;
use crate::time::Timestamp;

/// The app-config variant selecting which verifier family applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppConfigType {
    /// A model-hosted application verified against a model name.
    Redpill,
    /// A domain-hosted application verified against a custom domain.
    PhalaCloud,
}

impl AppConfigType {
    /// Returns the wire-stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redpill => "redpill",
            Self::PhalaCloud => "phala_cloud",
        }
    }
}

impl std::fmt::Display for AppConfigType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The synced application row. Primary key is [`AppId`] (the dstack application id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Dstack application id; primary key.
    pub id: AppId,
    /// Numeric upstream profile id.
    pub profile_id: i64,
    /// Display name.
    pub display_name: String,
    /// Config variant selecting the verifier family.
    pub app_config_type: AppConfigType,
    /// Smart-contract address.
    pub contract_address: String,
    /// Domain (for `phala_cloud`) or model name (for `redpill`).
    pub domain_or_model: String,
    /// Base-image string, which encodes the dstack version.
    pub base_image: String,
    /// Numeric upstream workspace id.
    pub workspace_id: i64,
    /// Numeric upstream creator id.
    pub creator_id: i64,
    /// Upstream username.
    pub username: String,
    /// Upstream email.
    pub email: String,
    /// Derived `customUser` label.
    pub custom_user: String,
    /// Public-listing flag.
    pub is_public: bool,
    /// True when the row is absent from the upstream catalog.
    pub deleted: bool,
    /// Row creation time.
    pub created_at: Timestamp,
    /// Row last-update time.
    pub updated_at: Timestamp,
    /// Time of the most recent successful sync touching this row.
    pub last_synced_at: Option<Timestamp>,
}

impl Application {
    /// Returns the model name when this is a [`AppConfigType::Redpill`] app.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        matches!(self.app_config_type, AppConfigType::Redpill).then_some(self.domain_or_model.as_str())
    }

    /// Returns the domain when this is a [`AppConfigType::PhalaCloud`] app.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        matches!(self.app_config_type, AppConfigType::PhalaCloud)
            .then_some(self.domain_or_model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfigType;

    #[test]
    fn display_matches_wire_string() {
        assert_eq!(AppConfigType::Redpill.to_string(), "redpill");
        assert_eq!(AppConfigType::PhalaCloud.to_string(), "phala_cloud");
    }
}

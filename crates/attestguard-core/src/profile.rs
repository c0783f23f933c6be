// crates/attestguard-core/src/profile.rs
// ============================================================================
// Module: Profile Record
// Description: The synced profile row (spec.md §3 "Profile").
// Purpose: Mirror upstream display metadata for apps, users, and workspaces.
// Dependencies: serde, crate::{identifiers, time}
// ============================================================================

//! ## Overview
//! A [`Profile`] is unique by `(entity_type, entity_id)`. It is mirrored from
//! upstream by the sync engine and is never mutated by verification.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ProfileRowId;
use crate::time::Timestamp;

/// The kind of entity a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileEntityType {
    /// An application entity.
    App,
    /// A user entity.
    User,
    /// A workspace entity.
    Workspace,
}

impl ProfileEntityType {
    /// Returns the wire-stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::User => "user",
            Self::Workspace => "workspace",
        }
    }
}

impl std::fmt::Display for ProfileEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The synced profile row. Unique by `(entity_type, entity_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Surrogate row id.
    pub id: ProfileRowId,
    /// Entity kind.
    pub entity_type: ProfileEntityType,
    /// Upstream numeric entity id.
    pub entity_id: i64,
    /// Display name.
    pub display_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Custom domain associated with the entity.
    pub custom_domain: Option<String>,
    /// Row creation time.
    pub created_at: Timestamp,
    /// Row last-update time.
    pub updated_at: Timestamp,
}

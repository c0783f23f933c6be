// crates/attestguard-store/src/profiles.rs
// ============================================================================
// Module: Profiles Table
// Description: CRUD and sync-upsert operations over the `profiles` table.
// Purpose: Mirror upstream display metadata, keyed by (entityType, entityId).
// Dependencies: attestguard-core, postgres, uuid
// ============================================================================

use attestguard_core::Profile;
use attestguard_core::ProfileEntityType;
use attestguard_core::ProfileRowId;
use attestguard_core::Timestamp;

use crate::error::StoreError;
use crate::store::PostgresStore;

/// One upstream profile record to upsert (spec.md §4.9 "Profile sync").
#[derive(Debug, Clone)]
pub struct ProfileUpsert {
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
    /// Custom domain.
    pub custom_domain: Option<String>,
}

fn row_to_profile(row: &postgres::Row) -> Result<Profile, StoreError> {
    let entity_type: String = row.get("entity_type");
    let entity_type = match entity_type.as_str() {
        "app" => ProfileEntityType::App,
        "user" => ProfileEntityType::User,
        "workspace" => ProfileEntityType::Workspace,
        other => return Err(StoreError::Invalid(format!("unknown entity_type {other}"))),
    };
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Profile {
        id: ProfileRowId::new(row.get::<_, String>("id")),
        entity_type,
        entity_id: row.get("entity_id"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        description: row.get("description"),
        custom_domain: row.get("custom_domain"),
        created_at: Timestamp::parse(&created_at).map_err(|err| StoreError::Invalid(err.to_string()))?,
        updated_at: Timestamp::parse(&updated_at).map_err(|err| StoreError::Invalid(err.to_string()))?,
    })
}

impl PostgresStore {
    /// Inserts or updates one profile row, keyed by `(entity_type, entity_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn upsert_profile(&self, record: ProfileUpsert) -> Result<Profile, StoreError> {
        let mut conn = self.connection()?;
        let now = Timestamp::now().to_rfc3339();
        let new_id = uuid::Uuid::new_v4().to_string();
        let row = conn
            .query_one(
                "INSERT INTO profiles (id, entity_type, entity_id, display_name, avatar_url, \
                 description, custom_domain, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, \
                 $6, $7, $8, $8) ON CONFLICT (entity_type, entity_id) DO UPDATE SET display_name \
                 = EXCLUDED.display_name, avatar_url = EXCLUDED.avatar_url, description = \
                 EXCLUDED.description, custom_domain = EXCLUDED.custom_domain, updated_at = $8 \
                 RETURNING id, entity_type, entity_id, display_name, avatar_url, description, \
                 custom_domain, created_at, updated_at",
                &[
                    &new_id,
                    &record.entity_type.as_str(),
                    &record.entity_id,
                    &record.display_name,
                    &record.avatar_url,
                    &record.description,
                    &record.custom_domain,
                    &now,
                ],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row_to_profile(&row)
    }

    /// Fetches one profile by `(entity_type, entity_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn get_profile(
        &self,
        entity_type: ProfileEntityType,
        entity_id: i64,
    ) -> Result<Option<Profile>, StoreError> {
        let mut conn = self.connection()?;
        let row = conn
            .query_opt(
                "SELECT * FROM profiles WHERE entity_type = $1 AND entity_id = $2",
                &[&entity_type.as_str(), &entity_id],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.as_ref().map(row_to_profile).transpose()
    }
}

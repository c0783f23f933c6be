// crates/attestguard-store/src/apps.rs
// ============================================================================
// Module: Apps Table
// Description: CRUD and sync-upsert operations over the `apps` table.
// Purpose: Give C9 (sync) and C10 (task API) durable application records.
// Dependencies: attestguard-core, postgres
// ============================================================================

//! ## Overview
//! `upsert_app` is the sync-engine write path (spec.md §4.9 step 5):
//! `ON CONFLICT (id) DO UPDATE`, always setting `last_synced_at = now` and
//! `deleted = false` (reintroduction after tombstoning clears the flag
//! without creating a duplicate row, spec.md §8 invariant 6).
//! `tombstone_missing` is step 6: rows absent from the current sync batch
//! are flipped to `deleted = true`.

use attestguard_core::AppConfigType;
use attestguard_core::AppId;
use attestguard_core::Application;
use attestguard_core::Timestamp;

use crate::error::StoreError;
use crate::store::PostgresStore;

/// The fields the sync engine derives for one upstream app record before
/// upserting (spec.md §4.9 steps 1-4).
#[derive(Debug, Clone)]
pub struct AppUpsert {
    /// Dstack application id; primary key.
    pub id: AppId,
    /// Numeric upstream profile id.
    pub profile_id: i64,
    /// Display name.
    pub display_name: String,
    /// Derived config variant.
    pub app_config_type: AppConfigType,
    /// Derived contract address (empty when the base image predates 0.5.1).
    pub contract_address: String,
    /// Derived domain-or-model string.
    pub domain_or_model: String,
    /// Raw base-image string.
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
    /// Public-listing flag (`listed` in the upstream record).
    pub is_public: bool,
}

fn row_to_application(row: &postgres::Row) -> Result<Application, StoreError> {
    let app_config_type: String = row.get("app_config_type");
    let app_config_type = match app_config_type.as_str() {
        "redpill" => AppConfigType::Redpill,
        "phala_cloud" => AppConfigType::PhalaCloud,
        other => return Err(StoreError::Invalid(format!("unknown app_config_type {other}"))),
    };
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let last_synced_at: Option<String> = row.get("last_synced_at");
    Ok(Application {
        id: AppId::new(row.get::<_, String>("id")),
        profile_id: row.get("profile_id"),
        display_name: row.get("display_name"),
        app_config_type,
        contract_address: row.get("contract_address"),
        domain_or_model: row.get("domain_or_model"),
        base_image: row.get("base_image"),
        workspace_id: row.get("workspace_id"),
        creator_id: row.get("creator_id"),
        username: row.get("username"),
        email: row.get("email"),
        custom_user: row.get("custom_user"),
        is_public: row.get("is_public"),
        deleted: row.get("deleted"),
        created_at: Timestamp::parse(&created_at).map_err(|err| StoreError::Invalid(err.to_string()))?,
        updated_at: Timestamp::parse(&updated_at).map_err(|err| StoreError::Invalid(err.to_string()))?,
        last_synced_at: last_synced_at
            .map(|value| Timestamp::parse(&value))
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?,
    })
}

impl PostgresStore {
    /// Inserts or updates one application row from a sync batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn upsert_app(&self, record: AppUpsert) -> Result<Application, StoreError> {
        let mut conn = self.connection()?;
        let now = Timestamp::now().to_rfc3339();
        let row = conn
            .query_one(
                "INSERT INTO apps (id, profile_id, display_name, app_config_type, \
                 contract_address, domain_or_model, base_image, workspace_id, creator_id, \
                 username, email, custom_user, is_public, deleted, created_at, updated_at, \
                 last_synced_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                 FALSE, $14, $14, $14) ON CONFLICT (id) DO UPDATE SET profile_id = \
                 EXCLUDED.profile_id, display_name = EXCLUDED.display_name, app_config_type = \
                 EXCLUDED.app_config_type, contract_address = EXCLUDED.contract_address, \
                 domain_or_model = EXCLUDED.domain_or_model, base_image = EXCLUDED.base_image, \
                 workspace_id = EXCLUDED.workspace_id, creator_id = EXCLUDED.creator_id, \
                 username = EXCLUDED.username, email = EXCLUDED.email, custom_user = \
                 EXCLUDED.custom_user, is_public = EXCLUDED.is_public, deleted = FALSE, \
                 updated_at = $14, last_synced_at = $14 RETURNING id, profile_id, display_name, \
                 app_config_type, contract_address, domain_or_model, base_image, workspace_id, \
                 creator_id, username, email, custom_user, is_public, deleted, created_at, \
                 updated_at, last_synced_at",
                &[
                    &record.id.as_str(),
                    &record.profile_id,
                    &record.display_name,
                    &record.app_config_type.as_str(),
                    &record.contract_address,
                    &record.domain_or_model,
                    &record.base_image,
                    &record.workspace_id,
                    &record.creator_id,
                    &record.username,
                    &record.email,
                    &record.custom_user,
                    &record.is_public,
                    &now,
                ],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row_to_application(&row)
    }

    /// Marks every non-deleted app absent from `seen_ids` as `deleted = true`
    /// (spec.md §4.9 step 6, "tombstoning"). Returns the number of rows
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn tombstone_missing_apps(&self, seen_ids: &[AppId]) -> Result<u64, StoreError> {
        let mut conn = self.connection()?;
        let ids: Vec<&str> = seen_ids.iter().map(AppId::as_str).collect();
        let now = Timestamp::now().to_rfc3339();
        let affected = conn
            .execute(
                "UPDATE apps SET deleted = TRUE, updated_at = $1 WHERE deleted = FALSE AND NOT \
                 (id = ANY($2))",
                &[&now, &ids],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(affected)
    }

    /// Fetches one application by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn get_app(&self, id: &AppId) -> Result<Option<Application>, StoreError> {
        let mut conn = self.connection()?;
        let row = conn
            .query_opt("SELECT * FROM apps WHERE id = $1", &[&id.as_str()])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.as_ref().map(row_to_application).transpose()
    }

    /// Lists applications, optionally filtered to public and non-deleted only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on a database error.
    pub fn list_apps(&self, public_only: bool) -> Result<Vec<Application>, StoreError> {
        let mut conn = self.connection()?;
        let rows = if public_only {
            conn.query(
                "SELECT * FROM apps WHERE deleted = FALSE AND is_public = TRUE ORDER BY id",
                &[],
            )
        } else {
            conn.query("SELECT * FROM apps ORDER BY id", &[])
        }
        .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.iter().map(row_to_application).collect()
    }
}

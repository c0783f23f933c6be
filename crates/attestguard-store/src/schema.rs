// crates/attestguard-store/src/schema.rs
// ============================================================================
// Module: Store Schema
// Description: Idempotent DDL for the apps/profiles/verification_tasks tables.
// Purpose: Keep schema creation additive and migration-framework-free.
// ============================================================================

//! ## Overview
//! One batched `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT EXISTS`
//! statement set, run once from [`crate::store::PostgresStore::new`], matching
//! the teacher's `postgres_store::migrate` pattern rather than introducing a
//! separate migration framework (no `sqlx`/`refinery`/`diesel_migrations`
//! dependency appears anywhere in the pack for this store family).

/// All DDL statements, executed in one `batch_execute` call.
pub(crate) const MIGRATIONS: &str = "
CREATE TABLE IF NOT EXISTS apps (
    id TEXT PRIMARY KEY,
    profile_id BIGINT NOT NULL,
    display_name TEXT NOT NULL,
    app_config_type TEXT NOT NULL,
    contract_address TEXT NOT NULL,
    domain_or_model TEXT NOT NULL,
    base_image TEXT NOT NULL,
    workspace_id BIGINT NOT NULL,
    creator_id BIGINT NOT NULL,
    username TEXT NOT NULL,
    email TEXT NOT NULL,
    custom_user TEXT NOT NULL,
    is_public BOOLEAN NOT NULL DEFAULT FALSE,
    deleted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_synced_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_apps_profile_id ON apps (profile_id);
CREATE INDEX IF NOT EXISTS idx_apps_workspace_id ON apps (workspace_id);
CREATE INDEX IF NOT EXISTS idx_apps_creator_id ON apps (creator_id);
CREATE INDEX IF NOT EXISTS idx_apps_contract_address ON apps (contract_address);
CREATE INDEX IF NOT EXISTS idx_apps_is_public ON apps (is_public);
CREATE INDEX IF NOT EXISTS idx_apps_deleted ON apps (deleted);
CREATE INDEX IF NOT EXISTS idx_apps_app_config_type ON apps (app_config_type);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,
    entity_id BIGINT NOT NULL,
    display_name TEXT NOT NULL,
    avatar_url TEXT,
    description TEXT,
    custom_domain TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_entity ON profiles (entity_type, entity_id);

CREATE TABLE IF NOT EXISTS verification_tasks (
    id TEXT PRIMARY KEY,
    app_id TEXT REFERENCES apps(id) ON DELETE SET NULL,
    job_name TEXT NOT NULL,
    queue_job_id TEXT,
    app_metadata TEXT,
    flags_json TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    blob_filename TEXT,
    blob_key TEXT,
    blob_bucket TEXT,
    data_object_ids_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    started_at TEXT,
    finished_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_tasks_app_id ON verification_tasks (app_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON verification_tasks (status);
CREATE INDEX IF NOT EXISTS idx_tasks_job_name ON verification_tasks (job_name);
CREATE INDEX IF NOT EXISTS idx_tasks_created_desc ON verification_tasks (created_at DESC, id);
";

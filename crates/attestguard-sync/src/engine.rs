// crates/attestguard-sync/src/engine.rs
// ============================================================================
// Module: Sync Engine
// Description: The two C9 cron ticks (profile sync, app sync) and the
//              lease-guarded run-once entry points consumed by the CLI/API.
// Purpose: Drive §4.9's field derivation and upsert sequence end to end.
// Dependencies: attestguard-core, attestguard-queue, attestguard-store,
//              crate::{client, config, records, version}
// ============================================================================

//! ## Overview
//! Each tick is guarded by [`attestguard_store::PostgresStore::try_acquire_lease`]
//! so that a multi-instance deployment runs at most one profile sync and one
//! app sync at a time (spec.md §4.9/§9 "Cron lease"). A tick that fails to
//! acquire its lease is a no-op, not an error: another instance is already
//! running that tick.

use std::sync::Arc;

use attestguard_core::AppId;
use attestguard_core::VerificationFlags;
use attestguard_queue::TaskQueue;
use attestguard_store::PostgresStore;
use tracing::info;
use tracing::warn;

use crate::client::fetch_catalog;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::records::RawAppRecord;
use crate::records::RawProfileRecord;
use crate::records::derive_app_upsert;
use crate::records::derive_profile_upsert;
use crate::version::DstackVersion;

/// Drives the profile-sync and app-sync cron ticks against a durable store
/// and (for app sync) an optional sync-driven enqueue target.
pub struct SyncEngine {
    /// Durable store; also the lease provider.
    store: Arc<PostgresStore>,
    /// Endpoint/credential/interval configuration.
    config: SyncConfig,
    /// Worker-pool handle used to auto-enqueue newly-synced, version-eligible
    /// apps (spec.md §9 "Open question"). `None` disables sync-driven enqueue.
    queue: Option<Arc<TaskQueue>>,
}

impl SyncEngine {
    /// Builds a new sync engine.
    #[must_use]
    pub fn new(store: Arc<PostgresStore>, config: SyncConfig, queue: Option<Arc<TaskQueue>>) -> Self {
        Self {
            store,
            config,
            queue,
        }
    }

    /// Runs one profile-sync tick (spec.md §4.9 "Profile sync").
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the fetch, payload decode, or any upsert
    /// fails. A lease that is already held by another instance is not an
    /// error; the tick simply does nothing.
    pub fn run_profile_sync_once(&self) -> Result<(), SyncError> {
        if !self.store.try_acquire_lease(SyncConfig::PROFILE_LEASE)? {
            info!("profile sync lease held elsewhere, skipping tick");
            return Ok(());
        }
        let result = self.run_profile_sync_locked();
        self.store.release_lease(SyncConfig::PROFILE_LEASE)?;
        result
    }

    /// Runs one app-sync tick (spec.md §4.9 "App sync").
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the fetch, payload decode, or any upsert
    /// fails. A lease that is already held by another instance is not an
    /// error; the tick simply does nothing.
    pub fn run_app_sync_once(&self) -> Result<(), SyncError> {
        if !self.store.try_acquire_lease(SyncConfig::APP_LEASE)? {
            info!("app sync lease held elsewhere, skipping tick");
            return Ok(());
        }
        let result = self.run_app_sync_locked();
        self.store.release_lease(SyncConfig::APP_LEASE)?;
        result
    }

    /// Fetch-decode-upsert body of the profile tick, run under the lease.
    fn run_profile_sync_locked(&self) -> Result<(), SyncError> {
        let records: Vec<RawProfileRecord> =
            fetch_catalog(&self.config.profile_query_url, &self.config.api_key, self.config.timeout_ms)?;
        let mut synced = 0u64;
        for record in records {
            let upsert = derive_profile_upsert(record)?;
            self.store.upsert_profile(upsert)?;
            synced += 1;
        }
        info!(synced, "profile sync tick complete");
        Ok(())
    }

    /// Fetch-decode-upsert-tombstone body of the app tick, run under the lease.
    fn run_app_sync_locked(&self) -> Result<(), SyncError> {
        let records: Vec<RawAppRecord> =
            fetch_catalog(&self.config.app_query_url, &self.config.api_key, self.config.timeout_ms)?;
        let mut seen_ids = Vec::with_capacity(records.len());
        let mut synced = 0u64;
        for record in records {
            let dstack_app_id = record.dstack_app_id.clone();
            let base_image = record.base_image.clone();
            let upsert = derive_app_upsert(record)?;
            let app = self.store.upsert_app(upsert)?;
            seen_ids.push(app.id.clone());
            synced += 1;
            self.maybe_enqueue(&app.id, &base_image, &dstack_app_id)?;
        }
        let tombstoned = self.store.tombstone_missing_apps(&seen_ids)?;
        info!(synced, tombstoned, "app sync tick complete");
        Ok(())
    }

    /// Enqueues a verification task for a just-synced app when sync-driven
    /// enqueue is enabled and the app's dstack version is allow-listed
    /// (spec.md §9 "Open question", resolved via
    /// `ATTESTGUARD_QUEUE_ALLOWED_DSTACK_VERSIONS`; an empty allow-list
    /// permits every version).
    fn maybe_enqueue(&self, app_id: &AppId, base_image: &str, dstack_app_id: &str) -> Result<(), SyncError> {
        let Some(queue) = self.queue.as_ref() else {
            return Ok(());
        };
        if !self.config.allowed_dstack_versions.is_empty() {
            let parsed = DstackVersion::parse(base_image);
            let allowed = self
                .config
                .allowed_dstack_versions
                .iter()
                .any(|candidate| DstackVersion::parse(candidate) == parsed);
            if !allowed {
                warn!(dstack_app_id, base_image, "app version not in sync-enqueue allow-list, skipping");
                return Ok(());
            }
        }
        queue.add_task(app_id, None, VerificationFlags::default())?;
        Ok(())
    }
}

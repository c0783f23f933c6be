// crates/attestguard-sync/src/config.rs
// ============================================================================
// Module: Sync Configuration
// Description: Endpoint, credential, and interval configuration for C9.
// Purpose: Give the two cron loops their poll targets and lease names.
// Dependencies: none
// ============================================================================

/// Configuration for the analytics-sync engine (spec.md §4.9, §6).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Analytics query URL for the profile-sync cron (`METABASE_PROFILE_QUERY`).
    pub profile_query_url: String,
    /// Analytics query URL for the app-sync cron (`METABASE_APP_QUERY`).
    pub app_query_url: String,
    /// API key sent as `X-API-KEY` on both queries (`METABASE_API_KEY`).
    pub api_key: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Profile-sync poll interval in milliseconds (spec.md §4.9, "~1 min").
    pub profile_interval_ms: u64,
    /// App-sync poll interval in milliseconds (spec.md §4.9, "~5 min").
    pub app_interval_ms: u64,
    /// Dstack base-image versions allowed to reach the queue, or empty to
    /// allow all (spec.md §9 "Open question"; resolved as a configurable
    /// allow-list rather than a hardcoded filter — see DESIGN.md).
    pub allowed_dstack_versions: Vec<String>,
}

impl SyncConfig {
    /// Advisory-lease name for the profile-sync cron.
    pub(crate) const PROFILE_LEASE: &'static str = "attestguard-sync-profile";
    /// Advisory-lease name for the app-sync cron.
    pub(crate) const APP_LEASE: &'static str = "attestguard-sync-app";
}

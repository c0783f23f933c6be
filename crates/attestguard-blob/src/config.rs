// crates/attestguard-blob/src/config.rs
// ============================================================================
// Module: Blob Store Configuration
// Description: S3-compatible endpoint and credential settings (spec.md §6).
// Purpose: Carry S3_ENDPOINT/S3_ACCESS_KEY_ID/S3_SECRET_ACCESS_KEY/S3_BUCKET.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// S3-compatible blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3BlobStoreConfig {
    /// Bucket name (`S3_BUCKET`).
    pub bucket: String,
    /// Custom endpoint URL, for S3-compatible stores (`S3_ENDPOINT`).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key id (`S3_ACCESS_KEY_ID`).
    pub access_key_id: String,
    /// Secret access key (`S3_SECRET_ACCESS_KEY`).
    pub secret_access_key: String,
    /// AWS region; falls back to environment configuration when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Force path-style addressing, required by most non-AWS S3-compatible
    /// stores (e.g. MinIO).
    #[serde(default)]
    pub force_path_style: bool,
}

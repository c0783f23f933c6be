// crates/attestguard-blob/tests/s3_store.rs
// ============================================================================
// Module: S3 Blob Store Tests
// Description: Unit tests for S3 blob store configuration.
// Purpose: Validate config validation without real AWS services.
// ============================================================================

use attestguard_blob::S3BlobStore;
use attestguard_blob::S3BlobStoreConfig;

fn base_config() -> S3BlobStoreConfig {
    S3BlobStoreConfig {
        bucket: "attestguard-test".to_string(),
        endpoint: None,
        access_key_id: "key".to_string(),
        secret_access_key: "secret".to_string(),
        region: Some("us-east-1".to_string()),
        force_path_style: false,
    }
}

#[test]
fn s3_store_rejects_empty_bucket() {
    let mut config = base_config();
    config.bucket = "".to_string();
    let result = S3BlobStore::new(&config);
    assert!(result.is_err());
}

#[test]
fn s3_store_rejects_whitespace_only_bucket() {
    let mut config = base_config();
    config.bucket = "   ".to_string();
    let result = S3BlobStore::new(&config);
    assert!(result.is_err());
}

#[test]
fn s3_store_config_serde_roundtrip() {
    let original = base_config();
    let json = serde_json::to_string(&original).expect("serialize");
    let restored: S3BlobStoreConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(original.bucket, restored.bucket);
    assert_eq!(original.access_key_id, restored.access_key_id);
    assert_eq!(original.force_path_style, restored.force_path_style);
}

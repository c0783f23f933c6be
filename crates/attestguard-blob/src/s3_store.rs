// crates/attestguard-blob/src/s3_store.rs
// ============================================================================
// Module: S3 Blob Store
// Description: S3-compatible backend for `uploadJson`/`download`/`delete` (spec.md §4.8).
// Purpose: Persist serialized verification reports under opaque UUID keys.
// Dependencies: aws-config, aws-sdk-s3, tokio, uuid
// ============================================================================

//! ## Overview
//! Grounded directly on
//! `decision-gate-store-enterprise::s3_runpack_store::S3RunpackStore`'s
//! client-construction and lifecycle shape: a dedicated multi-thread
//! [`tokio::runtime::Runtime`] drives every blocking call, and `Drop` retires
//! that runtime on a background thread so callers never block on teardown.
//! Unlike the teacher's runpack store, objects here are plain JSON bytes
//! keyed by a fresh UUID filename (`<uuid>.json`) — there is no tar
//! archiving, directory walk, or content-hash deduplication, since spec.md
//! §4.8 calls for opaque, content-agnostic keys.

use attestguard_core::BlobRef;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;

use crate::config::S3BlobStoreConfig;
use crate::error::BlobStoreError;

/// S3-backed blob store implementing C8.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    runtime: Option<tokio::runtime::Runtime>,
}

impl Drop for S3BlobStore {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3BlobStore {
    /// Creates a new S3 blob store.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Invalid`] when `config.bucket` is empty, or
    /// [`BlobStoreError::Io`] when the background runtime cannot be built.
    pub fn new(config: &S3BlobStoreConfig) -> Result<Self, BlobStoreError> {
        if config.bucket.trim().is_empty() {
            return Err(BlobStoreError::Invalid("bucket must be set".to_string()));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| BlobStoreError::Io(err.to_string()))?;
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "attestguard-blob",
        );
        let shared_config = runtime.block_on(async {
            let mut loader =
                aws_config::defaults(BehaviorVersion::latest()).credentials_provider(credentials);
            if let Some(region) = &config.region {
                loader = loader.region(Region::new(region.clone()));
            }
            if let Some(endpoint) = &config.endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            loader.load().await
        });
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_builder.build());
        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            runtime: Some(runtime),
        })
    }

    /// Serializes `value` to UTF-8 JSON and writes it under a fresh UUID key
    /// (spec.md §4.8 `uploadJson`).
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Serialize`] when `value` cannot be
    /// serialized, or [`BlobStoreError::Io`] when the upload fails.
    pub fn upload_json(&self, value: &serde_json::Value) -> Result<BlobRef, BlobStoreError> {
        let body =
            serde_json::to_vec(value).map_err(|err| BlobStoreError::Serialize(err.to_string()))?;
        let filename = format!("{}.json", uuid::Uuid::new_v4());
        let key = filename.clone();
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        self.runtime
            .as_ref()
            .ok_or_else(|| BlobStoreError::Io("blob store closed".to_string()))?
            .block_on(async {
                client
                    .put_object()
                    .bucket(&bucket)
                    .key(&key)
                    .body(body.into())
                    .content_type("application/json")
                    .send()
                    .await
                    .map_err(|err| BlobStoreError::Io(err.to_string()))?;
                Ok(())
            })?;
        Ok(BlobRef {
            filename,
            key,
            bucket: self.bucket.clone(),
        })
    }

    /// Downloads and parses the JSON object at `key` (the read side of
    /// `uploadJson`, needed by C10's report/widget routes).
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Io`] when the download fails, or
    /// [`BlobStoreError::Serialize`] when the body is not valid JSON.
    pub fn download_json(&self, key: &str) -> Result<serde_json::Value, BlobStoreError> {
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        let key = key.to_string();
        let body = self
            .runtime
            .as_ref()
            .ok_or_else(|| BlobStoreError::Io("blob store closed".to_string()))?
            .block_on(async {
                let output = client
                    .get_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|err| BlobStoreError::Io(err.to_string()))?;
                output
                    .body
                    .collect()
                    .await
                    .map(|data| data.into_bytes())
                    .map_err(|err| BlobStoreError::Io(err.to_string()))
            })?;
        serde_json::from_slice(&body).map_err(|err| BlobStoreError::Serialize(err.to_string()))
    }

    /// Deletes the object at `key` (spec.md §4.8 `delete`).
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Io`] when the delete request fails.
    pub fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        let key = key.to_string();
        self.runtime
            .as_ref()
            .ok_or_else(|| BlobStoreError::Io("blob store closed".to_string()))?
            .block_on(async {
                client
                    .delete_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|err| BlobStoreError::Io(err.to_string()))?;
                Ok(())
            })
    }
}

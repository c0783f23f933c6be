// crates/attestguard-blob/src/lib.rs
// ============================================================================
// Module: Attestguard Blob Library
// Description: Public API surface for the S3-compatible blob store (C8).
// Purpose: Expose the store handle plus its config/error types.
// Dependencies: crate::{config, error, s3_store}
// ============================================================================

//! ## Overview
//! `attestguard-blob` stores serialized verification reports at opaque
//! `<uuid>.json` keys in an S3-compatible bucket (spec.md §4.8). It has no
//! knowledge of report shape; callers pass pre-serialized
//! [`serde_json::Value`]s and receive back the `{filename, key, bucket}`
//! triple ([`attestguard_core::BlobRef`]) that `attestguard-store` persists
//! on the owning task row.

pub mod config;
pub mod error;
mod s3_store;

pub use config::S3BlobStoreConfig;
pub use error::BlobStoreError;
pub use s3_store::S3BlobStore;

// crates/attestguard-sync/src/lib.rs
// ============================================================================
// Module: Attestguard Sync Library
// Description: Public API surface for the analytics-sync cron engine (C9).
// Purpose: Expose the engine handle plus its config/error types.
// Dependencies: crate::{client, config, engine, error, records, version}
// ============================================================================

//! ## Overview
//! `attestguard-sync` mirrors upstream profile and application catalogs into
//! C6 on two independent cron ticks (spec.md §4.9). Both ticks share a
//! fetch → derive → upsert shape; field derivation (version-gated contract
//! address and domain-or-model selection) lives in [`records`].

mod client;
mod engine;

pub mod config;
pub mod error;
pub mod records;
pub mod version;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use records::RawAppRecord;
pub use records::RawProfileRecord;
pub use version::DstackVersion;

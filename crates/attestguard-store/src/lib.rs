// crates/attestguard-store/src/lib.rs
// ============================================================================
// Module: Attestguard Store Library
// Description: Public API surface for the Postgres-backed durable store (C6).
// Purpose: Expose the store handle, its config/error types, and row operations.
// Dependencies: crate::{apps, config, error, profiles, schema, store, tasks}
// ============================================================================

//! ## Overview
//! `attestguard-store` owns the three durable tables spec.md §4.6 describes:
//! `apps`, `profiles`, `verification_tasks`. [`PostgresStore`] is the single
//! handle; table-specific operations are implemented as `impl PostgresStore`
//! blocks spread across `apps`, `profiles`, and `tasks` so each table's SQL
//! stays reviewable on its own, while still sharing one connection pool and
//! one migration pass run from [`PostgresStore::new`].

mod apps;
mod profiles;
mod schema;
mod store;
mod tasks;

pub mod config;
pub mod error;

pub use apps::AppUpsert;
pub use config::PostgresStoreConfig;
pub use error::StoreError;
pub use profiles::ProfileUpsert;
pub use store::PostgresStore;
pub use tasks::TaskPatch;
